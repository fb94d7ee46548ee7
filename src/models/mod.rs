pub mod goal;
pub mod habit;
pub mod habit_log;
pub mod todo;
pub mod work_session;

pub use goal::{Goal, InsertGoal, UpdateGoal};
pub use habit::{Habit, InsertHabit, UpdateHabit};
pub use habit_log::{HabitLog, InsertHabitLog};
pub use todo::{InsertTodo, Todo, UpdateTodo};
pub use work_session::{InsertWorkSession, UpdateWorkSession, WorkSession};

use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

/// Whether a payload is validated as a full insert or a partial update.
/// Update mode keeps every per-field rule but requires nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Create,
    Update,
}

impl InputMode {
    pub fn is_create(self) -> bool {
        matches!(self, InputMode::Create)
    }
}

pub(crate) fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

pub(crate) fn as_object(value: &Value) -> AppResult<&Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| AppError::validation("payload must be a JSON object", ""))
}

fn missing(field: &str) -> AppError {
    AppError::validation(format!("{field} is required"), field)
}

/// String field. `allow_empty` is off for the human-facing name fields,
/// on for date and timestamp strings.
pub(crate) fn text(
    map: &Map<String, Value>,
    field: &str,
    required: bool,
    allow_empty: bool,
) -> AppResult<()> {
    match map.get(field) {
        None | Some(Value::Null) => {
            if required {
                Err(missing(field))
            } else {
                Ok(())
            }
        }
        Some(Value::String(raw)) => {
            if !allow_empty && raw.trim().is_empty() {
                Err(AppError::validation(
                    format!("{field} must be a non-empty string"),
                    field,
                ))
            } else {
                Ok(())
            }
        }
        Some(_) => Err(AppError::validation(
            format!("{field} must be a string"),
            field,
        )),
    }
}

pub(crate) fn integer(map: &Map<String, Value>, field: &str, required: bool) -> AppResult<()> {
    match map.get(field) {
        None | Some(Value::Null) => {
            if required {
                Err(missing(field))
            } else {
                Ok(())
            }
        }
        Some(Value::Number(n)) if n.as_i64().is_some() => Ok(()),
        Some(_) => Err(AppError::validation(
            format!("{field} must be an integer"),
            field,
        )),
    }
}

/// Boolean-as-integer field: accepts `true`/`false` or a raw 0/1.
pub(crate) fn flag(map: &Map<String, Value>, field: &str, required: bool) -> AppResult<()> {
    match map.get(field) {
        None | Some(Value::Null) => {
            if required {
                Err(missing(field))
            } else {
                Ok(())
            }
        }
        Some(Value::Bool(_)) => Ok(()),
        Some(Value::Number(n)) if matches!(n.as_i64(), Some(0) | Some(1)) => Ok(()),
        Some(_) => Err(AppError::validation(
            format!("{field} must be a boolean or 0/1"),
            field,
        )),
    }
}

pub(crate) fn one_of(
    map: &Map<String, Value>,
    field: &str,
    allowed: &[&str],
    required: bool,
) -> AppResult<()> {
    match map.get(field) {
        None | Some(Value::Null) => {
            if required {
                Err(missing(field))
            } else {
                Ok(())
            }
        }
        Some(Value::String(raw)) if allowed.contains(&raw.as_str()) => Ok(()),
        Some(_) => Err(AppError::validation(
            format!("{field} must be one of: {}", allowed.join(", ")),
            field,
        )),
    }
}

/// Serde representations for the boolean-as-integer columns: the wire
/// accepts `true`/`false` or 0/1, the row stores 0/1.
pub(crate) mod flag_repr {
    use serde::de::{Deserializer, Error};
    use serde::Deserialize;
    use serde_json::Value;

    fn normalize<E: Error>(value: Value) -> Result<i64, E> {
        match value {
            Value::Bool(b) => Ok(i64::from(b)),
            Value::Number(n) => match n.as_i64() {
                Some(v @ (0 | 1)) => Ok(v),
                _ => Err(E::custom("expected a boolean or 0/1")),
            },
            _ => Err(E::custom("expected a boolean or 0/1")),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<i64, D::Error> {
        normalize(Value::deserialize(de)?)
    }

    pub fn deserialize_opt<'de, D: Deserializer<'de>>(de: D) -> Result<Option<i64>, D::Error> {
        match Value::deserialize(de)? {
            Value::Null => Ok(None),
            value => normalize(value).map(Some),
        }
    }
}
