use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::{InputMode, as_object, flag, one_of, text};
use crate::error::AppResult;

pub const PRIORITIES: &[&str] = &["high", "medium", "low"];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub completed: i64,
    pub priority: String,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertTodo {
    pub title: String,
    #[serde(default, deserialize_with = "super::flag_repr::deserialize")]
    pub completed: i64,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "super::flag_repr::deserialize_opt")]
    pub completed: Option<i64>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

fn default_priority() -> String {
    "medium".to_string()
}

pub fn validate(value: &Value, mode: InputMode) -> AppResult<()> {
    let map = as_object(value)?;
    let required = mode.is_create();
    text(map, "title", required, false)?;
    flag(map, "completed", false)?;
    one_of(map, "priority", PRIORITIES, false)?;
    text(map, "date", false, true)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::AppError;

    fn field_of(err: AppError) -> String {
        match err {
            AppError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_requires_title() {
        let err = validate(&json!({ "priority": "high" }), InputMode::Create).unwrap_err();
        assert_eq!(field_of(err), "title");
    }

    #[test]
    fn empty_title_is_rejected() {
        let err = validate(&json!({ "title": "" }), InputMode::Create).unwrap_err();
        assert_eq!(field_of(err), "title");
    }

    #[test]
    fn priority_outside_enum_is_rejected() {
        let err = validate(
            &json!({ "title": "x", "priority": "urgent" }),
            InputMode::Create,
        )
        .unwrap_err();
        assert_eq!(field_of(err), "priority");
    }

    #[test]
    fn update_allows_partial_payloads() {
        assert!(validate(&json!({ "completed": true }), InputMode::Update).is_ok());
        assert!(validate(&json!({}), InputMode::Update).is_ok());
    }

    #[test]
    fn update_still_checks_supplied_fields() {
        let err = validate(&json!({ "title": 5 }), InputMode::Update).unwrap_err();
        assert_eq!(field_of(err), "title");
    }

    #[test]
    fn completed_normalizes_bool_and_integer() {
        let from_bool: InsertTodo =
            serde_json::from_value(json!({ "title": "x", "completed": true })).unwrap();
        let from_int: InsertTodo =
            serde_json::from_value(json!({ "title": "x", "completed": 1 })).unwrap();
        assert_eq!(from_bool.completed, 1);
        assert_eq!(from_bool.completed, from_int.completed);
    }

    #[test]
    fn completed_defaults_to_zero_and_priority_to_medium() {
        let input: InsertTodo = serde_json::from_value(json!({ "title": "x" })).unwrap();
        assert_eq!(input.completed, 0);
        assert_eq!(input.priority, "medium");
        assert_eq!(input.date, None);
    }

    #[test]
    fn completed_rejects_other_integers() {
        let err = validate(&json!({ "title": "x", "completed": 2 }), InputMode::Create).unwrap_err();
        assert_eq!(field_of(err), "completed");
    }
}
