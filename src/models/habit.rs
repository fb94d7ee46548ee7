use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::{InputMode, as_object, integer, text};
use crate::error::AppResult;

/// Streak is caller-managed; it is never derived from habit logs.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub streak: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertHabit {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub streak: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHabit {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub streak: Option<i64>,
}

pub fn validate(value: &Value, mode: InputMode) -> AppResult<()> {
    let map = as_object(value)?;
    let required = mode.is_create();
    text(map, "name", required, false)?;
    text(map, "category", required, false)?;
    integer(map, "streak", false)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn create_requires_name_and_category() {
        assert!(validate(&json!({ "name": "Read 30 mins" }), InputMode::Create).is_err());
        assert!(
            validate(
                &json!({ "name": "Read 30 mins", "category": "Learning" }),
                InputMode::Create
            )
            .is_ok()
        );
    }

    #[test]
    fn streak_defaults_to_zero() {
        let input: InsertHabit =
            serde_json::from_value(json!({ "name": "Read 30 mins", "category": "Learning" }))
                .unwrap();
        assert_eq!(input.streak, 0);
    }
}
