use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::{InputMode, as_object, flag, integer, text};
use crate::error::AppResult;

/// Progress bounds are not enforced; currentProgress may exceed
/// targetValue.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub target_date: String,
    pub current_progress: i64,
    pub target_value: i64,
    pub unit: String,
    pub completed: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertGoal {
    pub title: String,
    pub category: String,
    pub target_date: String,
    #[serde(default)]
    pub current_progress: i64,
    #[serde(default = "default_target_value")]
    pub target_value: i64,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default, deserialize_with = "super::flag_repr::deserialize")]
    pub completed: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGoal {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub target_date: Option<String>,
    #[serde(default)]
    pub current_progress: Option<i64>,
    #[serde(default)]
    pub target_value: Option<i64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "super::flag_repr::deserialize_opt")]
    pub completed: Option<i64>,
}

fn default_target_value() -> i64 {
    100
}

fn default_unit() -> String {
    "%".to_string()
}

pub fn validate(value: &Value, mode: InputMode) -> AppResult<()> {
    let map = as_object(value)?;
    let required = mode.is_create();
    text(map, "title", required, false)?;
    text(map, "category", required, false)?;
    text(map, "targetDate", required, false)?;
    integer(map, "currentProgress", false)?;
    integer(map, "targetValue", false)?;
    text(map, "unit", false, true)?;
    flag(map, "completed", false)?;
    Ok(())
}
