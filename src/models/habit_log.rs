use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::{InputMode, as_object, integer, text};
use crate::error::AppResult;

/// Append-only. The referenced habit id is taken on trust — there is no
/// foreign-key check, and nothing prevents several logs per habit per day.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HabitLog {
    pub id: i64,
    pub habit_id: i64,
    pub completed_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertHabitLog {
    pub habit_id: i64,
    /// Defaults to today's date when omitted.
    #[serde(default)]
    pub completed_at: Option<String>,
}

pub fn validate(value: &Value, mode: InputMode) -> AppResult<()> {
    let map = as_object(value)?;
    integer(map, "habitId", mode.is_create())?;
    text(map, "completedAt", false, true)?;
    Ok(())
}
