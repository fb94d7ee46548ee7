use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::{InputMode, as_object, integer, text};
use crate::error::AppResult;

/// Duration is caller-supplied and deliberately not derived from the
/// start/end pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WorkSession {
    pub id: i64,
    pub start_time: String,
    pub end_time: Option<String>,
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertWorkSession {
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkSession {
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
}

pub fn validate(value: &Value, mode: InputMode) -> AppResult<()> {
    let map = as_object(value)?;
    text(map, "startTime", mode.is_create(), true)?;
    text(map, "endTime", false, true)?;
    integer(map, "duration", false)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn create_requires_start_time() {
        assert!(validate(&json!({ "duration": 1500 }), InputMode::Create).is_err());
        assert!(validate(&json!({ "startTime": "2024-05-01T09:00:00Z" }), InputMode::Create).is_ok());
    }

    #[test]
    fn duration_must_be_an_integer() {
        let payload = json!({ "startTime": "2024-05-01T09:00:00Z", "duration": "25m" });
        assert!(validate(&payload, InputMode::Create).is_err());
    }

    #[test]
    fn wire_names_are_camel_case() {
        let input: InsertWorkSession = serde_json::from_value(json!({
            "startTime": "2024-05-01T09:00:00Z",
            "endTime": "2024-05-01T09:25:00Z",
            "duration": 1500
        }))
        .unwrap();
        assert_eq!(input.start_time, "2024-05-01T09:00:00Z");
        assert_eq!(input.duration, Some(1500));
    }
}
