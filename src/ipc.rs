//! Call-channel dispatcher: the transport the desktop shell embeds. Each
//! contract entry is bound to its `"<METHOD> <path>"` channel; callers
//! supply `{params: {id}, body}` for parameterized entries and the raw
//! body object for creates. The channel cannot carry rich error objects,
//! so failures travel as an `IpcError` wrapping the serialized
//! `{message, field?}` body — the same shape the HTTP dispatcher emits.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::contract::{Endpoint, Operation, Resource};
use crate::error::{AppError, AppResult, ErrorBody};
use crate::models::{
    InsertGoal, InsertHabit, InsertHabitLog, InsertTodo, InsertWorkSession, UpdateGoal,
    UpdateHabit, UpdateTodo, UpdateWorkSession,
};
use crate::repository::Repository;

#[derive(Debug, Error)]
#[error("{payload}")]
pub struct IpcError {
    payload: String,
}

impl IpcError {
    /// The serialized `{message, field?}` JSON the shell relays to its
    /// renderer.
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

impl From<AppError> for IpcError {
    fn from(err: AppError) -> Self {
        let body = ErrorBody::from_error(&err);
        let payload = serde_json::to_string(&body)
            .unwrap_or_else(|_| r#"{"message":"Internal server error"}"#.to_string());
        Self { payload }
    }
}

pub struct IpcRouter {
    repo: Repository,
    handlers: HashMap<String, &'static Endpoint>,
}

impl IpcRouter {
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            handlers: HashMap::new(),
        }
    }

    /// Bind every entry to its channel. Channels that are already bound are
    /// left untouched, so repeated registration is a silent no-op.
    pub fn register(&mut self, endpoints: &'static [Endpoint]) {
        for endpoint in endpoints {
            let channel = endpoint.channel();
            if self.handlers.contains_key(&channel) {
                continue;
            }
            self.handlers.insert(channel, endpoint);
        }
    }

    pub fn is_bound(&self, channel: &str) -> bool {
        self.handlers.contains_key(channel)
    }

    pub fn bound_channels(&self) -> usize {
        self.handlers.len()
    }

    pub async fn invoke(&self, channel: &str, args: Value) -> Result<Value, IpcError> {
        let endpoint = self.handlers.get(channel).ok_or_else(|| {
            IpcError::from(AppError::NotFound(format!(
                "No handler registered for channel {channel}"
            )))
        })?;
        self.dispatch(endpoint, args).await.map_err(IpcError::from)
    }

    async fn dispatch(&self, endpoint: &Endpoint, args: Value) -> AppResult<Value> {
        let (id, body) = split_args(endpoint, args)?;
        match endpoint.operation {
            Operation::List => self.list(endpoint).await,
            Operation::Create => self.create(endpoint, body).await,
            Operation::Update => self.update(endpoint, id, body).await,
            Operation::Delete => self.delete(endpoint, id).await,
        }
    }

    async fn list(&self, endpoint: &Endpoint) -> AppResult<Value> {
        match endpoint.resource {
            Resource::Todos => to_value(self.repo.list_todos().await?),
            Resource::WorkSessions => to_value(self.repo.list_work_sessions().await?),
            Resource::Goals => to_value(self.repo.list_goals().await?),
            Resource::Habits => to_value(self.repo.list_habits().await?),
            Resource::HabitLogs => to_value(self.repo.list_habit_logs().await?),
        }
    }

    async fn create(&self, endpoint: &Endpoint, body: Value) -> AppResult<Value> {
        if let Some(validate) = endpoint.input {
            validate(&body, endpoint.mode())?;
        }
        match endpoint.resource {
            Resource::Todos => to_value(self.repo.create_todo(parse::<InsertTodo>(body)?).await?),
            Resource::WorkSessions => to_value(
                self.repo
                    .create_work_session(parse::<InsertWorkSession>(body)?)
                    .await?,
            ),
            Resource::Goals => to_value(self.repo.create_goal(parse::<InsertGoal>(body)?).await?),
            Resource::Habits => {
                to_value(self.repo.create_habit(parse::<InsertHabit>(body)?).await?)
            }
            Resource::HabitLogs => to_value(
                self.repo
                    .create_habit_log(parse::<InsertHabitLog>(body)?)
                    .await?,
            ),
        }
    }

    async fn update(&self, endpoint: &Endpoint, id: i64, body: Value) -> AppResult<Value> {
        if let Some(validate) = endpoint.input {
            validate(&body, endpoint.mode())?;
        }
        let missing = || AppError::not_found(endpoint.resource.singular());
        match endpoint.resource {
            Resource::Todos => to_value(
                self.repo
                    .update_todo(id, parse::<UpdateTodo>(body)?)
                    .await?
                    .ok_or_else(missing)?,
            ),
            Resource::WorkSessions => to_value(
                self.repo
                    .update_work_session(id, parse::<UpdateWorkSession>(body)?)
                    .await?
                    .ok_or_else(missing)?,
            ),
            Resource::Goals => to_value(
                self.repo
                    .update_goal(id, parse::<UpdateGoal>(body)?)
                    .await?
                    .ok_or_else(missing)?,
            ),
            Resource::Habits => to_value(
                self.repo
                    .update_habit(id, parse::<UpdateHabit>(body)?)
                    .await?
                    .ok_or_else(missing)?,
            ),
            Resource::HabitLogs => Err(AppError::Internal),
        }
    }

    async fn delete(&self, endpoint: &Endpoint, id: i64) -> AppResult<Value> {
        match endpoint.resource {
            Resource::Todos => self.repo.delete_todo(id).await?,
            Resource::Goals => self.repo.delete_goal(id).await?,
            Resource::Habits => self.repo.delete_habit(id).await?,
            Resource::WorkSessions | Resource::HabitLogs => return Err(AppError::Internal),
        }
        Ok(Value::Null)
    }
}

/// Parameterized entries receive `{params, body}`; creates receive the raw
/// body. The id is accepted as a number or a numeric string.
fn split_args(endpoint: &Endpoint, args: Value) -> AppResult<(i64, Value)> {
    if !endpoint.has_params() {
        return Ok((0, args));
    }
    let id = args
        .get("params")
        .and_then(|params| params.get("id"))
        .and_then(parse_id);
    match id {
        Some(id) => {
            let body = args.get("body").cloned().unwrap_or(Value::Null);
            Ok((id, body))
        }
        None => Err(AppError::validation("id must be an integer", "id")),
    }
}

fn parse_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(raw) => raw.parse().ok(),
        _ => None,
    }
}

fn parse<T: serde::de::DeserializeOwned>(body: Value) -> AppResult<T> {
    serde_json::from_value(body).map_err(|err| AppError::validation(err.to_string(), ""))
}

fn to_value<T: serde::Serialize>(row: T) -> AppResult<Value> {
    serde_json::to_value(row).map_err(|_| AppError::Internal)
}
