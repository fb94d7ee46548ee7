//! HTTP dispatcher: walks the contract registry and binds each entry to an
//! axum route. Validation runs against the entry's input rule before the
//! repository is touched; failures map to 400 `{message, field}`, missing
//! update targets to 404 `{message}`, deletes to an empty 204.

use std::collections::HashSet;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodFilter, MethodRouter, get, on};
use axum::{Json, Router};
use serde_json::Value;

use crate::contract::{self, Endpoint, Operation, Resource};
use crate::error::{AppError, AppResult};
use crate::models::{
    InsertGoal, InsertHabit, InsertHabitLog, InsertTodo, InsertWorkSession, UpdateGoal,
    UpdateHabit, UpdateTodo, UpdateWorkSession,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    router_from_endpoints(contract::ENDPOINTS, state)
}

/// Binding is idempotent: a (method, path) pair that is already bound is
/// skipped, so a registry walked twice yields one live handler per entry.
pub fn router_from_endpoints(endpoints: &'static [Endpoint], state: AppState) -> Router {
    let mut bound = HashSet::new();
    let mut router = Router::new().route("/health", get(health));

    for endpoint in endpoints {
        if !bound.insert(endpoint.channel()) {
            continue;
        }
        router = router.route(&axum_path(endpoint.path), handler_for(endpoint));
    }

    router.with_state(state)
}

/// The registry keeps `:id` templates; axum wants `{id}`.
fn axum_path(template: &str) -> String {
    template
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{name}}}"),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn method_filter(method: &str) -> MethodFilter {
    match method {
        "POST" => MethodFilter::POST,
        "PUT" => MethodFilter::PUT,
        "DELETE" => MethodFilter::DELETE,
        _ => MethodFilter::GET,
    }
}

fn handler_for(endpoint: &'static Endpoint) -> MethodRouter<AppState> {
    let filter = method_filter(endpoint.method);
    match endpoint.operation {
        Operation::List => on(filter, move |State(state): State<AppState>| async move {
            list(endpoint, state).await
        }),
        Operation::Create => on(
            filter,
            move |State(state): State<AppState>, Json(body): Json<Value>| async move {
                create(endpoint, state, body).await
            },
        ),
        Operation::Update => on(
            filter,
            move |State(state): State<AppState>, Path(id): Path<i64>, Json(body): Json<Value>| async move {
                update(endpoint, state, id, body).await
            },
        ),
        Operation::Delete => on(
            filter,
            move |State(state): State<AppState>, Path(id): Path<i64>| async move {
                remove(endpoint, state, id).await
            },
        ),
    }
}

async fn health(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.repo.ping().await?;
    Ok(StatusCode::OK)
}

fn parse<T: serde::de::DeserializeOwned>(body: Value) -> AppResult<T> {
    serde_json::from_value(body).map_err(|err| AppError::validation(err.to_string(), ""))
}

/// The registry declares the success status for each entry.
fn success_status(endpoint: &Endpoint) -> StatusCode {
    StatusCode::from_u16(endpoint.success).unwrap_or(StatusCode::OK)
}

async fn list(endpoint: &'static Endpoint, state: AppState) -> AppResult<Response> {
    let status = success_status(endpoint);
    let response = match endpoint.resource {
        Resource::Todos => (status, Json(state.repo.list_todos().await?)).into_response(),
        Resource::WorkSessions => {
            (status, Json(state.repo.list_work_sessions().await?)).into_response()
        }
        Resource::Goals => (status, Json(state.repo.list_goals().await?)).into_response(),
        Resource::Habits => (status, Json(state.repo.list_habits().await?)).into_response(),
        Resource::HabitLogs => (status, Json(state.repo.list_habit_logs().await?)).into_response(),
    };
    Ok(response)
}

async fn create(endpoint: &'static Endpoint, state: AppState, body: Value) -> AppResult<Response> {
    if let Some(validate) = endpoint.input {
        validate(&body, endpoint.mode())?;
    }

    let status = success_status(endpoint);
    let response = match endpoint.resource {
        Resource::Todos => {
            let row = state.repo.create_todo(parse::<InsertTodo>(body)?).await?;
            (status, Json(row)).into_response()
        }
        Resource::WorkSessions => {
            let row = state
                .repo
                .create_work_session(parse::<InsertWorkSession>(body)?)
                .await?;
            (status, Json(row)).into_response()
        }
        Resource::Goals => {
            let row = state.repo.create_goal(parse::<InsertGoal>(body)?).await?;
            (status, Json(row)).into_response()
        }
        Resource::Habits => {
            let row = state.repo.create_habit(parse::<InsertHabit>(body)?).await?;
            (status, Json(row)).into_response()
        }
        Resource::HabitLogs => {
            let row = state
                .repo
                .create_habit_log(parse::<InsertHabitLog>(body)?)
                .await?;
            (status, Json(row)).into_response()
        }
    };
    Ok(response)
}

async fn update(
    endpoint: &'static Endpoint,
    state: AppState,
    id: i64,
    body: Value,
) -> AppResult<Response> {
    if let Some(validate) = endpoint.input {
        validate(&body, endpoint.mode())?;
    }

    let status = success_status(endpoint);
    let missing = || AppError::not_found(endpoint.resource.singular());
    let response = match endpoint.resource {
        Resource::Todos => {
            let row = state
                .repo
                .update_todo(id, parse::<UpdateTodo>(body)?)
                .await?
                .ok_or_else(missing)?;
            (status, Json(row)).into_response()
        }
        Resource::WorkSessions => {
            let row = state
                .repo
                .update_work_session(id, parse::<UpdateWorkSession>(body)?)
                .await?
                .ok_or_else(missing)?;
            (status, Json(row)).into_response()
        }
        Resource::Goals => {
            let row = state
                .repo
                .update_goal(id, parse::<UpdateGoal>(body)?)
                .await?
                .ok_or_else(missing)?;
            (status, Json(row)).into_response()
        }
        Resource::Habits => {
            let row = state
                .repo
                .update_habit(id, parse::<UpdateHabit>(body)?)
                .await?
                .ok_or_else(missing)?;
            (status, Json(row)).into_response()
        }
        Resource::HabitLogs => return Err(AppError::Internal),
    };
    Ok(response)
}

async fn remove(endpoint: &'static Endpoint, state: AppState, id: i64) -> AppResult<Response> {
    match endpoint.resource {
        Resource::Todos => state.repo.delete_todo(id).await?,
        Resource::Goals => state.repo.delete_goal(id).await?,
        Resource::Habits => state.repo.delete_habit(id).await?,
        Resource::WorkSessions | Resource::HabitLogs => return Err(AppError::Internal),
    }
    Ok(success_status(endpoint).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_convert_to_axum_syntax() {
        assert_eq!(axum_path("/api/todos/:id"), "/api/todos/{id}");
        assert_eq!(axum_path("/api/todos"), "/api/todos");
    }

    #[test]
    fn registry_methods_are_the_four_the_filter_maps() {
        for endpoint in contract::ENDPOINTS {
            assert!(
                matches!(endpoint.method, "GET" | "POST" | "PUT" | "DELETE"),
                "unexpected method {}",
                endpoint.method
            );
        }
    }
}
