//! The API contract: one entry per (resource, operation), consumed by both
//! transport dispatchers. Path templates use `:name` placeholders; the
//! channel id derived from (method, path) keeps operations sharing a path
//! distinguishable on transports without method routing.

use serde_json::Value;

use crate::error::AppResult;
use crate::models::{self, InputMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Todos,
    WorkSessions,
    Goals,
    Habits,
    HabitLogs,
}

impl Resource {
    pub fn singular(self) -> &'static str {
        match self {
            Resource::Todos => "Todo",
            Resource::WorkSessions => "Work session",
            Resource::Goals => "Goal",
            Resource::Habits => "Habit",
            Resource::HabitLogs => "Habit log",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
}

pub type Validator = fn(&Value, InputMode) -> AppResult<()>;

#[derive(Debug, Clone, Copy)]
pub struct Endpoint {
    pub resource: Resource,
    pub operation: Operation,
    pub method: &'static str,
    pub path: &'static str,
    /// Input rule for create/update payloads; list/delete take no body.
    pub input: Option<Validator>,
    pub success: u16,
}

impl Endpoint {
    pub fn channel(&self) -> String {
        ipc_channel(self.method, self.path)
    }

    pub fn mode(&self) -> InputMode {
        match self.operation {
            Operation::Create => InputMode::Create,
            _ => InputMode::Update,
        }
    }

    pub fn has_params(&self) -> bool {
        self.path.contains(':')
    }
}

pub static ENDPOINTS: &[Endpoint] = &[
    // Todos
    Endpoint {
        resource: Resource::Todos,
        operation: Operation::List,
        method: "GET",
        path: "/api/todos",
        input: None,
        success: 200,
    },
    Endpoint {
        resource: Resource::Todos,
        operation: Operation::Create,
        method: "POST",
        path: "/api/todos",
        input: Some(models::todo::validate),
        success: 201,
    },
    Endpoint {
        resource: Resource::Todos,
        operation: Operation::Update,
        method: "PUT",
        path: "/api/todos/:id",
        input: Some(models::todo::validate),
        success: 200,
    },
    Endpoint {
        resource: Resource::Todos,
        operation: Operation::Delete,
        method: "DELETE",
        path: "/api/todos/:id",
        input: None,
        success: 204,
    },
    // Work sessions (no delete)
    Endpoint {
        resource: Resource::WorkSessions,
        operation: Operation::List,
        method: "GET",
        path: "/api/work-sessions",
        input: None,
        success: 200,
    },
    Endpoint {
        resource: Resource::WorkSessions,
        operation: Operation::Create,
        method: "POST",
        path: "/api/work-sessions",
        input: Some(models::work_session::validate),
        success: 201,
    },
    Endpoint {
        resource: Resource::WorkSessions,
        operation: Operation::Update,
        method: "PUT",
        path: "/api/work-sessions/:id",
        input: Some(models::work_session::validate),
        success: 200,
    },
    // Goals
    Endpoint {
        resource: Resource::Goals,
        operation: Operation::List,
        method: "GET",
        path: "/api/goals",
        input: None,
        success: 200,
    },
    Endpoint {
        resource: Resource::Goals,
        operation: Operation::Create,
        method: "POST",
        path: "/api/goals",
        input: Some(models::goal::validate),
        success: 201,
    },
    Endpoint {
        resource: Resource::Goals,
        operation: Operation::Update,
        method: "PUT",
        path: "/api/goals/:id",
        input: Some(models::goal::validate),
        success: 200,
    },
    Endpoint {
        resource: Resource::Goals,
        operation: Operation::Delete,
        method: "DELETE",
        path: "/api/goals/:id",
        input: None,
        success: 204,
    },
    // Habits
    Endpoint {
        resource: Resource::Habits,
        operation: Operation::List,
        method: "GET",
        path: "/api/habits",
        input: None,
        success: 200,
    },
    Endpoint {
        resource: Resource::Habits,
        operation: Operation::Create,
        method: "POST",
        path: "/api/habits",
        input: Some(models::habit::validate),
        success: 201,
    },
    Endpoint {
        resource: Resource::Habits,
        operation: Operation::Update,
        method: "PUT",
        path: "/api/habits/:id",
        input: Some(models::habit::validate),
        success: 200,
    },
    Endpoint {
        resource: Resource::Habits,
        operation: Operation::Delete,
        method: "DELETE",
        path: "/api/habits/:id",
        input: None,
        success: 204,
    },
    // Habit logs (append-only)
    Endpoint {
        resource: Resource::HabitLogs,
        operation: Operation::List,
        method: "GET",
        path: "/api/habit-logs",
        input: None,
        success: 200,
    },
    Endpoint {
        resource: Resource::HabitLogs,
        operation: Operation::Create,
        method: "POST",
        path: "/api/habit-logs",
        input: Some(models::habit_log::validate),
        success: 201,
    },
];

pub fn endpoint(resource: Resource, operation: Operation) -> Option<&'static Endpoint> {
    ENDPOINTS
        .iter()
        .find(|entry| entry.resource == resource && entry.operation == operation)
}

/// Render a concrete path from a `:name` template and a placeholder map.
pub fn build_path(template: &str, params: &[(&str, &str)]) -> String {
    let mut path = template.to_string();
    for (key, value) in params {
        let placeholder = format!(":{key}");
        if path.contains(&placeholder) {
            path = path.replace(&placeholder, value);
        }
    }
    path
}

/// Channel id for transports without native method+path routing.
pub fn ipc_channel(method: &str, path: &str) -> String {
    format!("{} {}", method.to_uppercase(), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_every_operation() {
        assert_eq!(ENDPOINTS.len(), 17);
        assert!(endpoint(Resource::Todos, Operation::Delete).is_some());
        assert!(endpoint(Resource::WorkSessions, Operation::Delete).is_none());
        assert!(endpoint(Resource::HabitLogs, Operation::Update).is_none());
        assert!(endpoint(Resource::HabitLogs, Operation::Delete).is_none());
    }

    #[test]
    fn build_path_substitutes_placeholders() {
        assert_eq!(
            build_path("/api/todos/:id", &[("id", "42")]),
            "/api/todos/42"
        );
        assert_eq!(build_path("/api/todos", &[("id", "42")]), "/api/todos");
    }

    #[test]
    fn channel_distinguishes_operations_sharing_a_path() {
        let update = endpoint(Resource::Todos, Operation::Update).unwrap();
        let delete = endpoint(Resource::Todos, Operation::Delete).unwrap();
        assert_eq!(update.path, delete.path);
        assert_ne!(update.channel(), delete.channel());
        assert_eq!(update.channel(), "PUT /api/todos/:id");
    }

    #[test]
    fn channels_are_unique_across_the_registry() {
        let mut seen = std::collections::HashSet::new();
        for entry in ENDPOINTS {
            assert!(seen.insert(entry.channel()), "duplicate {}", entry.channel());
        }
    }

    #[test]
    fn only_create_and_update_carry_input_rules() {
        for entry in ENDPOINTS {
            match entry.operation {
                Operation::Create | Operation::Update => assert!(entry.input.is_some()),
                Operation::List | Operation::Delete => assert!(entry.input.is_none()),
            }
        }
    }
}
