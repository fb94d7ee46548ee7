use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, field: String },

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: field.into(),
        }
    }

    pub fn not_found(resource: &str) -> Self {
        Self::NotFound(format!("{resource} not found"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Wire shape for every error the API emits. Validation failures carry the
/// first offending field path; not-found and storage failures never do.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorBody {
    pub fn from_error(err: &AppError) -> Self {
        match err {
            AppError::Validation { message, field } => ErrorBody {
                message: message.clone(),
                field: Some(field.clone()),
            },
            AppError::NotFound(message) => ErrorBody {
                message: message.clone(),
                field: None,
            },
            AppError::Database(db_err) => {
                error!("database error: {}", db_err);
                ErrorBody {
                    message: "Database error occurred".to_string(),
                    field: None,
                }
            }
            AppError::Internal => ErrorBody {
                message: "Internal server error".to_string(),
                field: None,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody::from_error(&self);
        (self.status(), Json(body)).into_response()
    }
}
