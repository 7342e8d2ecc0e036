use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use storage::error::StorageError;
use validator::ValidationErrors;

use crate::coordinator::RecomputeError;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    /// Failure of a recompute shared between coalesced requests.
    SharedStorage(Arc<StorageError>),
    Validation(ValidationErrors),
    InternalServerError(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::SharedStorage(e) => write!(f, "Storage error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::InternalServerError(msg) => write!(f, "Internal server error: {}", msg),
        }
    }
}

fn storage_status(error: &StorageError) -> StatusCode {
    match error {
        StorageError::NotFound => StatusCode::NOT_FOUND,
        StorageError::ConstraintViolation(_) | StorageError::HeatsAlreadyStarted { .. } => {
            StatusCode::CONFLICT
        }
        StorageError::InvalidConfiguration(_) | StorageError::NothingToSchedule { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        StorageError::Database(_) | StorageError::Migration(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn storage_body(error: &StorageError) -> serde_json::Value {
    match error {
        StorageError::NotFound => json!({
            "error": "Resource not found"
        }),
        StorageError::Database(_) | StorageError::Migration(_) => {
            tracing::error!("Storage error: {:?}", error);
            json!({
                "error": "An internal error occurred"
            })
        }
        other => json!({
            "error": other.to_string()
        }),
    }
}

impl WebError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Storage(e) => storage_status(e),
            Self::SharedStorage(e) => storage_status(e),
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let body = match &self {
            Self::Storage(e) => storage_body(e),
            Self::SharedStorage(e) => storage_body(e),
            Self::Validation(errors) => {
                let field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            format!(
                                "{}: {}",
                                field,
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            )
                        })
                    })
                    .collect();

                json!({
                    "error": "Validation failed",
                    "details": field_errors
                })
            }
            Self::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                json!({
                    "error": "An internal error occurred"
                })
            }
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

impl From<RecomputeError> for WebError {
    fn from(error: RecomputeError) -> Self {
        match error {
            RecomputeError::Storage(e) => Self::SharedStorage(e),
            RecomputeError::Aborted(msg) => Self::InternalServerError(msg),
        }
    }
}
