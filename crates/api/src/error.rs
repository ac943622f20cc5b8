use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::services::DirectoryError;
use persistence::PersistenceError;
use serde::Serialize;
use thiserror::Error;

use crate::services::{GatewayError, RunError, SyncError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation error: {} invalid field(s)", .0.len())]
    InvalidFields(Vec<ValidationDetail>),

    #[error("Upstream error: {0}")]
    BadGateway(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<ValidationDetail>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg, None),
            ApiError::InvalidFields(details) => {
                let message = if details.len() == 1 {
                    details[0].message.clone()
                } else {
                    format!("{} validation errors", details.len())
                };
                (StatusCode::BAD_REQUEST, "validation_error", message, Some(details))
            }
            ApiError::BadGateway(msg) => {
                tracing::warn!("Upstream error: {}", msg);
                (StatusCode::BAD_GATEWAY, "upstream_error", msg, None)
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound(what) => ApiError::NotFound(what),
            other => ApiError::Internal(format!("Store error: {}", other)),
        }
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::MissingOfficeCode => ApiError::Validation(err.to_string()),
            other => ApiError::BadGateway(other.to_string()),
        }
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Directory(e) => e.into(),
            SyncError::Persistence(e) => e.into(),
        }
    }
}

impl From<RunError> for ApiError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::EmployeeNotFound(_) => ApiError::NotFound(err.to_string()),
            RunError::MissingCredentials(_) => ApiError::Validation(err.to_string()),
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        ApiError::BadGateway(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details = Vec::new();
        collect_details(&errors, "", &mut details);
        ApiError::InvalidFields(details)
    }
}

/// Flattens nested validation errors into `parent.field` entries.
fn collect_details(errors: &validator::ValidationErrors, prefix: &str, out: &mut Vec<ValidationDetail>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            validator::ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|e| ValidationDetail {
                    field: path.clone(),
                    message: e
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                }));
            }
            validator::ValidationErrorsKind::Struct(nested) => collect_details(nested, &path, out),
            validator::ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_details(nested, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}
