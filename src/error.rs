use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt::Display;

use crate::domain::DomainError;

pub type AppResult<T> = Result<T, AppError>;

/// API-facing error with an HTTP status and a machine-readable code.
/// All variants here are recoverable by the caller; nothing panics.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl AppError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation", message)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "permission_denied", message)
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "invalid_state", message)
    }

    pub fn load_locked(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "load_locked", message)
    }

    pub fn storage<E: Display>(error: E) -> Self {
        Self::new(
            StatusCode::BAD_GATEWAY,
            "storage",
            format!("object storage failure: {error}"),
        )
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized")
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", "resource not found")
    }

    pub fn internal<E: Display>(error: E) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal",
            error.to_string(),
        )
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status;
        let body = Json(ErrorResponse {
            error: self.message,
            code: self.code,
        });
        (status, body).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl From<DomainError> for AppError {
    fn from(value: DomainError) -> Self {
        match &value {
            DomainError::NoParent | DomainError::MultipleParents => {
                AppError::validation(value.to_string())
            }
            DomainError::InvalidCategory { .. } => AppError::validation(value.to_string()),
            DomainError::MissingReason => AppError::validation(value.to_string()),
            DomainError::UnknownStatus(_) | DomainError::UnknownTrailerType(_) => {
                AppError::validation(value.to_string())
            }
            DomainError::IllegalTransition { .. } => AppError::invalid_state(value.to_string()),
            DomainError::LoadLocked { .. } => AppError::load_locked(value.to_string()),
        }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(value: diesel::result::Error) -> Self {
        match value {
            diesel::result::Error::NotFound => AppError::not_found(),
            _ => AppError::internal(value),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        AppError::internal(value)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        AppError::internal(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        AppError::internal(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        AppError::internal(value)
    }
}
