use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

use crate::domain::error::DomainError;
use crate::domain::validation::{self, FieldErrors};

/// HTTP-shaped error: a status plus the exact JSON body to send.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: serde_json::Value,
}

impl ApiError {
    fn new(status: StatusCode, body: serde_json::Value) -> Self {
        Self { status, body }
    }

    pub fn not_found() -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            json!({ "message": "Patient not found" }),
        )
    }

    pub fn validation(errors: &FieldErrors) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "errors": errors }),
        )
    }

    pub fn internal(message: &str) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "message": message }),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Map a domain error onto the wire. `fallback` is the operation's generic
/// message for infrastructure failures; the detail goes to the log only.
pub fn map_domain_error(e: &DomainError, fallback: &str) -> ApiError {
    match e {
        DomainError::PatientNotFound { .. } => ApiError::not_found(),
        DomainError::Validation(errors) => ApiError::validation(errors),
        DomainError::UniqueViolation { field } => {
            // A concurrent writer won the race; report it like the
            // equivalent validation failure.
            let mut errors = FieldErrors::default();
            errors.push(field.as_str(), validation::taken_message(field.as_str()));
            ApiError::validation(&errors)
        }
        DomainError::EmailExhausted { .. } | DomainError::Database { .. } => {
            tracing::error!(error = %e, "request failed");
            ApiError::internal(fallback)
        }
    }
}
