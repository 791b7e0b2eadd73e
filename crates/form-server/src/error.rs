use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::airtable::AirtableError;

/// Application-level error type for HTTP handlers.
///
/// Every variant renders as `{ "message": ..., "code": ... }`; validation
/// failures also carry the individual `errors`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("Validation failed")]
    Validation(Vec<String>),

    #[error(transparent)]
    Airtable(#[from] AirtableError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Validation(errors) => {
                let body = json!({
                    "message": self.to_string(),
                    "code": "VALIDATION_ERROR",
                    "errors": errors,
                });
                return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
            }
            AppError::Airtable(AirtableError::NotConnected) => (
                StatusCode::BAD_REQUEST,
                "AIRTABLE_NOT_CONNECTED",
                self.to_string(),
            ),
            AppError::Airtable(AirtableError::NotConfigured) => {
                tracing::error!("Airtable OAuth client id is not configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AIRTABLE_NOT_CONFIGURED",
                    self.to_string(),
                )
            }
            AppError::Airtable(err) => {
                tracing::error!(error = %err, "Airtable request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "AIRTABLE_ERROR",
                    "Airtable request failed".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "message": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
