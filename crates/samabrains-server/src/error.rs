//! HTTP error types for the contact relay server.
//!
//! Maps domain errors from `samabrains-core` into HTTP responses. Every
//! variant produces the same JSON shape as a successful submission,
//! `{"success": false, "message": ...}`, so the browser form reads one field
//! whatever happened. Internal detail stays in the logs.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use samabrains_core::error::{RelayError, ValidationError};

/// Body of every `/api` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiReply {
    pub success: bool,
    pub message: String,
}

impl ApiReply {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Application-level error returned from handlers and middleware.
#[derive(Debug)]
pub enum AppError {
    /// The submission failed validation.
    Validation(ValidationError),
    /// The relay could not deliver the submission.
    Relay(RelayError),
    /// The request body is not a JSON object we can read.
    BadRequest(String),
    /// The request body exceeds the size limit.
    PayloadTooLarge,
    /// The `Origin` header is not on the allow-list.
    OriginRejected,
    /// The client exceeded a rate limit.
    RateLimited(String),
    /// The route exists but not for this method.
    MethodNotAllowed,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(err) => (StatusCode::BAD_REQUEST, err.user_message().to_owned()),
            Self::Relay(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                err.user_message().to_owned(),
            ),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large".to_owned(),
            ),
            Self::OriginRejected => (StatusCode::FORBIDDEN, "Not allowed by CORS".to_owned()),
            Self::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
            Self::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed".to_owned(),
            ),
        };

        (status, axum::Json(ApiReply::failure(message))).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        tracing::debug!(error = %err, "submission rejected");
        Self::Validation(err)
    }
}

impl From<RelayError> for AppError {
    fn from(err: RelayError) -> Self {
        Self::Relay(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge
        } else {
            tracing::debug!(reason = %rejection.body_text(), "unreadable request body");
            Self::BadRequest("Invalid request body".to_owned())
        }
    }
}
