//! Contact route: `POST /api/send-email`
//!
//! Reads the JSON form, validates it and relays it upstream. Any other method
//! on the path answers 405 in the same JSON shape.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::handler::Handler;
use axum::middleware as axum_mw;
use axum::routing::post;
use axum::{Json, Router};

use samabrains_core::submission::{ContactForm, ContactSubmission};

use crate::error::{ApiReply, AppError};
use crate::middleware::email_rate_limit;
use crate::state::AppState;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 10 * 1024;

/// Build the contact router. Only `POST` counts against the email limit.
pub fn router(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let submit = send_email.layer(axum_mw::from_fn_with_state(
        Arc::clone(state),
        email_rate_limit,
    ));

    Router::new()
        .route("/send-email", post(submit).fallback(method_not_allowed))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

async fn send_email(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> Result<Json<ApiReply>, AppError> {
    let Json(form) = payload?;
    let submission = ContactSubmission::try_from(form)?;

    state.relay.relay(&submission).await?;

    Ok(Json(ApiReply::ok("Email sent successfully")))
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
