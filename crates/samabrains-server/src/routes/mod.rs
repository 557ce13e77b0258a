//! HTTP routes and the application router.

pub mod contact;
pub mod site;

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::http::request::Parts;
use axum::http::{HeaderValue, Method, header};
use axum::middleware as axum_mw;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use samabrains_core::origin::OriginGuard;

use crate::hardening;
use crate::middleware::{general_rate_limit, origin_guard};
use crate::state::AppState;

/// Build the full application router.
///
/// Request order, outermost first: tracing, security headers, CORS, origin
/// guard (`/api/*` only), general rate limit, then routing. Contact
/// submissions additionally pass the email rate limit.
pub fn build_router(state: Arc<AppState>, site_dir: &Path) -> Router {
    let cors = cors_layer(&state.origin_guard);

    let app = Router::new()
        .nest("/api", contact::router(&state))
        .fallback_service(site::service(site_dir))
        .layer(axum_mw::from_fn_with_state(
            Arc::clone(&state),
            general_rate_limit,
        ))
        .layer(axum_mw::from_fn_with_state(Arc::clone(&state), origin_guard))
        .layer(cors);

    hardening::with_security_headers(app)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS driven by the same predicate as the origin guard.
fn cors_layer(guard: &OriginGuard) -> CorsLayer {
    let guard = guard.clone();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin.to_str().is_ok_and(|o| guard.is_allowed(Some(o)))
            },
        ))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}
