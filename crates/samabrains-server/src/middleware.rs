//! Request guards: origin allow-list and per-client rate limits.
//!
//! All of them run as `axum::middleware::from_fn_with_state` layers over the
//! shared [`AppState`] and answer rejections themselves, so a rejected
//! request never reaches the validator or the relay.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::header::{ORIGIN, RETRY_AFTER};
use axum::http::{HeaderName, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use samabrains_core::rate_limit::{RateDecision, RateLimiter};

use crate::error::AppError;
use crate::state::AppState;

const HEADER_RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const HEADER_RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const HEADER_RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

/// Reject `/api/*` requests whose `Origin` is not allowed.
///
/// Requests without an `Origin` header (same-origin navigation, curl) pass.
/// An `Origin` that is not valid UTF-8 never matches the allow-list.
pub async fn origin_guard(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !request.uri().path().starts_with("/api/") {
        return next.run(request).await;
    }

    let origin = request
        .headers()
        .get(ORIGIN)
        .map(|v| v.to_str().unwrap_or_default());

    if state.origin_guard.is_allowed(origin) {
        next.run(request).await
    } else {
        tracing::warn!(origin = origin.unwrap_or_default(), "origin rejected");
        AppError::OriginRejected.into_response()
    }
}

/// Apply the general limit to every request.
pub async fn general_rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    enforce(&state.general_limiter, state.trust_proxy, request, next).await
}

/// Apply the contact submission limit.
pub async fn email_rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    enforce(&state.email_limiter, state.trust_proxy, request, next).await
}

async fn enforce(
    limiter: &RateLimiter,
    trust_proxy: bool,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = client_key(&request, trust_proxy);
    let decision = limiter.check(&client).await;

    if !decision.allowed {
        tracing::warn!(
            policy = %limiter.policy().name,
            client = %client,
            "rate limit exceeded"
        );
        let mut response = AppError::RateLimited(limiter.policy().message.clone()).into_response();
        attach_rate_limit_headers(&mut response, &decision);
        response
            .headers_mut()
            .insert(RETRY_AFTER, header_number(decision.reset_secs()));
        return response;
    }

    let mut response = next.run(request).await;
    attach_rate_limit_headers(&mut response, &decision);
    response
}

/// Inner limiters run closer to the handler, so their headers are already
/// present when an outer limiter gets the response. The tighter one wins.
fn attach_rate_limit_headers(response: &mut Response, decision: &RateDecision) {
    let headers = response.headers_mut();
    if headers.contains_key(HEADER_RATE_LIMIT_LIMIT) {
        return;
    }
    headers.insert(HEADER_RATE_LIMIT_LIMIT, header_number(decision.limit));
    headers.insert(HEADER_RATE_LIMIT_REMAINING, header_number(decision.remaining));
    headers.insert(HEADER_RATE_LIMIT_RESET, header_number(decision.reset_secs()));
}

fn header_number(n: impl Into<u64>) -> HeaderValue {
    HeaderValue::from(n.into())
}

/// Identify the client a request counts against.
///
/// The socket peer address, unless `trust_proxy` is set and a forwarding
/// header carries a valid IP. Falls back to `unknown`.
pub fn client_key<B>(request: &Request<B>, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(ip) = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(parse_x_forwarded_for)
        {
            return ip.to_string();
        }

        if let Some(ip) = request
            .headers()
            .get("x-real-ip")
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| parse_ip_addr(raw.trim()))
        {
            return ip.to_string();
        }
    }

    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    "unknown".to_owned()
}

fn parse_x_forwarded_for(raw: &str) -> Option<IpAddr> {
    raw.split(',').map(str::trim).find_map(parse_ip_addr)
}

fn parse_ip_addr(raw: &str) -> Option<IpAddr> {
    raw.parse::<IpAddr>()
        .ok()
        .or_else(|| raw.parse::<SocketAddr>().ok().map(|addr| addr.ip()))
}
