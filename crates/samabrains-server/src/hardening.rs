//! Response hardening: browser security headers.
//!
//! Every response, including rejections from the guards and static files,
//! carries the same header set:
//!
//! 1. **Content-Security-Policy**: scripts, styles, fonts and images only
//!    from the site itself and the CDNs the pages load from.
//!
//! 2. **Framing, sniffing and isolation**: `X-Frame-Options`,
//!    `X-Content-Type-Options`, the cross-origin opener/resource policies and
//!    `Origin-Agent-Cluster`.
//!
//! 3. **Leak reduction**: no referrer, no DNS prefetching, HSTS.
//!
//! No `Cross-Origin-Embedder-Policy`: the pages embed third-party images
//! that do not send CORP headers.

use axum::Router;
use axum::http::{HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

/// Content-Security-Policy sent with every response.
pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
    script-src 'self' 'unsafe-inline' https://cdn.tailwindcss.com; \
    style-src 'self' 'unsafe-inline' https://cdnjs.cloudflare.com https://fonts.googleapis.com; \
    font-src 'self' https://fonts.gstatic.com https://cdnjs.cloudflare.com; \
    img-src 'self' data: https://images.unsplash.com; \
    connect-src 'self'; \
    base-uri 'self'; \
    form-action 'self'; \
    frame-ancestors 'self'; \
    object-src 'none'; \
    script-src-attr 'none'; \
    upgrade-insecure-requests";

/// Header names and values applied to every response.
pub const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("content-security-policy", CONTENT_SECURITY_POLICY),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=31536000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

/// Wrap `router` so every response carries [`SECURITY_HEADERS`].
pub fn with_security_headers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SECURITY_HEADERS
        .iter()
        .fold(router, |router, &(name, value)| {
            router.layer(SetResponseHeaderLayer::overriding(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            ))
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use tower::ServiceExt;

    #[tokio::test]
    async fn every_response_is_hardened() {
        let app = with_security_headers(Router::new().route("/", get(|| async { "ok" })));

        for uri in ["/", "/missing"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();

            for (name, value) in SECURITY_HEADERS {
                assert_eq!(response.headers()[*name], *value, "{name} on {uri}");
            }
            assert!(!response.headers().contains_key("cross-origin-embedder-policy"));
        }
    }

    #[tokio::test]
    async fn handler_headers_are_overridden() {
        let app = with_security_headers(Router::new().route(
            "/",
            get(|| async { ([("x-frame-options", "ALLOWALL")], "ok") }),
        ));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-frame-options"], "SAMEORIGIN");
    }
}
