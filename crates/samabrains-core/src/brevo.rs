//! Brevo transactional email transport.
//!
//! `POST`s a [`TransactionalEmail`] to the Brevo v3 `smtp/email` endpoint
//! with the key in the `api-key` header. The request is bounded by a client
//! timeout; nothing is retried.

use std::time::Duration;

use crate::email::TransactionalEmail;
use crate::error::TransportError;
use crate::relay::{ApiKey, MailTransport, UpstreamResponse};

/// Production endpoint for transactional emails.
pub const DEFAULT_BREVO_URL: &str = "https://api.brevo.com/v3/smtp/email";

/// Default bound on one upstream exchange.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// [`MailTransport`] backed by the Brevo REST API.
#[derive(Debug, Clone)]
pub struct BrevoTransport {
    http: reqwest::Client,
    endpoint: String,
}

impl BrevoTransport {
    /// Build a transport posting to `endpoint` with the given timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] if the HTTP client cannot be built
    /// (e.g. no TLS backend available).
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("samabrains-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Request {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl MailTransport for BrevoTransport {
    async fn send(
        &self,
        api_key: &ApiKey,
        email: &TransactionalEmail,
    ) -> Result<UpstreamResponse, TransportError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .header("api-key", api_key.expose())
            .json(email)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;

        tracing::debug!(status, bytes = body.len(), "brevo responded");
        Ok(UpstreamResponse { status, body })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    // reqwest's Display never includes headers, so the key cannot leak here.
    let reason = err.to_string();
    if err.is_timeout() {
        TransportError::Timeout { reason }
    } else if err.is_connect() {
        TransportError::Connect { reason }
    } else {
        TransportError::Request { reason }
    }
}
