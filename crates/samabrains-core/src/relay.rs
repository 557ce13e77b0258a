//! Email relay: one validated submission, one upstream request.
//!
//! [`EmailRelay`] composes the transactional email, hands it to a
//! [`MailTransport`] exactly once, and translates the upstream status into a
//! [`RelayError`]. There is no retry and no queue: the caller gets one attempt
//! per submission.
//!
//! Status translation, first match wins:
//!
//! | upstream                         | result                       |
//! |----------------------------------|------------------------------|
//! | 2xx                              | `Ok`                         |
//! | 401                              | `Unauthenticated`            |
//! | 402                              | `QuotaExceeded`              |
//! | 400                              | `UpstreamRejected { 400 }`   |
//! | other non-2xx, JSON body         | `UpstreamRejected { status }`|
//! | other non-2xx, non-JSON body     | `UpstreamUnreachable`        |
//! | transport failure                | `UpstreamUnreachable`        |

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::email::{Mailbox, SenderIdentity, TransactionalEmail, compose};
use crate::error::{RelayError, TransportError};
use crate::submission::ContactSubmission;

/// Marker Brevo puts in 401 messages when the key is fine but the caller's
/// IP is not authorized.
const UNRECOGNISED_IP_MARKER: &str = "unrecognised IP address";

/// Upstream API credential.
///
/// `Debug` never prints the key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key, trimming surrounding whitespace. A blank key is `None`.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([redacted])")
    }
}

/// What the upstream answered: status and raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

/// Sends one transactional email to the upstream provider.
///
/// Implementations perform a single HTTP exchange and report its status and
/// body; interpreting them is the relay's job.
#[async_trait::async_trait]
pub trait MailTransport: Send + Sync + 'static {
    /// # Errors
    ///
    /// Returns [`TransportError`] if no HTTP response was obtained.
    async fn send(
        &self,
        api_key: &ApiKey,
        email: &TransactionalEmail,
    ) -> Result<UpstreamResponse, TransportError>;
}

/// Relay settings.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// `None` makes every relay fail with [`RelayError::Misconfigured`].
    pub api_key: Option<ApiKey>,
    /// Mailbox receiving submissions.
    pub operator: Mailbox,
    /// Who appears as the sender.
    pub sender: SenderIdentity,
}

/// A successful upstream acceptance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Upstream message identifier, when the provider returned one.
    pub message_id: Option<String>,
}

/// Relays validated submissions to the upstream provider.
#[derive(Clone)]
pub struct EmailRelay {
    transport: Arc<dyn MailTransport>,
    config: RelayConfig,
}

impl fmt::Debug for EmailRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailRelay")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EmailRelay {
    #[must_use]
    pub fn new(transport: Arc<dyn MailTransport>, config: RelayConfig) -> Self {
        Self { transport, config }
    }

    /// Whether an API key is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    #[must_use]
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Send `submission` to the operator.
    ///
    /// # Errors
    ///
    /// - [`RelayError::Misconfigured`] without an API key; the transport is not called.
    /// - The upstream translations listed in the module docs otherwise.
    pub async fn relay(&self, submission: &ContactSubmission) -> Result<Delivery, RelayError> {
        let Some(api_key) = &self.config.api_key else {
            error!("BREVO_API_KEY is not configured, cannot relay contact submission");
            return Err(RelayError::Misconfigured);
        };

        let email = compose(submission, &self.config.operator, self.config.sender);

        let response = match self.transport.send(api_key, &email).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "email upstream request failed");
                return Err(e.into());
            }
        };

        let outcome = translate(&response);
        match &outcome {
            Ok(delivery) => {
                info!(
                    status = response.status,
                    message_id = delivery.message_id.as_deref().unwrap_or("-"),
                    "contact submission relayed"
                );
            }
            Err(e) => {
                warn!(
                    status = response.status,
                    upstream_message = upstream_message(&response.body).as_deref().unwrap_or("-"),
                    error = %e,
                    "email upstream rejected contact submission"
                );
            }
        }
        outcome
    }
}

/// Map an upstream response onto the relay outcome.
///
/// # Errors
///
/// See the table in the module docs.
pub fn translate(response: &UpstreamResponse) -> Result<Delivery, RelayError> {
    let json = serde_json::from_str::<Value>(&response.body).ok();

    match response.status {
        200..=299 => Ok(Delivery {
            message_id: json
                .as_ref()
                .and_then(|v| v.get("messageId"))
                .and_then(Value::as_str)
                .map(str::to_owned),
        }),
        401 => Err(RelayError::Unauthenticated {
            unrecognised_ip: json
                .as_ref()
                .and_then(message_of)
                .is_some_and(|m| m.contains(UNRECOGNISED_IP_MARKER)),
        }),
        402 => Err(RelayError::QuotaExceeded),
        400 => Err(RelayError::UpstreamRejected { status: 400 }),
        status if json.is_some() => Err(RelayError::UpstreamRejected { status }),
        status => Err(RelayError::UpstreamUnreachable {
            reason: format!("status {status} with a non-JSON body"),
        }),
    }
}

fn message_of(value: &Value) -> Option<&str> {
    value.get("message").and_then(Value::as_str)
}

fn upstream_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| message_of(&v).map(str::to_owned))
}
