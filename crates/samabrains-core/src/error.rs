//! Error types for `samabrains-core`.
//!
//! Each error variant carries enough context to diagnose the problem from the
//! logs. `Display` is the internal, detailed form; [`user_message`] methods
//! give the short text that is safe to show to the person filling in the
//! form. Neither form ever contains the upstream API key.
//!
//! [`user_message`]: RelayError::user_message

use crate::submission::Field;

/// A contact submission failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A field is absent, empty, or only whitespace.
    #[error("missing required field '{field}'")]
    MissingField { field: Field },

    /// A field exceeds its character limit.
    #[error("field '{field}' is {actual} characters long, maximum is {max}")]
    TooLong {
        field: Field,
        max: usize,
        actual: usize,
    },

    /// The email address does not have the `local@domain.tld` shape.
    #[error("email address does not have the shape local@domain.tld")]
    InvalidEmailShape,
}

impl ValidationError {
    /// Text returned to the submitter.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "All fields are required",
            Self::TooLong { .. } => "Input too long",
            Self::InvalidEmailShape => "Invalid email address",
        }
    }
}

/// The HTTP call to the upstream provider did not produce a response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request did not complete within the configured timeout.
    #[error("upstream request timed out: {reason}")]
    Timeout { reason: String },

    /// DNS resolution or the TCP/TLS connection failed.
    #[error("could not connect to upstream: {reason}")]
    Connect { reason: String },

    /// Any other failure building, sending, or reading the request.
    #[error("upstream request failed: {reason}")]
    Request { reason: String },
}

/// Relaying a validated submission to the upstream provider failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    /// No upstream API key is configured; nothing was sent.
    #[error("BREVO_API_KEY is not configured")]
    Misconfigured,

    /// The upstream provider rejected the credential (HTTP 401).
    #[error("upstream rejected credentials (unrecognised IP: {unrecognised_ip})")]
    Unauthenticated {
        /// The key is valid but the server's IP is not on the provider's allow-list.
        unrecognised_ip: bool,
    },

    /// The upstream account is out of credits (HTTP 402).
    #[error("upstream quota exceeded")]
    QuotaExceeded,

    /// The upstream provider refused the request with a non-2xx status.
    #[error("upstream rejected request with status {status}")]
    UpstreamRejected { status: u16 },

    /// The upstream provider could not be reached or answered with something
    /// that is not its API.
    #[error("upstream unreachable: {reason}")]
    UpstreamUnreachable { reason: String },
}

impl RelayError {
    /// Generic category text returned to the submitter.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Misconfigured => "Server configuration error",
            Self::Unauthenticated {
                unrecognised_ip: true,
            } => {
                "Authentication failed. IP address not authorized in Brevo. Please contact the administrator."
            }
            Self::Unauthenticated {
                unrecognised_ip: false,
            } => "Authentication failed. Please contact the administrator.",
            Self::QuotaExceeded => "Email service temporarily unavailable. Please try again later.",
            Self::UpstreamRejected { status: 400 } => "Invalid request. Please check your input.",
            Self::UpstreamRejected { .. } => "Failed to send email. Please try again later.",
            Self::UpstreamUnreachable { .. } => "An error occurred. Please try again later.",
        }
    }
}

impl From<TransportError> for RelayError {
    fn from(err: TransportError) -> Self {
        Self::UpstreamUnreachable {
            reason: err.to_string(),
        }
    }
}
