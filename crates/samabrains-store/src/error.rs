//! Store error types.

/// Errors that can occur while recording or reading hit counters.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("counter store unavailable: {reason}")]
    Unavailable { reason: String },

    /// A window of zero length was requested for a key.
    #[error("invalid window for key '{key}': window must be longer than zero")]
    InvalidWindow { key: String },
}
