//! Webhook processing errors.

use thiserror::Error;

/// Failure while verifying or interpreting a webhook delivery.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WebhookError {
    /// Signature did not match the payload.
    #[error("webhook signature verification failed")]
    InvalidSignature,

    /// Event is older than the accepted replay window.
    #[error("webhook timestamp outside accepted window")]
    TimestampOutOfRange,

    /// Event timestamp is implausibly far in the future.
    #[error("webhook timestamp in the future")]
    InvalidTimestamp,

    /// Signature header or JSON payload could not be parsed.
    #[error("webhook parse error: {0}")]
    ParseError(String),
}
