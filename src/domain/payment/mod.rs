//! Stripe webhook processing: event types, signature verification, errors.

mod error;
mod event;
mod verifier;

pub use error::WebhookError;
pub use event::{CheckoutSession, StripeEvent};
pub use verifier::StripeWebhookVerifier;

#[cfg(test)]
pub use verifier::compute_test_signature;
