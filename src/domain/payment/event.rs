//! Stripe webhook event types.
//!
//! Only the fields relevant to credit top-ups are captured; the rest of
//! Stripe's event schema is ignored.

use serde::{Deserialize, Serialize};

/// A Stripe webhook event (simplified).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Type of event (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    pub created: i64,

    /// Event-specific data; `object` is polymorphic on `event_type`.
    pub data: StripeEventData,

    /// Whether this is a live mode event (vs test mode).
    #[serde(default)]
    pub livemode: bool,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

impl StripeEvent {
    /// True for the one event type that grants credits.
    pub fn is_checkout_completed(&self) -> bool {
        self.event_type == "checkout.session.completed"
    }

    /// Attempts to deserialize the data object as the specified type.
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }
}

/// The checkout session carried by a `checkout.session.completed` event.
///
/// `client_reference_id` is set by our checkout link to the member id the
/// purchased credits belong to.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub client_reference_id: Option<String>,
}

impl CheckoutSession {
    /// Parse the client reference into a member id.
    pub fn member_id(&self) -> Option<i64> {
        self.client_reference_id.as_deref()?.parse().ok()
    }
}
