use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::AppState;
use crate::domain::payment::CheckoutSession;
use crate::ports::GrantOutcome;

const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// `POST /stripeWebhook`
///
/// Verifies the payment provider's signature over the raw body, then grants
/// credits for completed checkouts. The event id is recorded atomically with
/// the grant, so a retried delivery grants at most once and a failed grant
/// stays retryable. Always returns 200 for events we verified but chose not
/// to act on, so the provider stops retrying them.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("missing signature header".to_string()))?;

    let event = state
        .webhook_verifier
        .verify_and_parse(&body, signature)
        .map_err(|err| {
            tracing::warn!(error = %err, "webhook signature verification failed");
            ApiError::BadRequest("invalid webhook payload".to_string())
        })?;

    if !event.is_checkout_completed() {
        tracing::debug!(event_type = %event.event_type, "ignoring webhook event");
        return Ok(Json(serde_json::json!({ "received": true })));
    }

    let session: CheckoutSession = event.deserialize_object().map_err(|err| {
        tracing::warn!(error = %err, "checkout session payload was not decodable");
        ApiError::BadRequest("invalid checkout session".to_string())
    })?;
    let member_id = session
        .member_id()
        .ok_or_else(|| ApiError::BadRequest("missing client reference id".to_string()))?;

    // Dedup and grant happen in one atomic store operation: a failed grant
    // leaves the event unrecorded, so the 500 below makes the provider
    // retry a delivery that can still succeed.
    match state
        .store
        .grant_credits_for_event(&event.id, member_id, state.credit_grant)
        .await?
    {
        GrantOutcome::Granted => {
            tracing::info!(
                member_id,
                credits = state.credit_grant,
                event_id = %event.id,
                "credits granted"
            );
        }
        GrantOutcome::Duplicate => {
            tracing::info!(event_id = %event.id, "webhook event already processed");
        }
        GrantOutcome::UnknownMember => {
            // Paid before registering an address; nothing to credit yet.
            tracing::warn!(member_id, event_id = %event.id, "payment for unknown member");
        }
    }

    Ok(Json(serde_json::json!({ "received": true })))
}
