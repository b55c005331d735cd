use axum::extract::State;
use axum::Json;

use crate::adapters::http::dto::ContactsResponse;
use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::AppState;

/// `GET /contacts` — the member directory plus the caller's own credit
/// balance, which the UI shows next to the send button.
pub async fn list_contacts(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ContactsResponse>, ApiError> {
    let contacts = state.store.list_contacts().await?;
    let credits = match state.store.credits(user.id).await {
        Ok(credits) => credits,
        Err(crate::ports::StoreError::NotFound(_)) => 0,
        Err(err) => return Err(err.into()),
    };
    Ok(Json(ContactsResponse { contacts, credits }))
}
