use axum::extract::State;
use axum::Json;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::AppState;

/// `DELETE /profiles` — full account removal: the provider-side address (if
/// any) and the member's row, credits included.
pub async fn delete_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<serde_json::Value>, ApiError> {
    let record = state
        .store
        .get(user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("no profile on file".to_string()))?;

    if record.has_address() {
        state
            .mail
            .delete_address(&record.lob_address_id, true)
            .await?;
    }
    state.store.delete(user.id).await?;
    tracing::info!(member_id = user.id, "profile deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}
