use axum::extract::State;
use axum::{Form, Json};

use crate::adapters::http::dto::{AddressForm, AddressResponse};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::AppState;
use crate::domain::postcard::COMMUNITY_ADDRESS;
use crate::domain::user::UserRecord;
use crate::ports::NewAddress;

/// `POST /addresses`
///
/// Validates the submitted address, optionally probes deliverability when the
/// member opts into physical mail, stores the address at the provider, and
/// upserts the member's record. Nothing is persisted if any step fails.
pub async fn create_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddressForm>,
) -> Result<Json<AddressResponse>, ApiError> {
    if let Some(field) = form.first_missing_field() {
        return Err(ApiError::BadRequest(format!("missing field: {field}")));
    }

    let accepts_physical_mail = form.opts_into_physical_mail();
    let address = NewAddress {
        name: form.name.trim().to_string(),
        line1: form.address1.trim().to_string(),
        line2: form.address2.trim().to_string(),
        city: form.city.trim().to_string(),
        state: form.state.trim().to_string(),
        zip: form.zip.trim().to_string(),
    };

    // Opting into physical mail requires an address the carrier can reach.
    if accepts_physical_mail {
        let verdict = state.mail.verify_deliverability(&address).await?;
        if !verdict.accepts_mail() {
            return Err(ApiError::BadRequest(
                "address is not deliverable; check the street, city, and zip".to_string(),
            ));
        }
    }

    let created = state.mail.create_address(&address, user.id, true).await?;
    tracing::info!(
        member_id = user.id,
        address_id = %created.address_id,
        accepts_physical_mail,
        "address registered"
    );

    state
        .store
        .upsert(&UserRecord {
            recurse_id: user.id,
            lob_address_id: created.address_id.clone(),
            accepts_physical_mail,
            num_credits: 0,
            user_name: user.name,
            user_email: user.email,
        })
        .await?;

    Ok(Json(AddressResponse::from_created(
        created,
        accepts_physical_mail,
    )))
}

/// `GET /addresses`
///
/// Members without a stored address get the community's shared address so
/// the UI always has something to render.
pub async fn get_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<AddressResponse>, ApiError> {
    let record = state.store.get(user.id).await?;

    match record {
        Some(record) if record.has_address() => {
            let details = state
                .mail
                .get_address(&record.lob_address_id, true)
                .await?;
            Ok(Json(AddressResponse::from_details(
                details,
                record.accepts_physical_mail,
            )))
        }
        record => {
            let accepts_physical_mail =
                record.map(|r| r.accepts_physical_mail).unwrap_or(false);
            Ok(Json(AddressResponse {
                name: COMMUNITY_ADDRESS.name.to_string(),
                address_line1: COMMUNITY_ADDRESS.line1.to_string(),
                address_line2: COMMUNITY_ADDRESS.line2.to_string(),
                address_city: COMMUNITY_ADDRESS.city.to_string(),
                address_state: COMMUNITY_ADDRESS.state.to_string(),
                address_zip: COMMUNITY_ADDRESS.zip.to_string(),
                address_country: COMMUNITY_ADDRESS.country.to_string(),
                accepts_physical_mail,
            }))
        }
    }
}

/// `DELETE /addresses`
///
/// Removes the stored address at the provider and drops the member's record.
pub async fn delete_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<serde_json::Value>, ApiError> {
    let record = state
        .store
        .get(user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("no address on file".to_string()))?;

    if record.has_address() {
        state
            .mail
            .delete_address(&record.lob_address_id, true)
            .await?;
    }
    state.store.delete(user.id).await?;
    tracing::info!(member_id = user.id, "address and profile removed");

    Ok(Json(serde_json::json!({ "deleted": true })))
}
