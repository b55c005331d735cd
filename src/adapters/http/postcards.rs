use axum::extract::{Multipart, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::adapters::http::dto::{PostcardsResponse, SendPostcardResponse};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::AppState;
use crate::domain::postcard::{render_back, SendMode, COMMUNITY_ADDRESS};
use crate::ports::{PostcardAddress, PostcardRequest, StoreError};

/// Upload ceiling for the multipart body; front images can legitimately be
/// several megabytes, well past the framework's default limit.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Deserialize)]
pub struct SendQuery {
    mode: String,
    #[serde(rename = "toRecurseId")]
    to_recurse_id: i64,
}

const FRONT_FIELD: &str = "front-postcard-file";
const BACK_FIELD: &str = "back";

/// `POST /postcards?mode=...&toRecurseId=...`
///
/// Multipart body carries the front image and the back-of-card message.
/// Physical sends are gated on the sender's credit balance before the
/// provider is contacted, and the credit is spent only after the provider
/// accepts the card.
pub async fn send_postcard(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<SendQuery>,
    multipart: Multipart,
) -> Result<Json<SendPostcardResponse>, ApiError> {
    let mode: SendMode = query
        .mode
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("unknown mode: {}", query.mode)))?;

    let (front_image, message) = read_card_parts(multipart).await?;

    if mode.consumes_credit() {
        let balance = match state.store.credits(user.id).await {
            Ok(balance) => balance,
            Err(StoreError::NotFound(_)) => 0,
            Err(err) => return Err(err.into()),
        };
        if balance <= 0 {
            return Err(ApiError::PaymentRequired);
        }
    }

    let to = resolve_recipient(&state, mode, query.to_recurse_id).await?;
    let from = PostcardAddress::Inline {
        name: user.name.clone(),
        line1: COMMUNITY_ADDRESS.line1.to_string(),
        line2: COMMUNITY_ADDRESS.line2.to_string(),
        city: COMMUNITY_ADDRESS.city.to_string(),
        state: COMMUNITY_ADDRESS.state.to_string(),
        zip: COMMUNITY_ADDRESS.zip.to_string(),
    };

    let created = state
        .mail
        .create_postcard(&PostcardRequest {
            from,
            to,
            front_image,
            back_html: render_back(&message),
            live: mode.is_live(),
            from_member_id: user.id,
            to_member_id: query.to_recurse_id,
            mode: mode.as_str().to_string(),
        })
        .await?;

    let credits = if mode.consumes_credit() {
        match state.store.try_spend_credit(user.id).await? {
            Some(remaining) => remaining,
            None => {
                // The card already left for the provider; a concurrent send
                // drained the balance between the gate and the decrement.
                tracing::error!(
                    member_id = user.id,
                    "postcard sent but no credit could be spent"
                );
                return Err(ApiError::Internal);
            }
        }
    } else {
        match state.store.credits(user.id).await {
            Ok(balance) => balance,
            Err(StoreError::NotFound(_)) => 0,
            Err(err) => return Err(err.into()),
        }
    };

    tracing::info!(
        member_id = user.id,
        to_member_id = query.to_recurse_id,
        mode = %mode,
        "postcard created"
    );

    Ok(Json(SendPostcardResponse {
        url: (mode == SendMode::DigitalPreview).then_some(created.url),
        credits,
    }))
}

/// `GET /postcards` — sends addressed to the caller, merged across the
/// provider's live and test environments so digital cards show up too.
pub async fn list_postcards(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<PostcardsResponse>, ApiError> {
    let mut postcards = state.mail.list_postcards(user.id, true).await?;
    postcards.extend(state.mail.list_postcards(user.id, false).await?);
    Ok(Json(PostcardsResponse { postcards }))
}

/// Pulls the front image and back message out of the multipart body.
async fn read_card_parts(mut multipart: Multipart) -> Result<(Vec<u8>, String), ApiError> {
    let mut front_image: Option<Vec<u8>> = None;
    let mut message: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::BadRequest(format!("unreadable multipart body: {err}")))?
    {
        match field.name() {
            Some(FRONT_FIELD) => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| ApiError::BadRequest(format!("unreadable front image: {err}")))?;
                front_image = Some(bytes.to_vec());
            }
            Some(BACK_FIELD) => {
                let text = field
                    .text()
                    .await
                    .map_err(|err| ApiError::BadRequest(format!("unreadable message: {err}")))?;
                message = Some(text);
            }
            _ => {}
        }
    }

    let front_image = front_image
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("missing field: {FRONT_FIELD}")))?;
    let message =
        message.ok_or_else(|| ApiError::BadRequest(format!("missing field: {BACK_FIELD}")))?;

    Ok((front_image, message))
}

/// Picks the destination for a send: the recipient's stored address for
/// physical mail, the community address (with the recipient's name where we
/// know it) otherwise.
async fn resolve_recipient(
    state: &AppState,
    mode: SendMode,
    to_member_id: i64,
) -> Result<PostcardAddress, ApiError> {
    match mode {
        SendMode::PhysicalSend => {
            let recipient = state
                .store
                .get(to_member_id)
                .await?
                .filter(|record| record.has_address())
                .ok_or_else(|| {
                    ApiError::NotFound(format!("member {to_member_id} has no address on file"))
                })?;
            if !recipient.accepts_physical_mail {
                return Err(ApiError::BadRequest(
                    "recipient does not accept physical mail".to_string(),
                ));
            }
            Ok(PostcardAddress::Reference(recipient.lob_address_id))
        }
        SendMode::DigitalSend => {
            let recipient = state
                .store
                .get(to_member_id)
                .await?
                .ok_or_else(|| {
                    ApiError::NotFound(format!("member {to_member_id} is not registered"))
                })?;
            Ok(community_destination(recipient.user_name))
        }
        SendMode::DigitalPreview => {
            Ok(community_destination(COMMUNITY_ADDRESS.name.to_string()))
        }
    }
}

fn community_destination(name: String) -> PostcardAddress {
    PostcardAddress::Inline {
        name,
        line1: COMMUNITY_ADDRESS.line1.to_string(),
        line2: COMMUNITY_ADDRESS.line2.to_string(),
        city: COMMUNITY_ADDRESS.city.to_string(),
        state: COMMUNITY_ADDRESS.state.to_string(),
        zip: COMMUNITY_ADDRESS.zip.to_string(),
    }
}
