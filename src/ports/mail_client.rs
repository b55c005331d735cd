//! Mail provider port.
//!
//! Wraps the external postal API: address storage, deliverability probes,
//! and postcard creation. Every operation is a single provider call with no
//! retries; a failed call is terminal for the request that made it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Address fields submitted by a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
    pub name: String,
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// Provider response to address creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedAddress {
    #[serde(rename = "id")]
    pub address_id: String,
    pub name: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    pub address_city: String,
    pub address_state: String,
    pub address_zip: String,
}

/// Address fields as stored at the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressDetails {
    pub name: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: String,
    pub address_city: String,
    pub address_state: String,
    pub address_zip: String,
    #[serde(default)]
    pub address_country: String,
}

/// Deliverability verdict from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deliverability {
    Deliverable,
    /// Deliverable but the unit designation is wrong, missing, or
    /// unnecessary.
    DeliverableWithCaveats,
    Undeliverable,
}

impl Deliverability {
    pub fn accepts_mail(&self) -> bool {
        !matches!(self, Deliverability::Undeliverable)
    }
}

/// Destination or return address for a postcard: either a provider-side
/// address reference or inline fields.
#[derive(Debug, Clone)]
pub enum PostcardAddress {
    Reference(String),
    Inline {
        name: String,
        line1: String,
        line2: String,
        city: String,
        state: String,
        zip: String,
    },
}

/// Everything the provider needs to create one postcard.
#[derive(Debug, Clone)]
pub struct PostcardRequest {
    pub from: PostcardAddress,
    pub to: PostcardAddress,
    /// Raw image bytes for the front of the card.
    pub front_image: Vec<u8>,
    /// Rendered HTML for the back of the card.
    pub back_html: String,
    /// Live credentials (real physical delivery) vs test.
    pub live: bool,
    pub from_member_id: i64,
    pub to_member_id: i64,
    /// Send mode recorded as provider metadata.
    pub mode: String,
}

/// Provider response to postcard creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedPostcard {
    #[serde(default)]
    pub url: String,
}

/// One prior send, as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostcardSummary {
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub from_member_id: String,
    #[serde(default)]
    pub to_member_id: String,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub date_created: String,
    #[serde(default)]
    pub expected_delivery_date: String,
}

/// Mail provider failure.
///
/// `Rejected` carries the provider's own structured error (4xx business
/// rules: pricing, validation, quota) and is forwarded to clients verbatim;
/// everything else is generic to the caller.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail provider rejected request ({status}): {message}")]
    Rejected {
        status: u16,
        message: String,
        code: String,
    },

    #[error("mail provider unavailable ({status})")]
    Unavailable { status: u16 },

    #[error("mail provider transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail provider returned malformed response: {0}")]
    MalformedResponse(String),
}

impl MailError {
    /// True when the provider's own status and error body should be passed
    /// through to the client.
    pub fn is_client_visible(&self) -> bool {
        matches!(self, MailError::Rejected { .. })
    }
}

/// Mail provider operations.
#[async_trait]
pub trait MailClient: Send + Sync {
    /// Store an address, tagged with the owning member's id.
    async fn create_address(
        &self,
        address: &NewAddress,
        owner_id: i64,
        live: bool,
    ) -> Result<CreatedAddress, MailError>;

    /// Fetch a stored address.
    async fn get_address(&self, address_id: &str, live: bool)
        -> Result<AddressDetails, MailError>;

    /// Delete a stored address.
    async fn delete_address(&self, address_id: &str, live: bool) -> Result<(), MailError>;

    /// Probe deliverability by creating a test postcard to the address.
    async fn verify_deliverability(
        &self,
        address: &NewAddress,
    ) -> Result<Deliverability, MailError>;

    /// Create a postcard (physical or digital depending on `request.live`).
    async fn create_postcard(
        &self,
        request: &PostcardRequest,
    ) -> Result<CreatedPostcard, MailError>;

    /// List prior sends addressed to the given member.
    async fn list_postcards(
        &self,
        recipient_id: i64,
        live: bool,
    ) -> Result<Vec<PostcardSummary>, MailError>;
}
