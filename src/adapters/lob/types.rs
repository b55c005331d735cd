//! Wire types for the Lob API.

use serde::{Deserialize, Serialize};

use crate::ports::Deliverability;

/// Request body for address creation. The owning member's id rides along as
/// metadata so addresses can be traced back to members.
#[derive(Debug, Serialize)]
pub struct CreateAddressBody {
    pub name: String,
    pub address_line1: String,
    pub address_line2: String,
    pub address_city: String,
    pub address_state: String,
    pub address_zip: String,
    pub metadata: AddressMetadata,
}

#[derive(Debug, Serialize)]
pub struct AddressMetadata {
    pub rc_id: String,
}

/// Response body for address deletion.
#[derive(Debug, Deserialize)]
pub struct DeleteAddressBody {
    #[serde(rename = "id")]
    pub address_id: String,
    pub deleted: bool,
}

/// Structured error the provider returns on non-2xx responses:
/// `{"error": {"message", "status_code", "code"}}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderErrorEnvelope {
    pub error: ProviderError,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status_code: u16,
    #[serde(default)]
    pub code: String,
}

/// The paginated postcard listing.
#[derive(Debug, Deserialize)]
pub struct PostcardListBody {
    #[serde(default)]
    pub data: Vec<PostcardListItem>,
}

#[derive(Debug, Deserialize)]
pub struct PostcardListItem {
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub metadata: PostcardMetadata,
    #[serde(default)]
    pub date_created: String,
    #[serde(default)]
    pub expected_delivery_date: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PostcardMetadata {
    #[serde(default)]
    pub to_rc_id: String,
    #[serde(default)]
    pub from_rc_id: String,
    #[serde(default)]
    pub mode: String,
}

/// Optional deliverability annotation on a probe response.
#[derive(Debug, Deserialize)]
pub struct ProbeBody {
    #[serde(default)]
    pub deliverability: Option<String>,
}

/// Map the provider's deliverability strings onto the three-valued verdict.
pub fn parse_deliverability(s: &str) -> Deliverability {
    match s {
        "deliverable" => Deliverability::Deliverable,
        "deliverable_unnecessary_unit"
        | "deliverable_incorrect_unit"
        | "deliverable_missing_unit" => Deliverability::DeliverableWithCaveats,
        _ => Deliverability::Undeliverable,
    }
}
