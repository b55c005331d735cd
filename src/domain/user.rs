//! Member identity and stored user records.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity resolved from the identity provider.
///
/// This is the shape of the provider's profile endpoint response; only the
/// fields we use are captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider-assigned member id
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// One row in `user_info`: a community member known to this service.
///
/// A record is created when a member first registers an address. The
/// `lob_address_id` is empty until then; `user_name` and `user_email` are
/// denormalized copies of identity-provider fields refreshed on address
/// creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub recurse_id: i64,
    pub lob_address_id: String,
    pub accepts_physical_mail: bool,
    pub num_credits: i64,
    pub user_name: String,
    pub user_email: String,
}

impl UserRecord {
    pub fn has_address(&self) -> bool {
        !self.lob_address_id.is_empty()
    }
}

/// Directory entry returned by the contacts listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "recurseId")]
    pub recurse_id: i64,
    pub name: String,
    pub email: String,
    #[serde(rename = "acceptsPhysicalMail")]
    pub accepts_physical_mail: bool,
}

/// Authentication failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No credential was presented at all.
    #[error("missing authentication token")]
    MissingToken,

    /// The provider rejected the credential.
    #[error("unauthorized")]
    Unauthorized,

    /// The provider could not be reached or answered unintelligibly.
    #[error("identity provider unavailable: {0}")]
    ServiceUnavailable(String),
}
