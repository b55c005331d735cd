use serde::{Deserialize, Serialize};

use crate::domain::user::Contact;
use crate::ports::{AddressDetails, CreatedAddress, PostcardSummary};

/// Form body for `POST /addresses`, as submitted by the registration page.
#[derive(Debug, Deserialize)]
pub struct AddressForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address1: String,
    #[serde(default)]
    pub address2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default, rename = "acceptsPhysicalMail")]
    pub accepts_physical_mail: String,
}

impl AddressForm {
    /// HTML checkboxes arrive as a handful of truthy spellings depending on
    /// how the form was serialized.
    pub fn opts_into_physical_mail(&self) -> bool {
        matches!(
            self.accepts_physical_mail.as_str(),
            "true" | "on" | "1" | "yes"
        )
    }

    pub fn first_missing_field(&self) -> Option<&'static str> {
        if self.name.trim().is_empty() {
            Some("name")
        } else if self.address1.trim().is_empty() {
            Some("address1")
        } else if self.city.trim().is_empty() {
            Some("city")
        } else if self.state.trim().is_empty() {
            Some("state")
        } else if self.zip.trim().is_empty() {
            Some("zip")
        } else {
            None
        }
    }
}

/// Canonical address representation returned by both the create and the
/// fetch endpoints.
#[derive(Debug, Serialize)]
pub struct AddressResponse {
    pub name: String,
    pub address_line1: String,
    pub address_line2: String,
    pub address_city: String,
    pub address_state: String,
    pub address_zip: String,
    pub address_country: String,
    pub accepts_physical_mail: bool,
}

impl AddressResponse {
    pub fn from_created(created: CreatedAddress, accepts_physical_mail: bool) -> Self {
        Self {
            name: created.name,
            address_line1: created.address_line1,
            address_line2: created.address_line2,
            address_city: created.address_city,
            address_state: created.address_state,
            address_zip: created.address_zip,
            address_country: "US".to_string(),
            accepts_physical_mail,
        }
    }

    pub fn from_details(details: AddressDetails, accepts_physical_mail: bool) -> Self {
        Self {
            name: details.name,
            address_line1: details.address_line1,
            address_line2: details.address_line2,
            address_city: details.address_city,
            address_state: details.address_state,
            address_zip: details.address_zip,
            address_country: details.address_country,
            accepts_physical_mail,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SendPostcardResponse {
    /// Render URL; only populated for previews.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub credits: i64,
}

#[derive(Debug, Serialize)]
pub struct PostcardsResponse {
    pub postcards: Vec<PostcardSummary>,
}

#[derive(Debug, Serialize)]
pub struct ContactsResponse {
    pub contacts: Vec<Contact>,
    pub credits: i64,
}
