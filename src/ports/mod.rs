//! Ports: the trait seams between HTTP handlers and the outside world.
//!
//! Each port has a production adapter under `crate::adapters` and a mock
//! used by tests.

mod identity_verifier;
mod mail_client;
mod user_store;

pub use identity_verifier::IdentityVerifier;
pub use mail_client::{
    AddressDetails, CreatedAddress, CreatedPostcard, Deliverability, MailClient, MailError,
    NewAddress, PostcardAddress, PostcardRequest, PostcardSummary,
};
pub use user_store::{GrantOutcome, StoreError, UserStore};
