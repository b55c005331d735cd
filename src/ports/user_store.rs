//! User record store port.
//!
//! One flat table of member records; contacts and addresses are views over
//! the same rows.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::user::{Contact, UserRecord};

/// Store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no record for member {0}")]
    NotFound(i64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Outcome of an idempotent credit grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantOutcome {
    /// Credits were added to the member's balance.
    Granted,
    /// The event id had already been processed; nothing changed.
    Duplicate,
    /// The event was recorded but no member row exists to credit.
    UnknownMember,
}

/// Persistence operations over `user_info`.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a member record, or update address fields and the denormalized
    /// identity fields if one exists. Never touches the credit balance.
    async fn upsert(&self, record: &UserRecord) -> Result<(), StoreError>;

    /// Fetch a member record.
    async fn get(&self, member_id: i64) -> Result<Option<UserRecord>, StoreError>;

    /// Current credit balance. `NotFound` if no row exists.
    async fn credits(&self, member_id: i64) -> Result<i64, StoreError>;

    /// Atomically spend one credit if the balance is positive.
    ///
    /// Returns the remaining balance, or `None` when the balance was
    /// already zero (including when racing sends drained it first).
    async fn try_spend_credit(&self, member_id: i64) -> Result<Option<i64>, StoreError>;

    /// Record a webhook event id and grant credits in one atomic step.
    ///
    /// A failed grant must leave the event id unrecorded so the provider's
    /// retry can succeed; once an id is recorded every later delivery of it
    /// is a `Duplicate`.
    async fn grant_credits_for_event(
        &self,
        event_id: &str,
        member_id: i64,
        amount: i64,
    ) -> Result<GrantOutcome, StoreError>;

    /// All member records as directory entries.
    async fn list_contacts(&self) -> Result<Vec<Contact>, StoreError>;

    /// Delete a member record. `NotFound` if no row exists.
    async fn delete(&self, member_id: i64) -> Result<(), StoreError>;
}
