//! Identity verification port.
//!
//! Resolves a caller-supplied personal access token to a member identity.
//! The production adapter calls the identity provider's profile endpoint
//! and caches successful lookups; a mock exists for tests.

use async_trait::async_trait;

use crate::domain::user::{AuthError, Identity};

/// Resolves bearer tokens to member identities.
///
/// # Contract
///
/// - A token the provider accepts resolves to the same identity on every
///   call; implementations may cache.
/// - A rejected token yields `AuthError::Unauthorized`.
/// - Transport failures yield `AuthError::ServiceUnavailable`, never a
///   silent success.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}
