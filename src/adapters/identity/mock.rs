//! Mock identity verifier for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::user::{AuthError, Identity};
use crate::ports::IdentityVerifier;

/// In-memory verifier: preloaded token -> identity pairs, counting lookups
/// so cache behavior can be asserted.
#[derive(Default)]
pub struct MockIdentityVerifier {
    identities: HashMap<String, Identity>,
    lookups: AtomicUsize,
}

impl MockIdentityVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.identities.insert(token.into(), identity);
        self
    }

    /// Number of verify calls made against this mock.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityVerifier for MockIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        self.identities
            .get(token)
            .cloned()
            .ok_or(AuthError::Unauthorized)
    }
}
