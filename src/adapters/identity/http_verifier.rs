//! HTTP adapter for the `IdentityVerifier` port.
//!
//! Forwards the caller's token to the identity provider's profile endpoint
//! and caches successful lookups keyed by the raw token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::domain::user::{AuthError, Identity};
use crate::ports::IdentityVerifier;

use super::token_cache::TokenCache;

/// Verifies personal access tokens against the identity provider.
pub struct HttpIdentityVerifier {
    profile_url: String,
    http_client: reqwest::Client,
    cache: TokenCache,
}

impl HttpIdentityVerifier {
    pub fn new(
        profile_url: impl Into<String>,
        http_client: reqwest::Client,
        cache_ttl: Duration,
        cache_capacity: usize,
    ) -> Self {
        Self {
            profile_url: profile_url.into(),
            http_client,
            cache: TokenCache::new(cache_ttl, cache_capacity),
        }
    }

    #[cfg(test)]
    async fn prime_cache(&self, token: &str, identity: Identity) {
        self.cache.insert(token.to_string(), identity).await;
    }

    async fn fetch_identity(&self, token: &str) -> Result<Identity, AuthError> {
        let response = self
            .http_client
            .get(&self.profile_url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("identity provider unreachable: {}", e);
                AuthError::ServiceUnavailable(e.to_string())
            })?;

        match response.status() {
            StatusCode::OK => response.json::<Identity>().await.map_err(|e| {
                tracing::error!("identity provider returned malformed profile: {}", e);
                AuthError::ServiceUnavailable(e.to_string())
            }),
            status if status.is_server_error() => {
                tracing::error!("identity provider returned {}", status);
                Err(AuthError::ServiceUnavailable(status.to_string()))
            }
            status => {
                tracing::debug!("identity provider rejected token ({})", status);
                Err(AuthError::Unauthorized)
            }
        }
    }
}

#[async_trait]
impl IdentityVerifier for HttpIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        if let Some(identity) = self.cache.get(token).await {
            return Ok(identity);
        }

        let identity = self.fetch_identity(token).await?;
        self.cache.insert(token.to_string(), identity.clone()).await;
        Ok(identity)
    }
}

impl std::fmt::Debug for HttpIdentityVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpIdentityVerifier")
            .field("profile_url", &self.profile_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_token_is_missing_not_unauthorized() {
        let verifier = HttpIdentityVerifier::new(
            "https://identity.example.com/profiles/me",
            reqwest::Client::new(),
            Duration::from_secs(60),
            16,
        );
        // The distinction matters: the auth middleware falls back to the
        // session cookie only when no token was presented.
        let result = verifier.verify("").await;
        assert_eq!(result.unwrap_err(), AuthError::MissingToken);
    }

    #[tokio::test]
    async fn cached_token_resolves_without_a_provider_call() {
        // Port 1 refuses connections, so any provider call would surface as
        // ServiceUnavailable.
        let verifier = HttpIdentityVerifier::new(
            "http://127.0.0.1:1/profiles/me",
            reqwest::Client::new(),
            Duration::from_secs(60),
            16,
        );
        let identity = Identity {
            id: 42,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        };

        assert!(matches!(
            verifier.verify("tok").await,
            Err(AuthError::ServiceUnavailable(_))
        ));

        verifier.prime_cache("tok", identity.clone()).await;
        assert_eq!(verifier.verify("tok").await.unwrap(), identity);
    }

    #[test]
    fn verifier_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpIdentityVerifier>();
    }
}
