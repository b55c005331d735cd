//! Identity provider configuration (OAuth + personal access tokens)

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;

/// Identity provider configuration.
///
/// The same provider serves two flows: the OAuth authorization-code flow
/// (browser login with a session cookie) and direct bearer-token lookups
/// against the profile endpoint (personal access tokens).
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// OAuth client id
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: Secret<String>,

    /// Redirect URI registered with the provider (our /auth endpoint)
    pub redirect_uri: String,

    /// Authorization endpoint
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,

    /// Token exchange endpoint
    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// Profile endpoint used to resolve a bearer token to an identity
    #[serde(default = "default_profile_url")]
    pub profile_url: String,

    /// Seconds a verified token stays in the cache
    #[serde(default = "default_token_cache_ttl")]
    pub token_cache_ttl_secs: u64,

    /// Maximum number of tokens held in the cache
    #[serde(default = "default_token_cache_capacity")]
    pub token_cache_capacity: usize,
}

impl IdentityConfig {
    pub fn client_secret(&self) -> &str {
        self.client_secret.expose_secret()
    }

    /// Validate identity configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.client_id.is_empty() {
            return Err(ValidationError::MissingRequired("IDENTITY__CLIENT_ID"));
        }
        if self.client_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("IDENTITY__CLIENT_SECRET"));
        }
        if self.redirect_uri.is_empty() {
            return Err(ValidationError::MissingRequired("IDENTITY__REDIRECT_URI"));
        }
        for url in [
            &self.authorize_url,
            &self.token_url,
            &self.profile_url,
            &self.redirect_uri,
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidIdentityUrl);
            }
        }
        Ok(())
    }
}

fn default_authorize_url() -> String {
    "https://www.recurse.com/oauth/authorize".to_string()
}

fn default_token_url() -> String {
    "https://www.recurse.com/oauth/token".to_string()
}

fn default_profile_url() -> String {
    "https://www.recurse.com/api/v1/profiles/me".to_string()
}

fn default_token_cache_ttl() -> u64 {
    3600
}

fn default_token_cache_capacity() -> usize {
    10_000
}
