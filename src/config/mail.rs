//! Mail provider configuration (Lob)

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;

/// Mail provider configuration.
///
/// The test key drives previews, digital sends, and deliverability probes.
/// The live key drives real physical sends; when it is absent every call
/// falls back to the test environment.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// API key for the provider's test environment
    pub test_key: Secret<String>,

    /// API key for the provider's live environment
    #[serde(default)]
    pub live_key: Option<Secret<String>>,

    /// Provider API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl MailConfig {
    /// The key for the requested environment, falling back to test.
    pub fn key_for(&self, live: bool) -> &str {
        if live {
            if let Some(key) = &self.live_key {
                return key.expose_secret();
            }
        }
        self.test_key.expose_secret()
    }

    /// Validate mail configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.test_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("MAIL__TEST_KEY"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidIdentityUrl);
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "https://api.lob.com/v1".to_string()
}
