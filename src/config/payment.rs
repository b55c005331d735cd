//! Payment configuration (Stripe webhook)

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;

/// Payment webhook configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe webhook signing secret
    pub webhook_secret: Secret<String>,

    /// Credits granted per completed checkout
    #[serde(default = "default_credit_grant")]
    pub credit_grant: i64,
}

impl PaymentConfig {
    pub fn webhook_secret(&self) -> &str {
        self.webhook_secret.expose_secret()
    }

    /// Validate payment configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.webhook_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__WEBHOOK_SECRET"));
        }
        if !self.webhook_secret.expose_secret().starts_with("whsec_") {
            return Err(ValidationError::InvalidWebhookSecret);
        }
        if self.credit_grant <= 0 {
            return Err(ValidationError::InvalidCreditGrant);
        }
        Ok(())
    }
}

fn default_credit_grant() -> i64 {
    5
}
