//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Values are read with the `POSTCARD_HUB`
//! prefix and `__` (double underscore) as the nesting separator, e.g.
//! `POSTCARD_HUB__DATABASE__URL` -> `database.url`.
//!
//! The process aborts at startup if `load()` or `validate()` fails.

mod database;
mod error;
mod identity;
mod mail;
mod payment;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use identity::IdentityConfig;
pub use mail::MailConfig;
pub use payment::PaymentConfig;
pub use server::ServerConfig;

use serde::Deserialize;

/// Root application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, timeouts)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Identity provider configuration (OAuth + personal access tokens)
    pub identity: IdentityConfig,

    /// Mail provider configuration (Lob)
    pub mail: MailConfig,

    /// Payment configuration (Stripe webhook)
    pub payment: PaymentConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Loads a `.env` file if present (development), then deserializes
    /// `POSTCARD_HUB__*` variables into typed sections.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("POSTCARD_HUB")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.identity.validate()?;
        self.mail.validate()?;
        self.payment.validate()?;
        Ok(())
    }
}
