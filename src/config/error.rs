//! Configuration error types

use thiserror::Error;

/// Error loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Semantic validation failure for a loaded configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("required configuration value missing: {0}")]
    MissingRequired(&'static str),

    #[error("database URL must be a postgres:// or postgresql:// URL")]
    InvalidDatabaseUrl,

    #[error("min_connections must not exceed max_connections")]
    InvalidPoolSize,

    #[error("max_connections must not exceed 100")]
    PoolSizeTooLarge,

    #[error("server port must be non-zero")]
    InvalidPort,

    #[error("request timeout must be between 1 and 300 seconds")]
    InvalidTimeout,

    #[error("identity provider URLs must be http(s) URLs")]
    InvalidIdentityUrl,

    #[error("Stripe webhook secret must start with whsec_")]
    InvalidWebhookSecret,

    #[error("credit grant must be positive")]
    InvalidCreditGrant,
}
