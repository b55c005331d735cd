use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::EnvFilter;

use postcard_hub::adapters::http::{router, AppState, SessionStore};
use postcard_hub::adapters::identity::HttpIdentityVerifier;
use postcard_hub::adapters::lob::LobClient;
use postcard_hub::adapters::postgres::PgUserStore;
use postcard_hub::config::AppConfig;
use postcard_hub::domain::payment::StripeWebhookVerifier;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone())),
        )
        .init();

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .max_lifetime(config.database.max_lifetime())
        .connect(&config.database.url)
        .await?;

    let store = PgUserStore::new(pool);
    store.ensure_schema().await?;

    let http_client = reqwest::Client::builder()
        .timeout(config.server.outbound_timeout())
        .build()?;

    let identity_verifier = HttpIdentityVerifier::new(
        config.identity.profile_url.clone(),
        http_client.clone(),
        Duration::from_secs(config.identity.token_cache_ttl_secs),
        config.identity.token_cache_capacity,
    );
    let mail_client = LobClient::new(config.mail.clone(), http_client.clone());
    let webhook_verifier = StripeWebhookVerifier::new(config.payment.webhook_secret());

    let state = AppState {
        store: Arc::new(store),
        mail: Arc::new(mail_client),
        identity: Arc::new(identity_verifier),
        sessions: SessionStore::new(),
        identity_config: Arc::new(config.identity.clone()),
        webhook_verifier: Arc::new(webhook_verifier),
        credit_grant: config.payment.credit_grant,
        http_client,
    };

    let app = router(state).layer(TimeoutLayer::new(config.server.request_timeout()));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "postcard hub listening");
    axum::serve(listener, app).await?;

    Ok(())
}
