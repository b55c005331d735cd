//! HTTP surface: routing, handlers, auth middleware, and DTOs.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::{middleware as axum_middleware, Router};
use tower_http::trace::TraceLayer;

use crate::config::IdentityConfig;
use crate::domain::payment::StripeWebhookVerifier;
use crate::ports::{IdentityVerifier, MailClient, UserStore};

pub mod addresses;
pub mod contacts;
pub mod dto;
pub mod error;
pub mod home;
pub mod middleware;
pub mod oauth;
pub mod postcards;
pub mod profiles;
pub mod session;
pub mod webhook;

pub use session::SessionStore;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub mail: Arc<dyn MailClient>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub sessions: SessionStore,
    pub identity_config: Arc<IdentityConfig>,
    pub webhook_verifier: Arc<StripeWebhookVerifier>,
    /// Credits granted per completed checkout.
    pub credit_grant: i64,
    /// Client for the OAuth token exchange.
    pub http_client: reqwest::Client,
}

/// Builds the application router. Routes that act on behalf of a member sit
/// behind the authentication middleware; the landing page, login flow, and
/// the payment webhook are public.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/addresses",
            get(addresses::get_address)
                .post(addresses::create_address)
                .delete(addresses::delete_address),
        )
        .route(
            "/postcards",
            get(postcards::list_postcards)
                .post(postcards::send_postcard)
                .layer(DefaultBodyLimit::max(postcards::MAX_UPLOAD_BYTES)),
        )
        .route("/contacts", get(contacts::list_contacts))
        .route("/profiles", delete(profiles::delete_profile))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::authenticate,
        ));

    Router::new()
        .route("/", get(home::index))
        .route("/static/app.js", get(home::app_js))
        .route("/favicon.ico", get(home::favicon))
        .route("/login", get(oauth::login))
        .route("/auth", get(oauth::callback))
        .route("/stripeWebhook", post(webhook::stripe_webhook))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
