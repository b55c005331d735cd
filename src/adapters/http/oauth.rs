use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Redirect, Response};
use reqwest::Url;
use serde::Deserialize;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::session::session_cookie;
use crate::adapters::http::AppState;

/// `GET /login` — sends the browser to the identity provider's consent page.
pub async fn login(State(state): State<AppState>) -> Result<Redirect, ApiError> {
    let config = &state.identity_config;
    let url = Url::parse_with_params(
        &config.authorize_url,
        &[
            ("client_id", config.client_id.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("response_type", "code"),
        ],
    )
    .map_err(|err| {
        tracing::error!(error = %err, "authorize url is not parseable");
        ApiError::Internal
    })?;
    Ok(Redirect::temporary(url.as_str()))
}

#[derive(Deserialize)]
pub struct AuthCallback {
    code: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// `GET /auth` — the redirect target. Exchanges the authorization code for
/// an access token, resolves the profile behind it, and starts a session.
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<AuthCallback>,
) -> Result<Response, ApiError> {
    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing authorization code".to_string()))?;

    let config = &state.identity_config;
    let token = state
        .http_client
        .post(&config.token_url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret()),
            ("redirect_uri", config.redirect_uri.as_str()),
        ])
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|err| {
            tracing::error!(error = %err, "authorization code exchange failed");
            ApiError::Internal
        })?
        .json::<TokenResponse>()
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "token response was not decodable");
            ApiError::Internal
        })?;

    let identity = state.identity.verify(&token.access_token).await?;
    tracing::info!(member_id = identity.id, "browser session started");

    let session_id = state.sessions.create(identity);
    let headers = [(SET_COOKIE, session_cookie(&session_id))];
    Ok((headers, Redirect::to("/")).into_response())
}
