use async_trait::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::session::session_id_from_headers;
use crate::adapters::http::AppState;
use crate::domain::user::Identity;

/// Resolves the caller's identity before protected handlers run.
///
/// A bearer token is tried first; if no usable token is presented the
/// session cookie set by the browser login flow is consulted. Requests that
/// resolve neither way are rejected with 401 before reaching a handler.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(token) = bearer_token(&request) {
        if let Ok(identity) = state.identity.verify(&token).await {
            request.extensions_mut().insert(identity);
            return Ok(next.run(request).await);
        }
    }

    if let Some(session_id) = session_id_from_headers(request.headers()) {
        if let Some(identity) = state.sessions.get(&session_id) {
            request.extensions_mut().insert(identity);
            return Ok(next.run(request).await);
        }
    }

    Err(ApiError::Unauthorized)
}

fn bearer_token(request: &Request) -> Option<String> {
    let header = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Extractor for handlers behind [`authenticate`]. Pulls the identity the
/// middleware stored in request extensions.
pub struct RequireAuth(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(RequireAuth)
            .ok_or(ApiError::Unauthorized)
    }
}
