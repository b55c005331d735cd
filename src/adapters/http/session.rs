use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use uuid::Uuid;

use crate::domain::user::Identity;

pub const SESSION_COOKIE: &str = "postcard_hub_session";

/// In-memory session store backing the browser login flow. Sessions do not
/// survive a restart; the UI falls back to the login redirect.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Identity>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the identity and returns the opaque session id for the cookie.
    pub fn create(&self, identity: Identity) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions
            .write()
            .expect("session lock poisoned")
            .insert(id.clone(), identity);
        id
    }

    pub fn get(&self, session_id: &str) -> Option<Identity> {
        self.sessions
            .read()
            .expect("session lock poisoned")
            .get(session_id)
            .cloned()
    }

    pub fn remove(&self, session_id: &str) {
        self.sessions
            .write()
            .expect("session lock poisoned")
            .remove(session_id);
    }
}

/// Plucks the session cookie value out of the request headers, if present.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// Builds the `Set-Cookie` value for a freshly created session.
pub fn session_cookie(session_id: &str) -> String {
    format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax")
}
