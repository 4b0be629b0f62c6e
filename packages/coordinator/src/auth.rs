//! Session-token auth for the HTTP surface.
//!
//! Entirely outside the relay core: `POST /api/auth` trades the configured
//! password for a bearer token, and the other HTTP endpoints check the
//! token before reaching the relay. When no password is configured the
//! whole layer is disabled and every request passes.

use std::collections::HashSet;

use axum::http::HeaderMap;
use tokio::sync::Mutex;
use uuid::Uuid;

/// In-memory session store. Tokens live for the coordinator's process
/// lifetime; there is no persistence and no expiry.
pub struct AuthSessions {
    password: Option<String>,
    tokens: Mutex<HashSet<String>>,
}

impl AuthSessions {
    pub fn new(password: Option<String>) -> Self {
        if password.is_none() {
            tracing::warn!("No auth password configured, HTTP endpoints are open");
        }
        Self {
            password,
            tokens: Mutex::new(HashSet::new()),
        }
    }

    /// Exchange the password for a fresh session token.
    pub async fn issue(&self, password: &str) -> Option<String> {
        match &self.password {
            Some(expected) if expected == password => {
                let token = Uuid::new_v4().to_string();
                let mut tokens = self.tokens.lock().await;
                tokens.insert(token.clone());
                Some(token)
            }
            Some(_) => None,
            // Auth disabled: hand out a token anyway so clients can use
            // one code path.
            None => Some(Uuid::new_v4().to_string()),
        }
    }

    /// Check the `Authorization: Bearer <token>` header. Always true when
    /// auth is disabled.
    pub async fn verify(&self, headers: &HeaderMap) -> bool {
        if self.password.is_none() {
            return true;
        }
        let Some(token) = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
        else {
            return false;
        };
        let tokens = self.tokens.lock().await;
        tokens.contains(token)
    }
}
