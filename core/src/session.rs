//! Bearer-token session.
//!
//! A non-empty token is the only signal the rest of the client uses to
//! decide "logged in" vs "logged out".

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::store::{KeyValueStore, MemoryStore};

pub const TOKEN_KEY: &str = "auth_token";

/// Holds at most one credential, persisted through the injected store.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn KeyValueStore>,
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Session backed by a process-lifetime store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn set_token(&self, token: &str) {
        self.store.set(TOKEN_KEY, Value::from(token));
    }

    pub fn token(&self) -> Option<String> {
        self.store.get_string(TOKEN_KEY)
    }

    pub fn clear(&self) {
        self.store.remove(TOKEN_KEY);
    }

    pub fn is_logged_in(&self) -> bool {
        self.token().is_some_and(|t| !t.is_empty())
    }

    /// `Authorization` header value, when logged in.
    pub fn bearer(&self) -> Option<String> {
        self.token()
            .filter(|t| !t.is_empty())
            .map(|t| format!("Bearer {t}"))
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("logged_in", &self.is_logged_in())
            .finish()
    }
}
