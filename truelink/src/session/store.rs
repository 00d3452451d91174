//! In-memory session store.

use std::sync::{Arc, PoisonError, RwLock};

/// Shared handle to the current bearer credential.
///
/// Cloning is cheap and every clone observes the same credential. Only the
/// auth flow writes it; feature components read it when building requests.
#[derive(Debug, Clone, Default)]
pub struct Session {
    credential: Arc<RwLock<Option<String>>>,
}

impl Session {
    /// A session with no credential (cold start).
    pub fn new() -> Self {
        Self::default()
    }

    /// A session restored from a previously stored credential.
    pub fn with_credential(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.set_credential(token);
        session
    }

    pub fn set_credential(&self, token: impl Into<String>) {
        let token = token.into();
        let mut guard = self.credential.write().unwrap_or_else(PoisonError::into_inner);
        *guard = if token.trim().is_empty() { None } else { Some(token) };
    }

    pub fn clear_credential(&self) {
        let mut guard = self.credential.write().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }

    pub fn current_credential(&self) -> Option<String> {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Presence check only; the token is never validated locally.
    pub fn is_authenticated(&self) -> bool {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
