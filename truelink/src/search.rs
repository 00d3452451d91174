//! Directory search.
//!
//! Every call bumps a generation counter. A response may only write the
//! held results if its generation is still the latest, so a slow response
//! to an older query can never overwrite a newer one.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::api::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::models::{SearchEnvelope, UserSummary};

#[derive(Debug, Default)]
struct SearchState {
    generation: u64,
    completed: u64,
    term: String,
    results: Vec<UserSummary>,
    error: Option<String>,
}

#[derive(Debug)]
pub struct DirectorySearch {
    client: ApiClient,
    state: Mutex<SearchState>,
}

impl DirectorySearch {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: Mutex::new(SearchState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Search the directory. A blank term clears results without a network call.
    pub async fn search(&self, term: &str) -> ApiResult<Vec<UserSummary>> {
        let term = term.trim();

        let generation = {
            let mut state = self.state();
            state.generation += 1;
            state.term = term.to_string();
            state.error = None;
            if term.is_empty() {
                state.results.clear();
                state.completed = state.generation;
                return Ok(Vec::new());
            }
            state.generation
        };

        let path = format!("/api/connections/search?q={}", urlencoding::encode(term));
        let result: ApiResult<SearchEnvelope> = self.client.get(&path, "Search failed").await;

        let mut state = self.state();
        if state.generation != generation {
            debug!(generation, latest = state.generation, "discarding stale search response");
            return Err(ApiError::Superseded);
        }
        state.completed = generation;

        match result {
            Ok(envelope) => {
                debug!(count = envelope.users.len(), "search results");
                state.results.clone_from(&envelope.users);
                Ok(envelope.users)
            }
            Err(e) => {
                state.results.clear();
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Drop a user from the held results. Returns whether it was present.
    pub fn remove_user(&self, user_id: &str) -> bool {
        let mut state = self.state();
        let before = state.results.len();
        state.results.retain(|u| u.id != user_id);
        state.results.len() != before
    }

    pub fn find(&self, user_id: &str) -> Option<UserSummary> {
        self.state().results.iter().find(|u| u.id == user_id).cloned()
    }

    pub fn results(&self) -> Vec<UserSummary> {
        self.state().results.clone()
    }

    /// Error from the latest search, if it failed.
    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    pub fn term(&self) -> String {
        self.state().term.clone()
    }

    /// True while the most recently started search has not answered yet.
    pub fn is_loading(&self) -> bool {
        let state = self.state();
        state.completed != state.generation
    }
}
