//! Dashboard shell: tab selection over the feature components.

use std::sync::{Mutex, PoisonError};

use crate::api::ApiClient;
use crate::connections::ConnectionManager;
use crate::error::ApiResult;
use crate::models::User;
use crate::profile::ProfileEditor;
use crate::search::DirectorySearch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Search,
    Requests,
    Connections,
    Profile,
}

/// Overview tiles. Each tile fails on its own without hiding the others.
#[derive(Debug)]
pub struct Overview {
    pub greeting: Option<String>,
    pub email_verified: Option<bool>,
    pub profile_strength: ApiResult<u8>,
    pub connection_count: ApiResult<usize>,
    pub pending_count: ApiResult<usize>,
}

#[derive(Debug)]
pub struct Dashboard {
    pub search: DirectorySearch,
    pub connections: ConnectionManager,
    pub profile: ProfileEditor,
    tab: Mutex<Tab>,
}

impl Dashboard {
    pub fn new(client: &ApiClient) -> Self {
        Self {
            search: DirectorySearch::new(client.clone()),
            connections: ConnectionManager::new(client.clone()),
            profile: ProfileEditor::new(client.clone()),
            tab: Mutex::new(Tab::default()),
        }
    }

    pub fn active_tab(&self) -> Tab {
        *self.tab.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Switch tabs and fetch what the new tab shows.
    pub async fn select_tab(&self, tab: Tab) -> ApiResult<()> {
        *self.tab.lock().unwrap_or_else(PoisonError::into_inner) = tab;
        match tab {
            Tab::Overview | Tab::Search => Ok(()),
            Tab::Requests => self.connections.list_pending_requests().await.map(drop),
            Tab::Connections => self.connections.list_connections().await.map(drop),
            Tab::Profile => self.profile.load_profile().await.map(drop),
        }
    }

    /// Load every overview tile concurrently.
    pub async fn overview(&self, user: Option<&User>) -> Overview {
        let (profile, connections, pending) = tokio::join!(
            self.profile.load_profile(),
            self.connections.list_connections(),
            self.connections.list_pending_requests(),
        );

        Overview {
            greeting: user.map(|u| format!("Welcome to TrueLink, {}!", u.full_name)),
            email_verified: user.map(|u| u.email_verified),
            profile_strength: profile.map(|_| self.profile.saved().strength()),
            connection_count: connections.map(|c| c.len()),
            pending_count: pending.map(|p| p.len()),
        }
    }
}
