//! Connection lifecycle: send, list, and resolve connection requests.
//!
//! A request the viewer receives is `pending` until the viewer accepts or
//! rejects it. Both outcomes are terminal, and a resolved request is
//! dropped from the local pending list only after the server confirms the
//! decision. Accepted connections are not synthesized locally; they show up
//! on the next [`ConnectionManager::list_connections`].

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::api::{ApiClient, InFlight, InFlightSet};
use crate::error::{ApiError, ApiResult};
use crate::models::{
    Connection, ConnectionRequest, ConnectionsEnvelope, Decision, RequestsEnvelope,
};
use crate::search::DirectorySearch;

/// Result of [`ConnectionManager::send_request`] when no hard error occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// A new pending request was created.
    Sent,
    /// A request or connection already exists between the two users.
    AlreadyRequested { message: String },
}

#[derive(Debug, Serialize)]
struct SendBody<'a> {
    receiver_id: &'a str,
}

#[derive(Debug, Serialize)]
struct ResolveBody {
    status: Decision,
}

#[derive(Debug, Default)]
struct LocalLists {
    pending: Vec<ConnectionRequest>,
    connections: Vec<Connection>,
}

#[derive(Debug)]
pub struct ConnectionManager {
    client: ApiClient,
    loading_requests: InFlight,
    loading_connections: InFlight,
    sending: InFlightSet,
    resolving: InFlightSet,
    lists: Mutex<LocalLists>,
}

impl ConnectionManager {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            loading_requests: InFlight::new(),
            loading_connections: InFlight::new(),
            sending: InFlightSet::new(),
            resolving: InFlightSet::new(),
            lists: Mutex::new(LocalLists::default()),
        }
    }

    fn lists(&self) -> MutexGuard<'_, LocalLists> {
        self.lists.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch requests awaiting the viewer's decision.
    ///
    /// An empty `Ok` means there are none; a missing or rejected credential is
    /// always `Err(ApiError::Unauthorized { .. })`, never an empty list.
    pub async fn list_pending_requests(&self) -> ApiResult<Vec<ConnectionRequest>> {
        let _guard = self.loading_requests.begin()?;
        let envelope: RequestsEnvelope = self
            .client
            .get("/api/connections/requests", "Failed to load connection requests")
            .await?;
        debug!(count = envelope.requests.len(), "pending requests loaded");
        self.lists().pending.clone_from(&envelope.requests);
        Ok(envelope.requests)
    }

    /// Fetch the viewer's accepted connections. Same error contract as
    /// [`Self::list_pending_requests`].
    pub async fn list_connections(&self) -> ApiResult<Vec<Connection>> {
        let _guard = self.loading_connections.begin()?;
        let envelope: ConnectionsEnvelope = self
            .client
            .get("/api/connections", "Failed to load connections")
            .await?;
        debug!(count = envelope.connections.len(), "connections loaded");
        self.lists().connections.clone_from(&envelope.connections);
        Ok(envelope.connections)
    }

    /// Ask `target_user_id` to connect.
    ///
    /// On success and on a duplicate (409) the target is removed from
    /// `results`, if given. Any other failure leaves `results` untouched.
    pub async fn send_request(
        &self,
        target_user_id: &str,
        results: Option<&DirectorySearch>,
    ) -> ApiResult<SendOutcome> {
        let _guard = self.sending.begin(target_user_id)?;
        let body = SendBody {
            receiver_id: target_user_id,
        };
        let sent: ApiResult<Value> = self
            .client
            .post("/api/connections/request", &body, "Failed to send connection request")
            .await;

        let outcome = match sent {
            Ok(_) => {
                info!(target_user_id, "connection request sent");
                SendOutcome::Sent
            }
            Err(ApiError::Conflict { message }) => {
                info!(target_user_id, "connection request already exists");
                SendOutcome::AlreadyRequested { message }
            }
            Err(e) => return Err(e),
        };

        if let Some(search) = results {
            search.remove_user(target_user_id);
        }
        Ok(outcome)
    }

    /// Accept or reject a pending request.
    ///
    /// Only ids currently in the local pending list can be resolved. The id
    /// is removed from that list once the server confirms; on any failure
    /// the list is unchanged. A refresh that lands while the call is
    /// outstanding does not turn a confirmed decision into an error.
    pub async fn resolve_request(
        &self,
        request_id: &str,
        decision: Decision,
    ) -> ApiResult<ConnectionRequest> {
        let Some(request) = self.pending_request(request_id) else {
            return Err(ApiError::NotPending(request_id.to_string()));
        };
        let _guard = self.resolving.begin(request_id)?;

        let path = format!(
            "/api/connections/requests/{}",
            urlencoding::encode(request_id)
        );
        let fallback = match decision {
            Decision::Accepted => "Failed to accept connection",
            Decision::Rejected => "Failed to reject connection",
        };
        let _: Value = self
            .client
            .put(&path, &ResolveBody { status: decision }, fallback)
            .await?;

        self.lists().pending.retain(|r| r.id != request_id);
        info!(request_id, %decision, sender_id = %request.sender_id, "connection request resolved");
        Ok(request)
    }

    pub fn pending_request(&self, request_id: &str) -> Option<ConnectionRequest> {
        self.lists()
            .pending
            .iter()
            .find(|r| r.id == request_id)
            .cloned()
    }

    /// Requests still available for a decision.
    pub fn pending(&self) -> Vec<ConnectionRequest> {
        self.lists().pending.clone()
    }

    pub fn connections(&self) -> Vec<Connection> {
        self.lists().connections.clone()
    }

    pub fn is_loading_requests(&self) -> bool {
        self.loading_requests.is_busy()
    }

    pub fn is_loading_connections(&self) -> bool {
        self.loading_connections.is_busy()
    }

    pub fn is_sending(&self, target_user_id: &str) -> bool {
        self.sending.is_busy(target_user_id)
    }

    pub fn is_resolving(&self, request_id: &str) -> bool {
        self.resolving.is_busy(request_id)
    }
}
