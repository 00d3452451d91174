//! In-process stand-in for the TrueLink API, used by the component tests.
//!
//! Endpoints mirror the real service:
//! - POST /api/auth/register, POST /api/auth/login
//! - GET/PUT /api/profile/me
//! - GET /api/connections/search?q=
//! - POST /api/connections/request
//! - GET /api/connections/requests, PUT /api/connections/requests/{id}
//! - GET /api/connections

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::api::ApiClient;
use crate::config::Config;
use crate::models::ProfessionalProfile;
use crate::session::Session;

type Reply = (StatusCode, Json<Value>);
type HandlerResult = Result<Reply, Reply>;

struct FakeUser {
    id: String,
    email: String,
    full_name: String,
    password: String,
    profile: ProfessionalProfile,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RequestState {
    Pending,
    Accepted,
    Rejected,
}

struct FakeRequest {
    id: String,
    sender_id: String,
    receiver_id: String,
    state: RequestState,
    created_at: DateTime<Utc>,
}

struct FakeConnection {
    id: String,
    a: String,
    b: String,
    connected_at: DateTime<Utc>,
}

#[derive(Default)]
struct Store {
    users: Vec<FakeUser>,
    tokens: HashMap<String, String>,
    requests: Vec<FakeRequest>,
    connections: Vec<FakeConnection>,
    /// Artificial latency per search term.
    search_delays: HashMap<String, Duration>,
    /// Latency added after a resolution is applied, before the reply.
    resolve_delay: Option<Duration>,
}

impl Store {
    fn user(&self, id: &str) -> Option<&FakeUser> {
        self.users.iter().find(|u| u.id == id)
    }

    fn issue_token(&mut self, user_id: &str) -> String {
        let token = format!("tok-{}", Uuid::now_v7());
        self.tokens.insert(token.clone(), user_id.to_string());
        token
    }

    fn user_json(user: &FakeUser) -> Value {
        json!({
            "id": user.id,
            "email": user.email,
            "full_name": user.full_name,
            "email_verified": false,
            "profile_picture_url": null,
            "verification_tier": "basic",
            "created_at": Utc::now(),
        })
    }
}

struct FakeState {
    store: RwLock<Store>,
    hits: AtomicUsize,
}

/// A running fake API bound to an ephemeral local port.
pub struct FakeApi {
    pub base_url: String,
    state: Arc<FakeState>,
}

impl FakeApi {
    pub async fn spawn() -> Self {
        let state = Arc::new(FakeState {
            store: RwLock::new(Store::default()),
            hits: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/api/auth/register", post(register))
            .route("/api/auth/login", post(login))
            .route("/api/profile/me", get(get_profile).put(update_profile))
            .route("/api/connections/search", get(search))
            .route("/api/connections/request", post(send_request))
            .route("/api/connections/requests", get(pending_requests))
            .route("/api/connections/requests/{id}", put(resolve_request))
            .route("/api/connections", get(list_connections))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("bind fake api");
        let addr = listener.local_addr().expect("fake api address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake api server");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn config(&self) -> Config {
        Config::new(self.base_url.clone(), "/nonexistent/truelink-session")
    }

    pub fn client(&self, session: Session) -> ApiClient {
        ApiClient::new(&self.config(), session).expect("api client")
    }

    /// Register a user directly in the store and return `(id, token)`.
    pub async fn seed_user(&self, email: &str, full_name: &str, password: &str) -> (String, String) {
        let mut store = self.state.store.write().await;
        let id = format!("u{}", store.users.len() + 1);
        store.users.push(FakeUser {
            id: id.clone(),
            email: email.to_string(),
            full_name: full_name.to_string(),
            password: password.to_string(),
            profile: ProfessionalProfile::default(),
        });
        let token = store.issue_token(&id);
        (id, token)
    }

    pub async fn set_profile(&self, user_id: &str, profile: ProfessionalProfile) {
        let mut store = self.state.store.write().await;
        if let Some(user) = store.users.iter_mut().find(|u| u.id == user_id) {
            user.profile = profile;
        }
    }

    pub async fn profile_of(&self, user_id: &str) -> ProfessionalProfile {
        let store = self.state.store.read().await;
        store.user(user_id).map(|u| u.profile.clone()).unwrap_or_default()
    }

    pub async fn delay_search(&self, term: &str, delay: Duration) {
        self.state
            .store
            .write()
            .await
            .search_delays
            .insert(term.to_string(), delay);
    }

    pub async fn delay_resolve(&self, delay: Duration) {
        self.state.store.write().await.resolve_delay = Some(delay);
    }

    /// Number of requests the server has handled so far.
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }
}

fn fail(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({ "message": message })))
}

fn viewer(store: &Store, headers: &HeaderMap) -> Result<String, Reply> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|token| store.tokens.get(token))
        .cloned()
        .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Missing or invalid token"))
}

// === Handlers ===

#[derive(Deserialize)]
struct RegisterBody {
    email: String,
    full_name: String,
    password: String,
}

async fn register(State(state): State<Arc<FakeState>>, Json(body): Json<RegisterBody>) -> HandlerResult {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if body.password.len() < 8 {
        return Err(fail(StatusCode::BAD_REQUEST, "Password must be at least 8 characters"));
    }

    let mut store = state.store.write().await;
    if store.users.iter().any(|u| u.email == body.email) {
        return Err(fail(StatusCode::CONFLICT, "User already exists"));
    }

    let id = format!("u{}", store.users.len() + 1);
    store.users.push(FakeUser {
        id: id.clone(),
        email: body.email,
        full_name: body.full_name,
        password: body.password,
        profile: ProfessionalProfile::default(),
    });
    let token = store.issue_token(&id);
    let user = store.user(&id).map(Store::user_json).unwrap_or(Value::Null);

    Ok((StatusCode::CREATED, Json(json!({ "token": token, "user": user }))))
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(state): State<Arc<FakeState>>, Json(body): Json<LoginBody>) -> HandlerResult {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let mut store = state.store.write().await;
    let id = store
        .users
        .iter()
        .find(|u| u.email == body.email && u.password == body.password)
        .map(|u| u.id.clone())
        .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Invalid email or password"))?;

    let token = store.issue_token(&id);
    let user = store.user(&id).map(Store::user_json).unwrap_or(Value::Null);

    Ok((StatusCode::OK, Json(json!({ "token": token, "user": user }))))
}

async fn get_profile(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> HandlerResult {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let store = state.store.read().await;
    let me = viewer(&store, &headers)?;
    let profile = store.user(&me).map(|u| u.profile.clone()).unwrap_or_default();
    Ok((StatusCode::OK, Json(json!(profile))))
}

async fn update_profile(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> HandlerResult {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let mut store = state.store.write().await;
    let me = viewer(&store, &headers)?;

    // reject empty strings so callers must send null for unset fields
    if let Some(fields) = body.as_object() {
        if fields.values().any(|v| v.as_str() == Some("")) {
            return Err(fail(StatusCode::BAD_REQUEST, "Empty strings are not allowed"));
        }
    }
    let profile: ProfessionalProfile = serde_json::from_value(body)
        .map_err(|_| fail(StatusCode::BAD_REQUEST, "Invalid profile"))?;
    if profile.headline.as_ref().is_some_and(|h| h.len() > 120) {
        return Err(fail(StatusCode::UNPROCESSABLE_ENTITY, "Headline is too long"));
    }

    if let Some(user) = store.users.iter_mut().find(|u| u.id == me) {
        user.profile = profile.clone();
    }

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Profile updated successfully", "profile": profile })),
    ))
}

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
}

async fn search(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> HandlerResult {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let term = params.q.unwrap_or_default();
    if term.trim().is_empty() {
        return Err(fail(StatusCode::BAD_REQUEST, "Search query is required"));
    }

    let delay = state.store.read().await.search_delays.get(&term).copied();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let store = state.store.read().await;
    let me = viewer(&store, &headers).ok();
    let needle = term.to_lowercase();
    let users: Vec<Value> = store
        .users
        .iter()
        .filter(|u| Some(&u.id) != me.as_ref())
        .filter(|u| {
            u.full_name.to_lowercase().contains(&needle) || u.email.to_lowercase().contains(&needle)
        })
        .map(|u| {
            json!({
                "id": u.id,
                "email": u.email,
                "full_name": u.full_name,
                "headline": u.profile.headline,
            })
        })
        .collect();

    Ok((StatusCode::OK, Json(json!({ "count": users.len(), "users": users }))))
}

#[derive(Deserialize)]
struct SendBody {
    receiver_id: String,
}

async fn send_request(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<SendBody>,
) -> HandlerResult {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let mut store = state.store.write().await;
    let me = viewer(&store, &headers)?;

    if body.receiver_id == me {
        return Err(fail(StatusCode::BAD_REQUEST, "Cannot connect with yourself"));
    }
    if store.user(&body.receiver_id).is_none() {
        return Err(fail(StatusCode::NOT_FOUND, "User not found"));
    }
    let between = |a: &str, b: &str| {
        (a == me && b == body.receiver_id) || (a == body.receiver_id && b == me)
    };
    let exists = store
        .requests
        .iter()
        .any(|r| r.state != RequestState::Rejected && between(&r.sender_id, &r.receiver_id))
        || store.connections.iter().any(|c| between(&c.a, &c.b));
    if exists {
        return Err((
            StatusCode::CONFLICT,
            Json(json!({ "error": "Connection request already exists" })),
        ));
    }

    let id = format!("r{}", store.requests.len() + 1);
    store.requests.push(FakeRequest {
        id: id.clone(),
        sender_id: me.clone(),
        receiver_id: body.receiver_id.clone(),
        state: RequestState::Pending,
        created_at: Utc::now(),
    });

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Connection request sent",
            "connection": { "id": id, "sender_id": me, "receiver_id": body.receiver_id, "status": "pending" }
        })),
    ))
}

async fn pending_requests(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> HandlerResult {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let store = state.store.read().await;
    let me = viewer(&store, &headers)?;

    let requests: Vec<Value> = store
        .requests
        .iter()
        .filter(|r| r.receiver_id == me && r.state == RequestState::Pending)
        .filter_map(|r| {
            let sender = store.user(&r.sender_id)?;
            Some(json!({
                "id": r.id,
                "sender_id": sender.id,
                "sender_name": sender.full_name,
                "sender_email": sender.email,
                "created_at": r.created_at,
            }))
        })
        .collect();

    Ok((StatusCode::OK, Json(json!({ "requests": requests }))))
}

#[derive(Deserialize)]
struct ResolveBody {
    status: String,
}

async fn resolve_request(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<ResolveBody>,
) -> HandlerResult {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let mut store = state.store.write().await;
    let me = viewer(&store, &headers)?;

    let next = match body.status.as_str() {
        "accepted" => RequestState::Accepted,
        "rejected" => RequestState::Rejected,
        _ => return Err(fail(StatusCode::BAD_REQUEST, "Invalid status")),
    };

    let request = store
        .requests
        .iter_mut()
        .find(|r| r.id == id && r.receiver_id == me)
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Connection request not found"))?;
    if request.state != RequestState::Pending {
        return Err(fail(StatusCode::CONFLICT, "Connection request already resolved"));
    }
    request.state = next;
    let sender = request.sender_id.clone();

    if next == RequestState::Accepted {
        let conn_id = format!("c{}", store.connections.len() + 1);
        store.connections.push(FakeConnection {
            id: conn_id,
            a: sender,
            b: me,
            connected_at: Utc::now(),
        });
    }

    let delay = store.resolve_delay;
    drop(store);
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    Ok((
        StatusCode::OK,
        Json(json!({ "message": format!("Connection request {}", body.status), "connection_id": id, "status": body.status })),
    ))
}

async fn list_connections(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> HandlerResult {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let store = state.store.read().await;
    let me = viewer(&store, &headers)?;

    let connections: Vec<Value> = store
        .connections
        .iter()
        .filter_map(|c| {
            let other = if c.a == me {
                &c.b
            } else if c.b == me {
                &c.a
            } else {
                return None;
            };
            let user = store.user(other)?;
            Some(json!({
                "id": c.id,
                "user_id": user.id,
                "full_name": user.full_name,
                "email": user.email,
                "profile_picture_url": null,
                "connected_at": c.connected_at,
            }))
        })
        .collect();

    Ok((
        StatusCode::OK,
        Json(json!({ "count": connections.len(), "connections": connections })),
    ))
}
