//! HTTP fetch layer.
//!
//! All components talk to the API through [`ApiClient`]. It attaches the
//! session's bearer credential when one is present and turns every response
//! into a tagged [`ApiResult`], so no component inspects HTTP status codes
//! itself.

mod inflight;

pub use inflight::{InFlight, InFlightGuard, InFlightSet, KeyedGuard};

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::session::Session;

const REQUEST_ID_HEADER: &str = "X-Request-Id";

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(config: &Config, session: Session) -> ApiResult<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.api_url.clone(),
            session,
        })
    }

    pub const fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, fallback: &str) -> ApiResult<T> {
        self.execute(Method::GET, path, None::<&()>, fallback).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B, fallback: &str) -> ApiResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        self.execute(Method::POST, path, Some(body), fallback).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B, fallback: &str) -> ApiResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        self.execute(Method::PUT, path, Some(body), fallback).await
    }

    async fn execute<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        fallback: &str,
    ) -> ApiResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let request_id = Uuid::now_v7().to_string();

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(REQUEST_ID_HEADER, &request_id);
        let authorized = match self.session.current_credential() {
            Some(token) => {
                builder = builder.bearer_auth(token);
                true
            }
            None => false,
        };
        if let Some(body) = body {
            builder = builder.json(body);
        }

        debug!(%method, path, request_id = %request_id, authorized, "sending request");

        let resp = builder.send().await.map_err(|e| {
            warn!(%method, path, request_id = %request_id, error = %e, "request failed before a response");
            ApiError::Network(e)
        })?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            warn!(%method, path, request_id = %request_id, %status, "request rejected");
            return Err(ApiError::from_status(status, &text, fallback));
        }

        debug!(%method, path, request_id = %request_id, %status, "request succeeded");

        // some endpoints answer 201/204 with no body
        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
