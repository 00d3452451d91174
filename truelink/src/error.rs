//! Error taxonomy for calls against the TrueLink API.
//!
//! Every failure a component can observe is one of these variants. The
//! distinction between `Unauthorized` and everything else is what lets a
//! caller show a sign-in prompt instead of a generic error or an empty list.

use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or rejected credential (HTTP 401).
    #[error("{message}")]
    Unauthorized { message: String },

    /// The server reports the resource already exists (HTTP 409).
    #[error("{message}")]
    Conflict { message: String },

    /// Any other non-2xx response.
    #[error("{message} ({status})")]
    Server { status: StatusCode, message: String },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A 2xx response whose body did not match the expected shape.
    #[error("unexpected response from server: {0}")]
    Decode(String),

    /// The same call-site already has a request outstanding.
    #[error("a request is already in progress")]
    InFlight,

    /// A newer search started before this one's response arrived.
    #[error("search superseded by a newer query")]
    Superseded,

    /// The request id is not in the local pending list (already resolved or never loaded).
    #[error("connection request {0} is not pending")]
    NotPending(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Error body shapes the API is known to return.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl ApiError {
    /// Map a non-success status and raw body to an error.
    ///
    /// `fallback` is used when the body carries neither a `message` nor an
    /// `error` field.
    pub fn from_status(status: StatusCode, body: &str, fallback: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| fallback.to_string());
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized { message },
            StatusCode::CONFLICT => Self::Conflict { message },
            _ => Self::Server { status, message },
        }
    }

    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Treat a 401 as an ordinary failure.
    ///
    /// The auth endpoints answer bad email/password with 401; at the sign-in
    /// form that is a message to show, not a prompt to sign in.
    #[must_use]
    pub fn credentials_rejected(self) -> Self {
        match self {
            Self::Unauthorized { message } => Self::Server {
                status: StatusCode::UNAUTHORIZED,
                message,
            },
            other => other,
        }
    }

    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// HTTP status of the failed response, if there was one.
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::Conflict { .. } => Some(StatusCode::CONFLICT),
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn extract_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .message
        .or(parsed.error)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}
