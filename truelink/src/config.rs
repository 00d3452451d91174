//! Runtime configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Base origin used when `TRUELINK_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";
/// Per-request timeout used when `TRUELINK_TIMEOUT_SECS` is unset or invalid.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const CONFIG_DIR: &str = ".truelink";
const SESSION_FILE: &str = "session";

#[derive(Debug, Clone)]
pub struct Config {
    /// API origin without a trailing slash.
    pub api_url: String,
    /// Where the bearer credential is persisted between runs.
    pub session_file: PathBuf,
    pub timeout: Duration,
}

impl Config {
    /// Load configuration from `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_url = env::var("TRUELINK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let session_file = match env::var("TRUELINK_SESSION_FILE") {
            Ok(path) => PathBuf::from(path),
            Err(_) => default_session_file()?,
        };
        let timeout_secs = env::var("TRUELINK_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self::new(api_url, session_file).with_timeout(Duration::from_secs(timeout_secs)))
    }

    pub fn new(api_url: impl Into<String>, session_file: impl Into<PathBuf>) -> Self {
        Self {
            api_url: normalize_api_url(&api_url.into()),
            session_file: session_file.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Apply CLI overrides on top of the environment.
    #[must_use]
    pub fn with_overrides(mut self, api_url: Option<&str>, session_file: Option<&str>) -> Self {
        if let Some(url) = api_url {
            self.api_url = normalize_api_url(url);
        }
        if let Some(path) = session_file {
            self.session_file = PathBuf::from(path);
        }
        self
    }
}

fn default_session_file() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(CONFIG_DIR).join(SESSION_FILE))
}

fn normalize_api_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
