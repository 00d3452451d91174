//! TrueLink client.
//!
//! Typed access to the TrueLink professional-network API: sign-in, profile
//! editing, directory search and the connection-request lifecycle. The
//! `truelink` binary is a thin terminal front end over these components.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod connections;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod models;
pub mod profile;
pub mod search;
pub mod session;

#[cfg(test)]
mod fake_api;

pub use error::{ApiError, ApiResult};
