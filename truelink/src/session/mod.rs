//! Session state: the bearer credential and where it is persisted.

mod persist;
mod store;

pub use persist::CredentialFile;
pub use store::Session;
