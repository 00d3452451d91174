//! Credential persistence between runs.
//!
//! The credential lives in a single file (by default `~/.truelink/session`).
//! A missing or blank file means "no stored credential". The account that
//! signed in is cached next to it as `<file>.user.json` so later runs can
//! greet the user without another round trip.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::Session;
use crate::models::User;

#[derive(Debug, Clone)]
pub struct CredentialFile {
    path: PathBuf,
}

impl CredentialFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored credential, if any.
    pub fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let token = content.trim().to_string();

        if token.is_empty() {
            return Ok(None);
        }

        Ok(Some(token))
    }

    pub fn save(&self, token: &str) -> Result<()> {
        write_private(&self.path, token.as_bytes())?;
        debug!(path = %self.path.display(), "credential stored");
        Ok(())
    }

    /// Where the signed-in account is cached.
    pub fn user_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".user.json");
        PathBuf::from(name)
    }

    pub fn save_user(&self, user: &User) -> Result<()> {
        let path = self.user_path();
        let json = serde_json::to_vec_pretty(user).context("Failed to encode account")?;
        write_private(&path, &json)?;
        debug!(path = %path.display(), user_id = %user.id, "account cached");
        Ok(())
    }

    /// The cached account, if any. An unreadable cache is treated as absent.
    pub fn load_user(&self) -> Result<Option<User>> {
        let path = self.user_path();
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        match serde_json::from_str(&content) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable account cache");
                Ok(None)
            }
        }
    }

    /// Remove the credential and the cached account.
    pub fn clear(&self) -> Result<()> {
        for path in [self.path.clone(), self.user_path()] {
            if path.exists() {
                std::fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
                debug!(path = %path.display(), "removed");
            }
        }
        Ok(())
    }

    /// Build a session from whatever is stored on disk.
    pub fn restore(&self) -> Result<Session> {
        Ok(self.load()?.map_or_else(Session::new, Session::with_credential))
    }

    /// Mirror the session's credential to disk: write it when present, remove the file otherwise.
    pub fn sync(&self, session: &Session) -> Result<()> {
        match session.current_credential() {
            Some(token) => self.save(&token),
            None => self.clear(),
        }
    }
}

/// Write `contents` to `path`, readable by the owner only from the moment
/// the file exists.
fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let mut file = open_private(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    file.write_all(contents)
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation; tighten a file left by an older run
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
