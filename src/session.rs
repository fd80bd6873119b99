//! Bearer-token session handed to the API client.
//!
//! DESIGN
//! ======
//! The token is owned by an explicit `Session` value rather than read from
//! ambient global storage. Clones share the same slot, so the client and
//! the CLI observe the token issued by `login` without re-reading it.
//! When a token file is configured the slot is mirrored to disk, which
//! plays the role local storage plays for the web client.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("token file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Clone, Debug, Default)]
pub struct Session {
    token: Arc<RwLock<Option<String>>>,
    store: Option<PathBuf>,
}

impl Session {
    /// In-memory session with no token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// In-memory session seeded with `token`.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: Arc::new(RwLock::new(Some(token.into()))), store: None }
    }

    /// Session mirrored to `path`. An existing non-empty file seeds the token.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn persisted(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let token = match std::fs::read_to_string(&path) {
            Ok(raw) => Some(raw.trim().to_owned()).filter(|t| !t.is_empty()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => None,
            Err(source) => return Err(SessionError::Io { path, source }),
        };
        debug!(path = %path.display(), has_token = token.is_some(), "session loaded");
        Ok(Self { token: Arc::new(RwLock::new(token)), store: Some(path) })
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    #[must_use]
    pub fn store_path(&self) -> Option<&Path> {
        self.store.as_deref()
    }

    /// Replace the token (or clear it with `None`) and sync the token file.
    ///
    /// # Errors
    ///
    /// Returns an error if the token file cannot be written or removed.
    /// The in-memory slot is updated regardless.
    pub fn set_token(&self, token: Option<String>) -> Result<(), SessionError> {
        {
            let mut slot = self
                .token
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            slot.clone_from(&token);
        }
        let Some(path) = &self.store else {
            return Ok(());
        };
        let io_err = |source| SessionError::Io { path: path.clone(), source };
        match token {
            Some(token) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).map_err(io_err)?;
                }
                write_private(path, &token).map_err(io_err)?;
            }
            None => match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => return Err(io_err(source)),
            },
        }
        Ok(())
    }
}

/// Write the token readable by the owner only. An existing file is
/// truncated and its mode tightened.
fn write_private(path: &Path, token: &str) -> std::io::Result<()> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(token.as_bytes())
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
