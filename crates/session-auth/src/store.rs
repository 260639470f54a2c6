//! Scoped credential storage
//!
//! Manages a JSON file mapping scopes ("user", "admin") to their current
//! access/refresh token pair. All writes use atomic temp-file + rename to
//! prevent corruption on crash. A tokio Mutex serializes concurrent
//! writes from request-time refresh across tasks.
//!
//! At most one pair exists per scope. Clearing one scope never touches
//! another. The in-memory map is authoritative for the process lifetime:
//! a failed persistence write on `clear` is logged and swallowed rather
//! than surfaced, since the caller's decision (the session is gone) has
//! already been made.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use common::Secret;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// A scope's current token pair.
///
/// Both tokens are opaque server-issued strings; no shape validation is
/// done client-side. Debug output redacts both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialPair {
    /// Current access token (Bearer token for API calls)
    pub access: Secret<String>,
    /// Refresh token for obtaining a replacement pair
    pub refresh: Secret<String>,
}

impl CredentialPair {
    pub fn new(access: impl Into<Secret<String>>, refresh: impl Into<Secret<String>>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

/// Thread-safe scoped credential file manager.
///
/// The Mutex serializes all access. Reads acquire the lock briefly to
/// clone the entry, so request-time reads don't block on writes for long.
pub struct CredentialStore {
    path: PathBuf,
    state: Mutex<HashMap<String, CredentialPair>>,
}

impl CredentialStore {
    /// Load credentials from the given file path.
    ///
    /// If the file doesn't exist, creates it as `{}` (cold start with no
    /// session). Callers see `get()` return `None` until a login layer
    /// stores a pair.
    pub async fn load(path: PathBuf) -> Result<Self> {
        let state = if path.exists() {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| Error::Io(format!("reading credential file: {e}")))?;
            let credentials: HashMap<String, CredentialPair> = serde_json::from_str(&contents)
                .map_err(|e| Error::CredentialParse(format!("parsing credential file: {e}")))?;
            info!(path = %path.display(), scopes = credentials.len(), "loaded credentials");
            credentials
        } else {
            info!(path = %path.display(), "credential file not found, starting with empty store");
            let store = HashMap::new();
            write_atomic(&path, &store).await?;
            store
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Get a clone of a scope's current pair, if one exists.
    pub async fn get(&self, scope: &str) -> Option<CredentialPair> {
        let state = self.state.lock().await;
        state.get(scope).cloned()
    }

    /// Replace a scope's pair and persist to disk.
    ///
    /// The replacement is atomic from the perspective of readers: they
    /// see either the old pair or the new one, never a mix.
    pub async fn set(&self, scope: &str, pair: CredentialPair) -> Result<()> {
        let mut state = self.state.lock().await;
        state.insert(scope.to_string(), pair);
        debug!(scope, "stored credential pair");
        write_atomic(&self.path, &state).await
    }

    /// Remove a scope's pair. Idempotent.
    ///
    /// A failed persistence write is logged and swallowed: the in-memory
    /// removal already happened and stays authoritative for this process.
    pub async fn clear(&self, scope: &str) {
        let mut state = self.state.lock().await;
        if state.remove(scope).is_some() {
            debug!(scope, "cleared credential pair");
        }
        if let Err(e) = write_atomic(&self.path, &state).await {
            warn!(scope, error = %e, "failed to persist credential clear");
        }
    }

    /// Number of scopes with a stored pair.
    pub async fn len(&self) -> usize {
        let state = self.state.lock().await;
        state.len()
    }

    /// Whether no scope has a stored pair.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Write credentials to a file atomically.
///
/// Writes to a temporary file in the same directory, then renames it over
/// the target. This prevents corruption if the process crashes mid-write.
/// Sets file permissions to 0600 (owner read/write only) since the file
/// contains live tokens.
async fn write_atomic(path: &Path, data: &HashMap<String, CredentialPair>) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| Error::CredentialParse(format!("serializing credentials: {e}")))?;

    let dir = path
        .parent()
        .ok_or_else(|| Error::Io("credential path has no parent directory".into()))?;

    let tmp_path = dir.join(format!(".credentials.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| Error::Io(format!("writing temp credential file: {e}")))?;

    // Set 0600 permissions (unix only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms)
            .await
            .map_err(|e| Error::Io(format!("setting credential file permissions: {e}")))?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Error::Io(format!("renaming temp credential file: {e}")))?;

    debug!(path = %path.display(), "persisted credentials");
    Ok(())
}
