//! Persistence for the signed-in user session.

use crate::error::{StoreError, StoreResult};
use salama_types::Session;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name for the session record.
const SESSION_FILE: &str = "session.json";

/// Local store for the signed-in user session.
///
/// Same shape as [`TransactionStore`](crate::TransactionStore): one JSON
/// file, corrupt data treated as absent and cleaned up. Sessions do not
/// expire locally; the server decides when an identity stops being valid.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Creates a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join(SESSION_FILE),
        })
    }

    /// Creates a store in the default platform data directory.
    pub fn open_default() -> StoreResult<Self> {
        Self::open(crate::default_data_dir())
    }

    /// Persists the session.
    pub fn save(&self, session: &Session) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(session)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(email = %session.email, "persisted session");
        Ok(())
    }

    /// Loads the persisted session, if any. Corrupt records are deleted
    /// and reported as absent.
    pub fn load(&self) -> StoreResult<Option<Session>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(e)),
        };

        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!("discarding corrupt session record: {e}");
                self.clear()?;
                Ok(None)
            }
        }
    }

    /// Removes the persisted session, if any.
    pub fn clear(&self) -> StoreResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}
