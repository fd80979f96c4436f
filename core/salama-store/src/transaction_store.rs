//! Single-slot persistence for the in-flight purchase transaction.

use crate::error::{StoreError, StoreResult};
use chrono::Utc;
use salama_types::Transaction;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File name for the single transaction slot.
const SLOT_FILE: &str = "pending_transaction.json";

/// Durable local store holding at most one in-flight purchase transaction.
///
/// The slot is a single JSON file. [`load`](TransactionStore::load) treats
/// expired (older than 24h) and corrupt records as absent and deletes them,
/// so callers never see stale or unparseable state.
#[derive(Debug, Clone)]
pub struct TransactionStore {
    path: PathBuf,
}

impl TransactionStore {
    /// Creates a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join(SLOT_FILE),
        })
    }

    /// Creates a store in the default platform data directory.
    pub fn open_default() -> StoreResult<Self> {
        Self::open(crate::default_data_dir())
    }

    /// Returns the path of the slot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrites the slot with `transaction`.
    ///
    /// The write is atomic: the record goes to a temp file first and is
    /// renamed into place.
    pub fn save(&self, transaction: &Transaction) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(transaction)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(
            transaction_id = %transaction.transaction_id,
            status = ?transaction.status,
            "persisted transaction"
        );
        Ok(())
    }

    /// Loads the persisted transaction, if one exists and is still fresh.
    ///
    /// Expired records (older than 24h against `created_at`) and corrupt
    /// records are deleted as a side effect and reported as absent; neither
    /// is an error the caller has to handle.
    pub fn load(&self) -> StoreResult<Option<Transaction>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(e)),
        };

        let transaction: Transaction = match serde_json::from_str(&raw) {
            Ok(t) => t,
            Err(e) => {
                warn!("discarding corrupt transaction record: {e}");
                self.clear()?;
                return Ok(None);
            }
        };

        if transaction.is_expired_at(Utc::now()) {
            info!(
                transaction_id = %transaction.transaction_id,
                "discarding expired transaction record"
            );
            self.clear()?;
            return Ok(None);
        }

        Ok(Some(transaction))
    }

    /// Removes the persisted transaction, if any.
    pub fn clear(&self) -> StoreResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}
