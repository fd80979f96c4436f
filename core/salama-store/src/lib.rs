//! Local persistence for the Salama portal core.
//!
//! Two small JSON-file stores, both synchronous and local (no network):
//!
//! - [`TransactionStore`] holds at most one in-flight purchase transaction
//!   so an interrupted purchase can resume after a reload. Records expire
//!   after 24 hours and corrupt data is treated as absent.
//! - [`SessionStore`] holds the signed-in user session.
//!
//! Writes go to a temp file and are renamed into place, so a crash mid-write
//! never leaves a half-written record behind.

mod error;
mod session_store;
mod transaction_store;

pub use error::{StoreError, StoreResult};
pub use session_store::SessionStore;
pub use transaction_store::TransactionStore;

use std::path::PathBuf;

/// Default data directory for the portal's local state.
///
/// Falls back to the current directory when the platform data dir cannot
/// be determined.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("salama")
}
