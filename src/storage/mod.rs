//! Storage module for persisting mirrored posts
//!
//! This module handles all database operations for the mirror, including:
//! - SQLite database initialization and schema management
//! - Scan range queries (resume point, in-range watermark, existence)
//! - Transactional reconciliation of fetched pages

mod reconcile;
mod schema;
mod sqlite;
mod traits;

pub use reconcile::{reconcile, ReconcileSummary};
pub use schema::{initialize_schema, SCHEMA_SQL};
pub use sqlite::SqliteStorage;
pub use traits::{PostWriter, Storage, StorageError, StorageResult};

use crate::MirrorError;
use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(MirrorError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, MirrorError> {
    SqliteStorage::new(path)
}
