//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::model::{Comment, CommentRecord, FetchOutcome, PageRecord, Post};
use crate::storage::ReconcileSummary;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Value out of range for column {column}: {value}")]
    OutOfRange { column: &'static str, value: u64 },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Row-level operations that reconciliation is written against
///
/// Implementations are expected to run every call of one reconciliation
/// inside the same transaction; the trait itself knows nothing about
/// transactions.
pub trait PostWriter {
    /// Inserts the post if no row with this ID exists, then refreshes
    /// `last_fetched`
    ///
    /// `None` inserts a deleted placeholder. Existing rows keep their
    /// metadata and their `deleted` flag.
    ///
    /// # Returns
    ///
    /// `true` if a new row was inserted
    fn upsert_post(
        &self,
        id: i64,
        record: Option<&PageRecord>,
        at: DateTime<Utc>,
    ) -> StorageResult<bool>;

    /// Looks up the stored edit date of a comment
    ///
    /// # Returns
    ///
    /// * `None` - No comment with this ID is stored
    /// * `Some(None)` - Stored and never edited
    /// * `Some(Some(ts))` - Stored with edit timestamp `ts`
    fn comment_edited_date(&self, comment_id: i64) -> StorageResult<Option<Option<String>>>;

    /// Inserts a new, not deleted comment under `post_id`
    fn insert_comment(
        &self,
        post_id: i64,
        comment: &CommentRecord,
        at: DateTime<Utc>,
    ) -> StorageResult<()>;

    /// Rewrites content and edit date of a stored comment
    ///
    /// The `deleted` flag is left untouched.
    fn update_comment(&self, comment: &CommentRecord, at: DateTime<Utc>) -> StorageResult<()>;

    /// IDs of every stored comment of a post, deleted ones included
    fn comments_for_post(&self, post_id: i64) -> StorageResult<Vec<i64>>;

    /// Marks a comment deleted and refreshes its `last_fetched`
    fn mark_comment_deleted(&self, comment_id: i64, at: DateTime<Utc>) -> StorageResult<()>;
}

/// Trait for storage backend implementations
///
/// This trait defines all database operations needed by the mirror.
pub trait Storage {
    // ===== Scan Range =====

    /// Highest post ID stored, if any
    fn max_stored_id(&self) -> StorageResult<Option<i64>>;

    /// Highest post ID stored within `[start, end]`, if any
    fn max_stored_id_in_range(&self, start: i64, end: i64) -> StorageResult<Option<i64>>;

    /// Whether a post row (deleted or not) exists for this ID
    fn post_exists(&self, id: i64) -> StorageResult<bool>;

    // ===== Reconciliation =====

    /// Merges one fetch result into the store as a single transaction
    ///
    /// On error nothing from this call is committed.
    fn reconcile(
        &mut self,
        id: i64,
        outcome: &FetchOutcome,
        at: DateTime<Utc>,
    ) -> StorageResult<ReconcileSummary>;

    // ===== Reads =====

    /// Gets a post by ID
    fn get_post(&self, id: i64) -> StorageResult<Option<Post>>;

    /// Gets every stored comment of a post, ordered by ID
    fn get_comments(&self, post_id: i64) -> StorageResult<Vec<Comment>>;

    // ===== Statistics =====

    /// Gets total post count
    fn count_posts(&self) -> StorageResult<u64>;

    /// Counts posts marked deleted
    fn count_deleted_posts(&self) -> StorageResult<u64>;

    /// Gets total comment count
    fn count_comments(&self) -> StorageResult<u64>;

    /// Counts comments marked deleted
    fn count_deleted_comments(&self) -> StorageResult<u64>;

    /// Counts comments with an edit timestamp
    fn count_edited_comments(&self) -> StorageResult<u64>;
}
