//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.
//! A `SqliteStorage` owns exactly one connection, so at most one
//! reconciliation can touch the database at a time.

use crate::model::{to_db_timestamp, Comment, CommentRecord, FetchOutcome, PageRecord, Post};
use crate::storage::reconcile::{reconcile, ReconcileSummary};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{PostWriter, Storage, StorageError, StorageResult};
use crate::MirrorError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite storage backend
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file, or a `file:` URI
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(MirrorError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, MirrorError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, MirrorError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub(crate) fn execute_raw(&self, sql: &str) -> StorageResult<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn count(&self, sql: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl PostWriter for Connection {
    fn upsert_post(
        &self,
        id: i64,
        record: Option<&PageRecord>,
        at: DateTime<Utc>,
    ) -> StorageResult<bool> {
        let inserted = match record {
            Some(record) => {
                let file_size =
                    i64::try_from(record.file_size).map_err(|_| StorageError::OutOfRange {
                        column: "file_size",
                        value: record.file_size,
                    })?;

                self.execute(
                    "INSERT OR IGNORE INTO posts (id, deleted, title, category, submitter, information,
                     file_size, date, seeders, leechers, completed, info_hash, description,
                     torrent_url, magnet_url)
                     VALUES (?1, 0, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                    params![
                        id,
                        record.title,
                        record.category,
                        record.submitter,
                        record.information,
                        file_size,
                        to_db_timestamp(&record.date),
                        record.seeders,
                        record.leechers,
                        record.completed,
                        record.info_hash,
                        record.description,
                        record.torrent_url,
                        record.magnet_url,
                    ],
                )?
            }
            None => self.execute(
                "INSERT OR IGNORE INTO posts (id, deleted) VALUES (?1, 1)",
                params![id],
            )?,
        };

        self.execute(
            "UPDATE posts SET last_fetched = ?1 WHERE id = ?2",
            params![to_db_timestamp(&at), id],
        )?;

        Ok(inserted > 0)
    }

    fn comment_edited_date(&self, comment_id: i64) -> StorageResult<Option<Option<String>>> {
        let edited = self
            .query_row(
                "SELECT edited_date FROM comments WHERE id = ?1",
                params![comment_id],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(edited)
    }

    fn insert_comment(
        &self,
        post_id: i64,
        comment: &CommentRecord,
        at: DateTime<Utc>,
    ) -> StorageResult<()> {
        self.execute(
            "INSERT INTO comments (id, deleted, submitter, content, date, edited_date, post_id, last_fetched)
             VALUES (?1, 0, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                comment.id,
                comment.submitter,
                comment.content,
                to_db_timestamp(&comment.date),
                comment.edited_date.as_ref().map(to_db_timestamp),
                post_id,
                to_db_timestamp(&at),
            ],
        )?;
        Ok(())
    }

    fn update_comment(&self, comment: &CommentRecord, at: DateTime<Utc>) -> StorageResult<()> {
        self.execute(
            "UPDATE comments SET content = ?1, edited_date = ?2, last_fetched = ?3 WHERE id = ?4",
            params![
                comment.content,
                comment.edited_date.as_ref().map(to_db_timestamp),
                to_db_timestamp(&at),
                comment.id,
            ],
        )?;
        Ok(())
    }

    fn comments_for_post(&self, post_id: i64) -> StorageResult<Vec<i64>> {
        let mut stmt = self.prepare("SELECT id FROM comments WHERE post_id = ?1")?;

        let ids = stmt
            .query_map(params![post_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ids)
    }

    fn mark_comment_deleted(&self, comment_id: i64, at: DateTime<Utc>) -> StorageResult<()> {
        self.execute(
            "UPDATE comments SET deleted = 1, last_fetched = ?1 WHERE id = ?2",
            params![to_db_timestamp(&at), comment_id],
        )?;
        Ok(())
    }
}

impl Storage for SqliteStorage {
    // ===== Scan Range =====

    fn max_stored_id(&self) -> StorageResult<Option<i64>> {
        let id = self
            .conn
            .query_row("SELECT MAX(id) FROM posts", [], |row| row.get(0))?;
        Ok(id)
    }

    fn max_stored_id_in_range(&self, start: i64, end: i64) -> StorageResult<Option<i64>> {
        let id = self.conn.query_row(
            "SELECT MAX(id) FROM posts WHERE id BETWEEN ?1 AND ?2",
            params![start, end],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn post_exists(&self, id: i64) -> StorageResult<bool> {
        let exists = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM posts WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    // ===== Reconciliation =====

    fn reconcile(
        &mut self,
        id: i64,
        outcome: &FetchOutcome,
        at: DateTime<Utc>,
    ) -> StorageResult<ReconcileSummary> {
        let tx = self.conn.transaction()?;

        match reconcile(&*tx, id, outcome, at) {
            Ok(summary) => {
                tx.commit()?;
                Ok(summary)
            }
            Err(e) => {
                tracing::error!("Rolling back post {}: {}", id, e);
                tx.rollback()?;
                Err(e)
            }
        }
    }

    // ===== Reads =====

    fn get_post(&self, id: i64) -> StorageResult<Option<Post>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, deleted, title, category, submitter, information, file_size, date,
             seeders, leechers, completed, info_hash, description, torrent_url, magnet_url,
             last_fetched
             FROM posts WHERE id = ?1",
        )?;

        let post = stmt
            .query_row(params![id], |row| {
                Ok(Post {
                    id: row.get(0)?,
                    deleted: row.get(1)?,
                    title: row.get(2)?,
                    category: row.get(3)?,
                    submitter: row.get(4)?,
                    information: row.get(5)?,
                    file_size: row.get(6)?,
                    date: row.get(7)?,
                    seeders: row.get(8)?,
                    leechers: row.get(9)?,
                    completed: row.get(10)?,
                    info_hash: row.get(11)?,
                    description: row.get(12)?,
                    torrent_url: row.get(13)?,
                    magnet_url: row.get(14)?,
                    last_fetched: row.get(15)?,
                })
            })
            .optional()?;

        Ok(post)
    }

    fn get_comments(&self, post_id: i64) -> StorageResult<Vec<Comment>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, post_id, deleted, submitter, content, date, edited_date, last_fetched
             FROM comments WHERE post_id = ?1 ORDER BY id",
        )?;

        let comments = stmt
            .query_map(params![post_id], |row| {
                Ok(Comment {
                    id: row.get(0)?,
                    post_id: row.get(1)?,
                    deleted: row.get(2)?,
                    submitter: row.get(3)?,
                    content: row.get(4)?,
                    date: row.get(5)?,
                    edited_date: row.get(6)?,
                    last_fetched: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(comments)
    }

    // ===== Statistics =====

    fn count_posts(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM posts")
    }

    fn count_deleted_posts(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM posts WHERE deleted = 1")
    }

    fn count_comments(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM comments")
    }

    fn count_deleted_comments(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM comments WHERE deleted = 1")
    }

    fn count_edited_comments(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM comments WHERE edited_date IS NOT NULL")
    }
}
