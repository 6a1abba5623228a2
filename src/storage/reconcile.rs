//! Reconciliation of a fetched page against stored state
//!
//! The rules, per visit of a post ID:
//!
//! | Fetch | Post row | Comments |
//! |-------|----------|----------|
//! | 200 | insert if absent, refresh `last_fetched` | insert new, update edited, soft-delete missing |
//! | 404 | insert deleted placeholder if absent, refresh `last_fetched` | untouched |
//!
//! Deletion is monotonic: nothing here ever clears a `deleted` flag.

use crate::model::{to_db_timestamp, FetchOutcome, PageRecord};
use crate::storage::traits::{PostWriter, StorageResult};
use chrono::{DateTime, Utc};

/// What one reconciliation changed
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// A post row was created by this visit
    pub post_inserted: bool,

    pub comments_inserted: usize,

    /// Comments whose edit date changed
    pub comments_updated: usize,

    /// Stored comments absent from this fetch (marked deleted)
    pub comments_missing: usize,
}

/// Merges one fetch outcome for post `id` through `writer`
///
/// The caller owns the transaction: if this returns an error, nothing it
/// wrote may be committed.
pub fn reconcile<W>(
    writer: &W,
    id: i64,
    outcome: &FetchOutcome,
    at: DateTime<Utc>,
) -> StorageResult<ReconcileSummary>
where
    W: PostWriter + ?Sized,
{
    match outcome {
        FetchOutcome::Found(record) => reconcile_found(writer, id, record, at),
        FetchOutcome::NotFound => Ok(ReconcileSummary {
            post_inserted: writer.upsert_post(id, None, at)?,
            ..ReconcileSummary::default()
        }),
    }
}

fn reconcile_found<W>(
    writer: &W,
    id: i64,
    record: &PageRecord,
    at: DateTime<Utc>,
) -> StorageResult<ReconcileSummary>
where
    W: PostWriter + ?Sized,
{
    let mut summary = ReconcileSummary {
        post_inserted: writer.upsert_post(id, Some(record), at)?,
        ..ReconcileSummary::default()
    };

    for comment in &record.comments {
        let fetched_edit = comment.edited_date.as_ref().map(to_db_timestamp);

        match writer.comment_edited_date(comment.id)? {
            None => {
                writer.insert_comment(id, comment, at)?;
                summary.comments_inserted += 1;
            }
            Some(stored_edit) if stored_edit == fetched_edit => {}
            Some(_) => {
                writer.update_comment(comment, at)?;
                summary.comments_updated += 1;
            }
        }
    }

    for stored_id in writer.comments_for_post(id)? {
        if !record.has_comment(stored_id) {
            writer.mark_comment_deleted(stored_id, at)?;
            summary.comments_missing += 1;
        }
    }

    Ok(summary)
}
