//! Statistics generation from the mirror database
//!
//! This module provides functionality for extracting and displaying
//! mirror statistics from the storage layer.

use crate::storage::Storage;
use crate::MirrorError;

/// Mirror statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorStatistics {
    /// Total number of post rows, live or deleted
    pub total_posts: u64,

    /// Posts that answered 404 when last fetched
    pub deleted_posts: u64,

    /// Total number of comment rows
    pub total_comments: u64,

    /// Comments no longer present on their post
    pub deleted_comments: u64,

    /// Comments carrying an edit timestamp
    pub edited_comments: u64,

    /// Highest post ID in the store (the resume point)
    pub max_post_id: Option<i64>,
}

impl MirrorStatistics {
    pub fn live_posts(&self) -> u64 {
        self.total_posts.saturating_sub(self.deleted_posts)
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(MirrorStatistics)` - Successfully loaded statistics
/// * `Err(MirrorError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> Result<MirrorStatistics, MirrorError> {
    Ok(MirrorStatistics {
        total_posts: storage.count_posts()?,
        deleted_posts: storage.count_deleted_posts()?,
        total_comments: storage.count_comments()?,
        deleted_comments: storage.count_deleted_comments()?,
        edited_comments: storage.count_edited_comments()?,
        max_post_id: storage.max_stored_id()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &MirrorStatistics) {
    println!("=== Mirror Statistics ===\n");

    println!("Posts:");
    println!("  Total posts: {}", stats.total_posts);
    println!(
        "  Live: {} ({:.1}%)",
        stats.live_posts(),
        percentage(stats.live_posts(), stats.total_posts)
    );
    println!(
        "  Deleted: {} ({:.1}%)",
        stats.deleted_posts,
        percentage(stats.deleted_posts, stats.total_posts)
    );
    match stats.max_post_id {
        Some(id) => println!("  Highest ID: {}", id),
        None => println!("  Highest ID: none"),
    }
    println!();

    println!("Comments:");
    println!("  Total comments: {}", stats.total_comments);
    println!(
        "  Deleted: {} ({:.1}%)",
        stats.deleted_comments,
        percentage(stats.deleted_comments, stats.total_comments)
    );
    println!(
        "  Edited: {} ({:.1}%)",
        stats.edited_comments,
        percentage(stats.edited_comments, stats.total_comments)
    );
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole > 0 {
        (part as f64 / whole as f64) * 100.0
    } else {
        0.0
    }
}
