//! Domain types shared by the extractor, the fetcher and the store
//!
//! `PageRecord`/`CommentRecord` are what a single fetch produces.
//! `Post`/`Comment` are the rows as they exist in the store.

use chrono::{DateTime, SecondsFormat, Utc};

/// A listing page as extracted from the remote document
#[derive(Debug, Clone, PartialEq)]
pub struct PageRecord {
    pub title: String,
    pub category: String,
    pub submitter: String,
    pub information: String,
    /// Size of the torrent contents in bytes
    pub file_size: u64,
    pub date: DateTime<Utc>,
    pub seeders: u32,
    pub leechers: u32,
    pub completed: u32,
    pub info_hash: String,
    pub description: String,
    pub torrent_url: String,
    pub magnet_url: String,
    /// Comments in document order
    pub comments: Vec<CommentRecord>,
}

impl PageRecord {
    /// Returns true if a comment with the given ID was part of this fetch
    pub fn has_comment(&self, id: i64) -> bool {
        self.comments.iter().any(|c| c.id == id)
    }
}

/// A comment as extracted from the remote document
#[derive(Debug, Clone, PartialEq)]
pub struct CommentRecord {
    pub id: i64,
    pub submitter: String,
    pub content: String,
    pub date: DateTime<Utc>,
    /// `None` means the comment was never edited
    pub edited_date: Option<DateTime<Utc>>,
}

/// Result of one successful round trip for a post ID
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// HTTP 200 with a fully extracted record
    Found(PageRecord),

    /// HTTP 404: deleted upstream or never existed
    NotFound,
}

impl FetchOutcome {
    /// The HTTP status this outcome corresponds to
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Found(_) => 200,
            Self::NotFound => 404,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// A post row as stored
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: i64,
    pub deleted: bool,
    pub title: Option<String>,
    pub category: Option<String>,
    pub submitter: Option<String>,
    pub information: Option<String>,
    pub file_size: Option<i64>,
    pub date: Option<String>,
    pub seeders: Option<u32>,
    pub leechers: Option<u32>,
    pub completed: Option<u32>,
    pub info_hash: Option<String>,
    pub description: Option<String>,
    pub torrent_url: Option<String>,
    pub magnet_url: Option<String>,
    pub last_fetched: Option<String>,
}

/// A comment row as stored
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub deleted: bool,
    pub submitter: String,
    pub content: String,
    pub date: String,
    pub edited_date: Option<String>,
    pub last_fetched: String,
}

/// Formats a timestamp the way it is persisted
///
/// All timestamps are stored as fixed-width RFC 3339 text in UTC, so string
/// comparison of two stored values is also a chronological comparison.
pub fn to_db_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn comment(id: i64) -> CommentRecord {
        CommentRecord {
            id,
            submitter: "anon".to_string(),
            content: "hi".to_string(),
            date: Utc.with_ymd_and_hms(2022, 9, 15, 16, 43, 0).unwrap(),
            edited_date: None,
        }
    }

    #[test]
    fn test_fetch_outcome_status() {
        assert_eq!(FetchOutcome::NotFound.status_code(), 404);
        assert!(!FetchOutcome::NotFound.is_found());
    }

    #[test]
    fn test_has_comment() {
        let record = PageRecord {
            title: String::new(),
            category: String::new(),
            submitter: String::new(),
            information: String::new(),
            file_size: 0,
            date: Utc.with_ymd_and_hms(2022, 9, 15, 16, 43, 0).unwrap(),
            seeders: 0,
            leechers: 0,
            completed: 0,
            info_hash: String::new(),
            description: String::new(),
            torrent_url: String::new(),
            magnet_url: String::new(),
            comments: vec![comment(1), comment(3)],
        };
        assert!(record.has_comment(3));
        assert!(!record.has_comment(2));
    }

    #[test]
    fn test_db_timestamp_is_utc() {
        let ts = Utc.with_ymd_and_hms(2021, 7, 1, 18, 51, 45).unwrap();
        assert_eq!(to_db_timestamp(&ts), "2021-07-01T18:51:45.000000Z");
    }
}
