//! Conversions from raw field text to typed values
//!
//! The listing markup reports dates, sizes and identifiers as display strings.
//! Each helper here handles exactly one of those formats.

use crate::{ExtractError, ExtractResult};
use bytesize::ByteSize;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Query-string prefix of category links, e.g. `/?c=1_2`
pub const CATEGORY_PREFIX: &str = "/?c=";

/// Prefix of comment element IDs, e.g. `torrent-comment1234`
pub const COMMENT_ID_PREFIX: &str = "torrent-comment";

/// Format of post dates and comment creation dates
pub const LISTING_DATE_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Format of comment edit dates (no zone; interpreted as UTC)
pub const EDITED_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const BYTES_SUFFIX: &str = " Bytes";

/// Strips the category link prefix, leaving the category code
///
/// Values without the prefix are returned unchanged.
pub fn normalize_category(raw: &str) -> String {
    raw.strip_prefix(CATEGORY_PREFIX).unwrap_or(raw).to_string()
}

/// Parses a `YYYY-MM-DD HH:MM UTC` date
pub fn parse_listing_date(field: &'static str, raw: &str) -> ExtractResult<DateTime<Utc>> {
    parse_utc(field, raw, LISTING_DATE_FORMAT)
}

/// Parses an optional `YYYY-MM-DD HH:MM:SS` edit date
///
/// An empty value means the comment was never edited.
pub fn parse_edited_date(raw: &str) -> ExtractResult<Option<DateTime<Utc>>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    parse_utc("comment-edited-date", raw, EDITED_DATE_FORMAT).map(Some)
}

fn parse_utc(field: &'static str, raw: &str, format: &str) -> ExtractResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), format)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| ExtractError::InvalidDate {
            field,
            value: raw.to_string(),
        })
}

/// Parses a human-readable size such as `1.5 MiB` into a byte count
///
/// Plain byte counts (`0 Bytes`, `917 Bytes`) are handled here because the
/// general parser has no `Bytes` unit.
pub fn parse_file_size(raw: &str) -> ExtractResult<u64> {
    let raw = raw.trim();

    if let Some(count) = raw.strip_suffix(BYTES_SUFFIX) {
        return count
            .trim()
            .parse::<u64>()
            .map_err(|_| ExtractError::InvalidSize(raw.to_string()));
    }

    raw.parse::<ByteSize>()
        .map(|size| size.as_u64())
        .map_err(|_| ExtractError::InvalidSize(raw.to_string()))
}

/// Parses the numeric suffix of a `torrent-comment{id}` element ID
pub fn parse_comment_id(raw: &str) -> ExtractResult<i64> {
    let raw = raw.trim();
    raw.strip_prefix(COMMENT_ID_PREFIX)
        .unwrap_or(raw)
        .parse::<i64>()
        .map_err(|_| ExtractError::InvalidCommentId(raw.to_string()))
}

/// Parses a non-negative counter (seeders, leechers, completed)
///
/// A missing element yields an empty string, which counts as zero.
pub fn parse_count(field: &'static str, raw: &str) -> ExtractResult<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse::<u32>().map_err(|_| ExtractError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}
