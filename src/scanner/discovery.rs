//! Newest post discovery through the catalog's RSS feed
//!
//! The first feed entry links to `/download/{id}.torrent`; that ID is the
//! default end of the scan range.

use crate::config::RemoteConfig;
use crate::MirrorError;
use reqwest::Client;
use url::Url;

/// Fetches the RSS feed and returns the newest post ID
///
/// # Errors
///
/// Every failure is [`MirrorError::Discovery`]: unreachable feed, non-success
/// status, unparseable feed, empty feed, or a first entry without a
/// download link.
pub async fn discover_newest_id(client: &Client, remote: &RemoteConfig) -> Result<i64, MirrorError> {
    let feed_url = format!("{}/?page=rss", remote.base_url());
    tracing::debug!("Fetching feed {}", feed_url);

    let response = client
        .get(&feed_url)
        .send()
        .await
        .map_err(|e| MirrorError::Discovery(format!("request to {} failed: {}", feed_url, e)))?;

    if !response.status().is_success() {
        return Err(MirrorError::Discovery(format!(
            "feed returned status {}",
            response.status()
        )));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| MirrorError::Discovery(format!("failed to read feed: {}", e)))?;

    newest_id_from_feed(&body)
}

/// Extracts the newest post ID from raw feed bytes
pub fn newest_id_from_feed(body: &[u8]) -> Result<i64, MirrorError> {
    let feed = feed_rs::parser::parse(body)
        .map_err(|e| MirrorError::Discovery(format!("failed to parse feed: {}", e)))?;

    let entry = feed
        .entries
        .first()
        .ok_or_else(|| MirrorError::Discovery("feed has no entries".to_string()))?;

    let link = entry
        .links
        .first()
        .ok_or_else(|| MirrorError::Discovery("first feed entry has no link".to_string()))?;

    parse_download_link(&link.href).ok_or_else(|| {
        MirrorError::Discovery(format!("no post ID in link '{}'", link.href))
    })
}

/// Parses the post ID out of a `.../download/{id}.torrent` link
pub fn parse_download_link(link: &str) -> Option<i64> {
    let url = Url::parse(link).ok()?;
    let mut segments = url.path_segments()?;

    if segments.next()? != "download" {
        return None;
    }

    let file = segments.next()?;
    if segments.next().is_some() {
        return None;
    }

    file.strip_suffix(".torrent")?.parse().ok()
}
