use serde::Deserialize;

/// Main configuration structure for Nyaa-Mirror
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub selectors: SelectorTable,
}

/// Remote catalog configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Host serving `/view/{id}` pages and the RSS feed
    pub domain: String,

    /// `https` in production; tests point this at a local `http` server
    pub scheme: String,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            domain: "nyaa.si".to_string(),
            scheme: "https".to_string(),
            user_agent: format!("nyaa-mirror/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

impl RemoteConfig {
    /// Base URL of the remote catalog, e.g. `https://nyaa.si`
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.domain)
    }
}

/// Delay between requests
///
/// Every sleep lasts `base_delay_ms` plus a uniformly random amount in
/// `[0, jitter_ms)`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    #[serde(rename = "base-delay-ms")]
    pub base_delay_ms: u64,

    #[serde(rename = "jitter-ms")]
    pub jitter_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 300,
            jitter_ms: 400,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "database.db".to_string(),
        }
    }
}

/// Declarative map from record fields to document locations
///
/// Each entry is a CSS selector, optionally followed by a space and `@attr`
/// to read an attribute of the first match instead of its text. Comment
/// fields are evaluated inside each element matched by `comment`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SelectorTable {
    pub title: String,
    pub category: String,
    pub submitter: String,
    pub information: String,
    pub file_size: String,
    pub date: String,
    pub seeders: String,
    pub leechers: String,
    pub completed: String,
    pub info_hash: String,
    pub description: String,
    pub torrent_url: String,
    pub magnet_url: String,
    pub comment: String,
    pub comment_id: String,
    pub comment_submitter: String,
    pub comment_content: String,
    pub comment_date: String,
    pub comment_edited_date: String,
}

impl Default for SelectorTable {
    fn default() -> Self {
        Self {
            title: ".panel:nth-child(1) .panel-heading .panel-title:nth-child(1)".to_string(),
            category: ".col-md-5 a:nth-child(2) @href".to_string(),
            submitter: ".col-md-5 a.text-default[href]".to_string(),
            information: ".row:nth-child(3) .col-md-5:nth-child(2)".to_string(),
            file_size: ".row:nth-child(4) .col-md-5:nth-child(2)".to_string(),
            date: ".col-md-5[data-timestamp]".to_string(),
            seeders: ".row:nth-child(2) .col-md-5 span".to_string(),
            leechers: ".row:nth-child(3) .col-md-5 span".to_string(),
            completed: ".row:nth-child(4) .col-md-5:nth-child(4)".to_string(),
            info_hash: "kbd".to_string(),
            description: "#torrent-description".to_string(),
            torrent_url: ".panel-footer a:nth-child(1) @href".to_string(),
            magnet_url: ".card-footer-item @href".to_string(),
            comment: ".comment-panel".to_string(),
            comment_id: ".comment-content @id".to_string(),
            comment_submitter: "[title=\"User\"]".to_string(),
            comment_content: ".comment-content".to_string(),
            comment_date: ".comment-details a small[data-timestamp]".to_string(),
            comment_edited_date: ".comment-details > small @title".to_string(),
        }
    }
}
