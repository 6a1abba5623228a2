//! Scanner module for walking the catalog
//!
//! This module contains the core scanning logic, including:
//! - HTTP fetching of listing pages
//! - Newest ID discovery from the RSS feed
//! - Scan range planning and per-ID skips
//! - The sequential fetch, reconcile, pace loop

mod controller;
mod discovery;
mod fetcher;
mod pacing;
mod scheduler;
mod state;

pub use controller::{ScanController, ScanOutcome, ScanReport};
pub use discovery::{discover_newest_id, newest_id_from_feed, parse_download_link};
pub use fetcher::{build_http_client, FetchError, PageFetcher};
pub use pacing::Pacer;
pub use scheduler::{RangeOptions, RangeScheduler, ScanRange, DEFAULT_START_ID};
pub use state::ScanState;

use crate::config::Config;
use crate::storage::Storage;
use crate::MirrorError;
use tokio_util::sync::CancellationToken;

/// Runs a complete scan
///
/// This is the main entry point for mirroring. It will:
/// 1. Build the fetcher from the configuration
/// 2. Discover the newest ID if no end was given
/// 3. Plan the range against the store
/// 4. Fetch and reconcile every ID until done or cancelled
///
/// # Arguments
///
/// * `config` - The mirror configuration
/// * `storage` - The store to reconcile into
/// * `options` - Range selection
/// * `cancel` - Cooperative cancellation signal
pub async fn scan<S: Storage>(
    config: &Config,
    storage: S,
    options: RangeOptions,
    cancel: &CancellationToken,
) -> Result<ScanReport, MirrorError> {
    let fetcher = PageFetcher::new(config)?;

    let discovered_end = if options.needs_discovery() {
        let newest = discover_newest_id(fetcher.client(), &config.remote).await?;
        tracing::info!("Newest post is {}", newest);
        Some(newest)
    } else {
        None
    };

    let mut controller = ScanController::new(
        storage,
        fetcher,
        RangeScheduler::new(options),
        Pacer::new(&config.pacing),
    );

    let range = controller.plan(discovered_end)?;
    controller.run(&range, cancel).await
}
