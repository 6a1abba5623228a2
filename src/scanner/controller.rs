//! Scan controller - the fetch, reconcile, pace loop
//!
//! Visits every ID of a [`ScanRange`] strictly in order on a single task.
//! Transient fetch failures are retried forever on the same ID; everything
//! else that fails ends the scan. Cancellation is checked only at the top
//! of each iteration, so an ID that has started is always finished.

use crate::model::FetchOutcome;
use crate::scanner::fetcher::PageFetcher;
use crate::scanner::pacing::Pacer;
use crate::scanner::scheduler::{RangeScheduler, ScanRange};
use crate::scanner::state::ScanState;
use crate::storage::Storage;
use crate::MirrorError;
use chrono::Utc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// How a scan ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Every ID in the range was visited
    Done,

    /// Cancellation was observed between two IDs
    Cancelled,
}

/// Counters for a finished scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub outcome: ScanOutcome,

    /// IDs reconciled from a 200 response
    pub found: u64,

    /// IDs reconciled from a 404 response
    pub not_found: u64,

    /// IDs skipped because a row already existed
    pub skipped: u64,

    /// Failed fetch attempts that were retried
    pub retries: u64,

    /// Last ID that was reconciled
    pub last_id: Option<i64>,
}

impl ScanReport {
    fn new() -> Self {
        Self {
            outcome: ScanOutcome::Done,
            found: 0,
            not_found: 0,
            skipped: 0,
            retries: 0,
            last_id: None,
        }
    }
}

/// Drives a scan over a store
///
/// The controller owns the store for the duration of the scan.
pub struct ScanController<S: Storage> {
    storage: S,
    fetcher: PageFetcher,
    scheduler: RangeScheduler,
    pacer: Pacer,
    state: ScanState,
}

impl<S: Storage> ScanController<S> {
    pub fn new(storage: S, fetcher: PageFetcher, scheduler: RangeScheduler, pacer: Pacer) -> Self {
        Self {
            storage,
            fetcher,
            scheduler,
            pacer,
            state: ScanState::Idle,
        }
    }

    /// Current state of the scan
    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Releases the store, closing it when dropped
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Plans the range with this controller's scheduler and store
    pub fn plan(&self, discovered_end: Option<i64>) -> Result<ScanRange, MirrorError> {
        self.scheduler.plan(&self.storage, discovered_end)
    }

    /// Runs the scan to completion or cancellation
    ///
    /// # Errors
    ///
    /// An unexpected HTTP status or any storage failure ends the scan with
    /// an error. The store holds everything committed before that ID.
    pub async fn run(
        &mut self,
        range: &ScanRange,
        cancel: &CancellationToken,
    ) -> Result<ScanReport, MirrorError> {
        let mut report = ScanReport::new();

        match range.first_id() {
            Some(first) if !range.is_empty() => {
                tracing::info!("Starting from {} and ending on: {}", first, range.end_inclusive)
            }
            _ => tracing::info!("Nothing to scan up to {}", range.end_inclusive),
        }

        for id in range.ids() {
            if cancel.is_cancelled() {
                self.transition(ScanState::Cancelled);
                report.outcome = ScanOutcome::Cancelled;
                return Ok(report);
            }

            if self.scheduler.should_skip(&self.storage, id)? {
                tracing::info!("Skipping {}", id);
                report.skipped += 1;
                continue;
            }

            let (outcome, started) = self.fetch_with_retry(id, &mut report).await?;

            self.transition(ScanState::Reconciling { id });
            self.storage.reconcile(id, &outcome, Utc::now())?;

            match outcome {
                FetchOutcome::Found(_) => {
                    report.found += 1;
                    tracing::info!(
                        "[ID {}] {} found in {:?}",
                        id,
                        outcome.status_code(),
                        started.elapsed()
                    );
                }
                FetchOutcome::NotFound => {
                    report.not_found += 1;
                    tracing::info!(
                        "[ID {}] {} not found in {:?}",
                        id,
                        outcome.status_code(),
                        started.elapsed()
                    );
                }
            }
            report.last_id = Some(id);

            self.transition(ScanState::Pacing);
            self.pacer.pause().await;
        }

        self.transition(ScanState::Done);
        Ok(report)
    }

    /// Fetches `id` until an attempt yields 200 or 404
    ///
    /// Returns the outcome and the start time of the successful attempt.
    async fn fetch_with_retry(
        &mut self,
        id: i64,
        report: &mut ScanReport,
    ) -> Result<(FetchOutcome, Instant), MirrorError> {
        let mut attempt = 1;

        loop {
            self.transition(ScanState::Fetching { id, attempt });
            let started = Instant::now();

            match self.fetcher.fetch(id).await {
                Ok(outcome) => return Ok((outcome, started)),
                Err(e) if e.is_transient() => {
                    tracing::warn!("Warning: {} (attempt {})", e, attempt);
                    report.retries += 1;
                    self.pacer.pause().await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn transition(&mut self, next: ScanState) {
        debug_assert!(
            self.state.can_transition_to(&next),
            "invalid scan transition {} -> {}",
            self.state,
            next
        );
        tracing::trace!("{} -> {}", self.state, next);
        self.state = next;
    }
}
