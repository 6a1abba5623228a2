//! Scan range computation
//!
//! Decides which post IDs a scan visits:
//! - the end of the range is `--end`, or the newest ID from the feed
//! - the start is `--start`, or the highest stored ID (resume point)
//! - `--continue-in-range` additionally skips to the highest stored ID
//!   inside the `[start, end]` window
//! - `--skip` skips individual IDs that already have a row

use crate::storage::{Storage, StorageResult};
use crate::{ConfigError, MirrorError};
use std::ops::RangeInclusive;

/// Resume point used when the store is empty
pub const DEFAULT_START_ID: i64 = 0;

/// Range selection requested by the operator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeOptions {
    /// Exclusive start; `None` resumes after the highest stored ID
    pub start: Option<i64>,

    /// Inclusive end; `None` uses the newest discovered ID
    pub end: Option<i64>,

    /// Skip IDs that already have a post row
    pub skip_existing: bool,

    /// Skip to the highest stored ID inside `[start, end]`
    pub continue_in_range: bool,
}

impl RangeOptions {
    /// Whether the end of the range has to come from discovery
    pub fn needs_discovery(&self) -> bool {
        self.end.is_none()
    }
}

/// A planned scan: visits `start_exclusive + 1 ..= end_inclusive`, minus
/// everything at or below `skip_up_to`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRange {
    pub start_exclusive: i64,
    pub end_inclusive: i64,

    /// In-range watermark (`--continue-in-range`)
    pub skip_up_to: Option<i64>,
}

impl ScanRange {
    /// First ID that will be fetched, `None` once the start is `i64::MAX`
    pub fn first_id(&self) -> Option<i64> {
        let after = match self.skip_up_to {
            Some(watermark) => self.start_exclusive.max(watermark),
            None => self.start_exclusive,
        };
        after.checked_add(1)
    }

    /// IDs to visit, in increasing order
    pub fn ids(&self) -> RangeInclusive<i64> {
        match self.first_id() {
            Some(first) => first..=self.end_inclusive,
            // 1..=0 is empty
            None => 1..=0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first_id().map_or(true, |first| first > self.end_inclusive)
    }
}

/// Computes scan ranges and per-ID skips
#[derive(Debug, Clone, Default)]
pub struct RangeScheduler {
    options: RangeOptions,
}

impl RangeScheduler {
    pub fn new(options: RangeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RangeOptions {
        &self.options
    }

    /// Plans the scan range
    ///
    /// # Arguments
    ///
    /// * `storage` - Store to read the resume point and watermark from
    /// * `discovered_end` - Newest ID from the feed, required when no
    ///   explicit end was given
    pub fn plan<S>(&self, storage: &S, discovered_end: Option<i64>) -> Result<ScanRange, MirrorError>
    where
        S: Storage + ?Sized,
    {
        let end_inclusive = self.options.end.or(discovered_end).ok_or_else(|| {
            MirrorError::Discovery("no end of range given and none discovered".to_string())
        })?;

        let start_exclusive = match self.options.start {
            Some(start) => start,
            None => storage.max_stored_id()?.unwrap_or(DEFAULT_START_ID),
        };

        if start_exclusive < 0 || end_inclusive < 0 {
            return Err(ConfigError::Validation(format!(
                "post IDs cannot be negative (start {}, end {})",
                start_exclusive, end_inclusive
            ))
            .into());
        }

        let skip_up_to = if self.options.continue_in_range {
            let watermark = storage.max_stored_id_in_range(start_exclusive, end_inclusive)?;
            if let Some(watermark) = watermark {
                tracing::info!("Skipping in range up to {}", watermark);
            }
            watermark
        } else {
            None
        };

        Ok(ScanRange {
            start_exclusive,
            end_inclusive,
            skip_up_to,
        })
    }

    /// Whether `id` should be skipped without fetching
    pub fn should_skip<S>(&self, storage: &S, id: i64) -> StorageResult<bool>
    where
        S: Storage + ?Sized,
    {
        if !self.options.skip_existing {
            return Ok(false);
        }
        storage.post_exists(id)
    }
}
