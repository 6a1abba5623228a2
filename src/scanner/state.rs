//! Scan state definitions
//!
//! The controller moves through these states for every post ID:
//! `Idle → Fetching → Reconciling → Pacing → Fetching(next) | Done | Cancelled`.
//! Failed fetch attempts loop `Fetching → Fetching` with a growing attempt count.

use std::fmt;

/// Where the controller is in the scan loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// No ID processed yet
    Idle,

    /// Fetch attempt `attempt` (1-based) for `id` in flight
    Fetching { id: i64, attempt: u32 },

    /// Writing the fetch result for `id`
    Reconciling { id: i64 },

    /// Sleeping after a reconciled ID
    Pacing,

    /// Range exhausted
    Done,

    /// Cancellation observed between IDs
    Cancelled,
}

impl ScanState {
    /// Returns true if the scan has ended
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Cancelled)
    }

    /// Returns true if moving from `self` to `next` is a legal step
    pub fn can_transition_to(&self, next: &ScanState) -> bool {
        use ScanState::*;

        match (self, next) {
            (Done | Cancelled, _) => false,
            (Idle | Pacing, Fetching { attempt: 1, .. }) => true,
            (Idle | Pacing, Done | Cancelled) => true,
            (Reconciling { .. }, Pacing) => true,
            (Fetching { id, attempt }, Fetching { id: next_id, attempt: next_attempt }) => {
                id == next_id && *next_attempt == attempt + 1
            }
            (Fetching { id, .. }, Reconciling { id: next_id }) => id == next_id,
            _ => false,
        }
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Fetching { id, attempt } => write!(f, "fetching {} (attempt {})", id, attempt),
            Self::Reconciling { id } => write!(f, "reconciling {}", id),
            Self::Pacing => write!(f, "pacing"),
            Self::Done => write!(f, "done"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}
