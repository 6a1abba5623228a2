//! Output module for reporting on the mirror
//!
//! This module handles summarising what the store currently holds.

pub mod stats;

pub use stats::{load_statistics, print_statistics, MirrorStatistics};
