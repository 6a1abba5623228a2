//! Configuration module for Nyaa-Mirror
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every section has defaults, so running without a file
//! mirrors the public catalog with built-in settings.
//!
//! # Example
//!
//! ```no_run
//! use nyaa_mirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mirror.toml")).unwrap();
//! println!("Mirroring {}", config.remote.domain);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, OutputConfig, PacingConfig, RemoteConfig, SelectorTable};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default};
pub use validation::validate;
