//! Integration tests for the mirror
//!
//! These tests use wiremock to stand in for the remote catalog and
//! tempfile databases to check what a scan leaves behind.

mod common;
mod discovery_tests;
mod scan_tests;
