//! Integration test suite for sc4pac-tools
//!
//! End-to-end tests that build real DBPF fixtures in temporary plugins
//! folders, index them and track dependencies through the library API and
//! the `sc4pac-tools` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **tracking**: closure semantics (idempotence, at-most-once, cycles, overrides, exemptions)
//! - **packages**: package ids as sources and package lists in results
//! - **cli**: the `track`, `verify`, `index` and `find` commands

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cli;
mod packages;
mod tracking;
