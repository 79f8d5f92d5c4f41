//! Stress tests for sc4pac-tools
//!
//! Large fixtures that exercise the work queue and the index at sizes far
//! beyond typical plugin folders: parent chains thousands of records deep and
//! lots referencing thousands of files. Timings are printed rather than
//! asserted.
//!
//! ```bash
//! cargo test --test stress -- --nocapture
//! ```

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod deep_chain;
mod wide_collection;
