//! Test utilities for sc4pac-tools
//!
//! Fixture builders for DBPF containers and exemplars, a temporary plugins
//! folder, and logging setup for tests. Available to unit tests and, through
//! the `test-utils` feature, to the integration and stress suites.
//!
//! # Example
//!
//! ```rust,no_run
//! use sc4pac_tools::core::Tgi;
//! use sc4pac_tools::test_utils::{DbpfBuilder, ExemplarBuilder, TestPlugins};
//!
//! let plugins = TestPlugins::new().unwrap();
//! let building = ExemplarBuilder::exemplar().exemplar_type(0x02);
//! plugins
//!     .write_package_file(
//!         "200-residential",
//!         "memo:houses",
//!         "houses.dat",
//!         &DbpfBuilder::new().exemplar(Tgi::new(0x6534_284A, 0x1, 0x1234), &building),
//!     )
//!     .unwrap();
//! ```

pub mod dbpf_builder;
pub mod environment;

pub use dbpf_builder::{DbpfBuilder, ExemplarBuilder};
pub use environment::TestPlugins;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Runs once per process. Uses `level` when given, otherwise `RUST_LOG`; with
/// neither, logging stays off.
///
/// ```bash
/// RUST_LOG=sc4pac_tools=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
