//! Progress indicators for long-running operations.
//!
//! Thin wrappers around [`indicatif`] with one consistent look. Indexing a
//! full plugins folder can take a while, so the CLI shows a spinner while the
//! index is built and a bar while `verify` walks package folders.
//!
//! Progress output is suppressed when `SC4PAC_NO_PROGRESS` is set (the
//! `--no-progress` flag sets it), which keeps logs and test output clean.
//!
//! # Examples
//!
//! ```rust,no_run
//! use sc4pac_tools::utils::progress::{ProgressBar, spinner_with_message};
//!
//! let spinner = spinner_with_message("Indexing plugins");
//! // ... build the index ...
//! spinner.finish_and_clear();
//!
//! let bar = ProgressBar::new(40);
//! for _ in 0..40 {
//!     bar.inc(1);
//! }
//! bar.finish_and_clear();
//! ```

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::time::Duration;

use crate::constants::NO_PROGRESS_ENV;

/// Whether progress output is disabled through the environment.
pub fn is_progress_disabled() -> bool {
    std::env::var(NO_PROGRESS_ENV).is_ok()
}

/// A progress bar or spinner. Hidden when progress is disabled.
#[derive(Clone)]
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// A bar for `len` units of work.
    pub fn new(len: u64) -> Self {
        let bar = if is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new(len);
            bar.set_style(ProgressStyle::default_style());
            bar
        };
        Self {
            inner: bar,
        }
    }

    /// A spinner for work of unknown size. Ticks every 100ms.
    pub fn new_spinner() -> Self {
        let bar = if is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new_spinner();
            bar.set_style(ProgressStyle::spinner());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        };
        Self {
            inner: bar,
        }
    }

    pub fn set_message(&self, msg: impl Into<String>) {
        self.inner.set_message(msg.into());
    }

    pub fn inc(&self, delta: u64) {
        self.inner.inc(delta);
    }

    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }

    /// Whether output is suppressed.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.inner.is_hidden()
    }
}

/// Shared styles.
pub struct ProgressStyle;

impl ProgressStyle {
    /// `[bar] pos/len (eta) message`.
    pub fn default_style() -> IndicatifStyle {
        IndicatifStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| IndicatifStyle::default_bar())
            .progress_chars("=>-")
    }

    /// `spinner message`.
    pub fn spinner() -> IndicatifStyle {
        IndicatifStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| IndicatifStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
    }
}

/// A spinner already showing `msg`.
pub fn spinner_with_message(msg: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(msg);
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_disabled_through_env() {
        // SAFETY: serialized with the other env-mutating tests.
        unsafe { std::env::set_var(NO_PROGRESS_ENV, "1") };
        assert!(is_progress_disabled());
        assert!(ProgressBar::new(10).is_hidden());
        assert!(ProgressBar::new_spinner().is_hidden());
        unsafe { std::env::remove_var(NO_PROGRESS_ENV) };
        assert!(!is_progress_disabled());
    }

    #[test]
    #[serial]
    fn test_operations_on_hidden_bar() {
        unsafe { std::env::set_var(NO_PROGRESS_ENV, "1") };
        let bar = ProgressBar::new(3);
        bar.set_message("working");
        bar.inc(3);
        bar.finish_and_clear();
        let spinner = spinner_with_message("spinning");
        spinner.finish_and_clear();
        unsafe { std::env::remove_var(NO_PROGRESS_ENV) };
    }
}
