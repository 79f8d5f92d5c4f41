//! Operation-scoped context for warning deduplication.
//!
//! A dependency search touches the same broken file many times: every
//! reference into it retries the read. [`OperationContext`] lets callers emit
//! one warning per file per operation without global state.
//!
//! # Example
//!
//! ```rust
//! use sc4pac_tools::core::OperationContext;
//! use std::path::Path;
//!
//! let ctx = OperationContext::new();
//!
//! assert!(ctx.should_warn_file(Path::new("/plugins/broken.dat")));
//! assert!(!ctx.should_warn_file(Path::new("/plugins/broken.dat")));
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Context for a single operation (one `track` call, one index build).
///
/// Thread-safe; shared by reference across concurrent jobs.
#[derive(Debug, Default)]
pub struct OperationContext {
    /// Files that have already emitted warnings during this operation.
    ///
    /// Keys are full paths: plugin folders routinely contain several files
    /// with the same name in different packages.
    warned_files: Mutex<HashSet<PathBuf>>,
}

impl OperationContext {
    /// Create a new operation context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if we should warn about a file and mark it as warned.
    ///
    /// Returns `true` the first time a path is seen in this operation.
    pub fn should_warn_file(&self, path: &Path) -> bool {
        // A poisoned lock still holds a usable set.
        let mut warned = self.warned_files.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        warned.insert(path.to_path_buf())
    }
}
