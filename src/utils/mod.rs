//! Utilities shared by the index, the tracker and the CLI.
//!
//! - [`fs`] - atomic writes and discovery of DBPF container files
//! - [`progress`] - spinners and progress bars

pub mod fs;
pub mod progress;

pub use fs::{absolute_path, atomic_write, collect_container_files, ensure_dir, expand_source_path, is_container_file};
pub use progress::{ProgressBar, ProgressStyle, spinner_with_message};
