//! sc4pac-tools - dependency tracking for SimCity 4 plugins
//!
//! SimCity 4 plugins are DBPF container files. A lot references the buildings
//! and props it places by instance id, buildings reference their models
//! through resource keys, and most exemplars inherit from a parent cohort.
//! None of these references name a file: the game resolves them against
//! everything it loaded from the plugins folder.
//!
//! This crate resolves them the same way. It indexes every record in the
//! plugins folder, follows the references of a plugin transitively, and
//! reports which files and sc4pac packages it needs and which references
//! nothing provides.
//!
//! # Modules
//!
//! - [`dbpf`] - DBPF container reader and QFS decompression
//! - [`exemplar`] - exemplar and cohort records, lot objects, resource keys
//! - [`index`] - TGI index over all scanned files, with families and a JSON cache
//! - [`package`] - sc4pac package folders and package ids
//! - [`tracker`] - the dependency search and its report
//! - [`config`] - `config.toml`
//! - [`cli`] - the `sc4pac-tools` command line
//! - [`core`] - TGIs, errors, per-operation state
//! - [`utils`] - file discovery, atomic writes, progress spinners
//!
//! # Example
//!
//! ```rust,no_run
//! use sc4pac_tools::tracker::{DependencyTracker, DumpOptions, TrackerOptions};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut options = TrackerOptions::new("/home/me/Documents/SimCity 4/Plugins");
//! options.game_dir = Some("/games/SimCity 4 Deluxe Edition".into());
//!
//! let tracker = DependencyTracker::new(options);
//! let result = tracker.track(&["200-residential/my-lots".to_string()]).await?;
//!
//! result.dump(&DumpOptions::default());
//! for missing in &result.missing {
//!     eprintln!("{:?} {:#010x} from {}", missing.kind, missing.instance, missing.file.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod dbpf;
pub mod exemplar;
pub mod index;
pub mod package;
pub mod tracker;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
