//! User configuration for sc4pac-tools.
//!
//! Settings live in a TOML file (`~/.sc4pac-tools/config.toml`, or
//! `%LOCALAPPDATA%\sc4pac-tools\config.toml` on Windows). Every field is
//! optional; command line flags override file values.
//!
//! ```toml
//! plugins = "~/Documents/SimCity 4/Plugins"
//! game_dir = "C:/Games/SimCity 4 Deluxe Edition"
//! scan = ["~/Documents/SimCity 4/Extra"]
//! cache = "~/.cache/sc4pac-tools/index.json"
//! max_concurrency = 16
//! ```

pub mod tools;

pub use tools::ToolsConfig;
