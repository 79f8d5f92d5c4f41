//! Core types shared by every layer of sc4pac-tools.
//!
//! - [`Sc4pacError`], [`ErrorContext`] and [`user_friendly_error`]: the error
//!   taxonomy and its CLI presentation
//! - [`Tgi`] and [`TgiQuery`]: record identifiers and partial lookups
//! - [`OperationContext`]: per-operation warning deduplication
//!
//! # Examples
//!
//! ```rust
//! use sc4pac_tools::core::{Tgi, TgiQuery};
//!
//! let tgi: Tgi = "0x6534284a-0xa8fbd372-0x00001234".parse().unwrap();
//! assert!(TgiQuery::instance(0x1234).matches(&tgi));
//! ```

pub mod error;
pub mod operation_context;
pub mod tgi;

pub use error::{ErrorContext, Sc4pacError, user_friendly_error};
pub use operation_context::OperationContext;
pub use tgi::{Tgi, TgiQuery, hex, parse_hex_u32};
