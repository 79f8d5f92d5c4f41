//! Error handling for sc4pac-tools
//!
//! Two layers work together here:
//! 1. [`Sc4pacError`] - strongly-typed failures raised by the DBPF reader, the
//!    exemplar decoder, the package index and the configuration loader
//! 2. [`ErrorContext`] - a wrapper that adds user-facing details and
//!    suggestions when an error reaches the command line
//!
//! Low-level code returns `Result<T, Sc4pacError>`. Orchestration code (index
//! building, tracking, CLI commands) works with [`anyhow::Result`] and attaches
//! `.context(...)` as it goes. [`user_friendly_error`] turns whatever bubbles
//! up into an [`ErrorContext`] for display.
//!
//! Missing references found while tracking are *not* errors; they are part of
//! the [`TrackingResult`](crate::tracker::TrackingResult).
//!
//! # Examples
//!
//! ```rust,no_run
//! use sc4pac_tools::core::{Sc4pacError, user_friendly_error};
//!
//! let error = Sc4pacError::InvalidPackageId {
//!     id: "memo:".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // colored error, details and suggestion on stderr
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for sc4pac-tools.
///
/// Variants carry the path or input that caused the failure so messages can
/// be acted upon without re-running with `--verbose`.
#[derive(Error, Debug)]
pub enum Sc4pacError {
    /// A file could not be read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A DBPF container has a bad header, index table or record payload.
    #[error("Corrupt DBPF archive {}: {reason}", path.display())]
    CorruptArchive {
        /// The container.
        path: PathBuf,
        /// What was wrong.
        reason: String,
    },

    /// A record's bytes could not be interpreted.
    #[error("Failed to decode record: {reason}")]
    Decode {
        /// What was wrong.
        reason: String,
    },

    /// A package id is not of the form `group:name`.
    #[error("Invalid package id '{id}': expected the form group:name")]
    InvalidPackageId {
        /// The offending input.
        id: String,
    },

    /// A TGI string could not be parsed.
    #[error("Invalid TGI '{input}': expected three hexadecimal fields like 0x6534284a-0xa8fbd372-0x00001234")]
    InvalidTgi {
        /// The offending input.
        input: String,
    },

    /// The index cache file could not be read or written.
    #[error("Index cache error in {}: {reason}", path.display())]
    IndexCache {
        /// The cache file.
        path: PathBuf,
        /// What was wrong.
        reason: String,
    },

    /// Configuration file problems.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem.
        message: String,
    },

    /// Anything else.
    #[error("{message}")]
    Other {
        /// Description of the problem.
        message: String,
    },
}

impl Sc4pacError {
    /// Shorthand for a [`Sc4pacError::Decode`].
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`Sc4pacError::CorruptArchive`].
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CorruptArchive {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`Sc4pacError::Io`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Error wrapper with user-facing details and suggestions.
///
/// # Examples
///
/// ```rust,no_run
/// use sc4pac_tools::core::{ErrorContext, Sc4pacError};
///
/// let context = ErrorContext::new(Sc4pacError::InvalidPackageId {
///     id: "memo".to_string(),
/// })
/// .with_suggestion("Use the sc4pac package id, e.g. memo:essential-fixes")
/// .with_details("Package ids are looked up in <plugins>/*/*.sc4pac");
///
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: Sc4pacError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context without suggestion or details.
    #[must_use]
    pub const fn new(error: Sc4pacError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error. Displayed in green.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error. Displayed in yellow.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details and suggestion to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Recognizes [`Sc4pacError`] (also when wrapped in `anyhow` context),
/// [`std::io::Error`] and [`toml::de::Error`]. Everything else is reported
/// with its full cause chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let chain = cause_chain(&error);

    let error = match error.downcast::<Sc4pacError>() {
        Ok(sc4pac_error) => return create_error_context(sc4pac_error),
        Err(error) => error,
    };

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        let ctx = ErrorContext::new(Sc4pacError::Other {
            message: format!("{error}{chain}"),
        });
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ctx
                    .with_suggestion("Check file ownership and permissions of the plugins folder")
                    .with_details("sc4pac-tools could not read or write a file");
            }
            std::io::ErrorKind::NotFound => {
                return ctx
                    .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => return ctx,
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(Sc4pacError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax of ~/.sc4pac-tools/config.toml or the file passed with --config");
    }

    ErrorContext::new(Sc4pacError::Other {
        message: format!("{error}{chain}"),
    })
}

fn cause_chain(error: &anyhow::Error) -> String {
    let causes: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    let mut message = String::new();
    if !causes.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in causes.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }
    message
}

/// Attach suggestions to each [`Sc4pacError`] variant.
fn create_error_context(error: Sc4pacError) -> ErrorContext {
    match &error {
        Sc4pacError::Io {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check that the path exists and is readable"),

        Sc4pacError::CorruptArchive {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Re-download the plugin; the file may be truncated or not a DBPF container")
            .with_details("DBPF files start with the magic bytes 'DBPF' and use major version 1"),

        Sc4pacError::Decode {
            ..
        } => ErrorContext::new(error)
            .with_details("Only binary exemplars (EQZB/CQZB) are supported"),

        Sc4pacError::InvalidPackageId {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Use the sc4pac package id, e.g. memo:essential-fixes"),

        Sc4pacError::InvalidTgi {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Pass the TGI as hex, e.g. 0x6534284a-0xa8fbd372-0x00001234"),

        Sc4pacError::IndexCache {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Rebuild the index with 'sc4pac-tools index --rebuild' or pass --no-cache"),

        Sc4pacError::ConfigError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check ~/.sc4pac-tools/config.toml or the file passed with --config"),

        Sc4pacError::Other {
            ..
        } => ErrorContext::new(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_error_display() {
        let error = Sc4pacError::InvalidPackageId {
            id: "memo".to_string(),
        };
        assert_eq!(error.to_string(), "Invalid package id 'memo': expected the form group:name");

        let error = Sc4pacError::corrupt("/plugins/a.dat", "bad magic");
        assert_eq!(error.to_string(), "Corrupt DBPF archive /plugins/a.dat: bad magic");

        let error = Sc4pacError::decode("truncated property");
        assert_eq!(error.to_string(), "Failed to decode record: truncated property");
    }

    #[test]
    fn test_error_context() {
        let ctx = ErrorContext::new(Sc4pacError::Other {
            message: "x".to_string(),
        })
        .with_suggestion("do this")
        .with_details("because");

        assert_eq!(ctx.suggestion, Some("do this".to_string()));
        assert_eq!(ctx.details, Some("because".to_string()));

        let display = format!("{ctx}");
        assert!(display.contains("Details: because"));
        assert!(display.contains("Suggestion: do this"));
    }

    #[test]
    fn test_user_friendly_error_finds_wrapped_error() {
        let result: anyhow::Result<()> = Err(Sc4pacError::InvalidPackageId {
            id: "memo:".to_string(),
        })
        .context("Failed to resolve sources");

        let ctx = user_friendly_error(result.unwrap_err());
        assert!(matches!(ctx.error, Sc4pacError::InvalidPackageId { .. }));
        assert!(ctx.suggestion.is_some());
    }

    #[test]
    fn test_user_friendly_error_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let ctx = user_friendly_error(anyhow::Error::from(io_error));
        assert!(matches!(ctx.error, Sc4pacError::Other { .. }));
        assert!(ctx.suggestion.is_some());
        assert!(ctx.details.is_some());
    }

    #[test]
    fn test_user_friendly_error_generic_includes_chain() {
        let error = anyhow::anyhow!("root cause").context("outer");
        let ctx = user_friendly_error(error);
        let message = ctx.error.to_string();
        assert!(message.contains("outer"));
        assert!(message.contains("root cause"));
    }
}
