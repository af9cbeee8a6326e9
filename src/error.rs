//! Error types for testsuite-rs

use crate::hooks::EntityKind;
use thiserror::Error;

/// Result type alias for testsuite operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for testsuite operations
///
/// Test failures are not errors: they are recorded as an
/// [`Outcome`](crate::status::Outcome) on the case. This type covers
/// discovery, configuration and hook failures, which abort the current run.
#[derive(Error, Debug)]
pub enum Error {
    /// Regex error
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// WalkDir error
    #[error("Directory walk error: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Suite configuration file could not be parsed
    #[error("Invalid suite configuration in {file}: {source}")]
    Config {
        file: String,
        #[source]
        source: toml::de::Error,
    },

    /// A registered hook failed
    #[error("{kind} hook failed for '{entity}': {message}")]
    Hook {
        kind: EntityKind,
        entity: String,
        message: String,
    },

    /// No suite directory matched under the root
    #[error("No test suites found under {root} matching pattern: {pattern}")]
    NoSuites { root: String, pattern: String },

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

impl Error {
    /// Create a hook error
    pub fn hook_error(
        kind: EntityKind,
        entity: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::Hook {
            kind,
            entity: entity.into(),
            message: message.into(),
        }
    }

    /// Create a suite configuration error
    pub fn config_error(file: impl Into<String>, source: toml::de::Error) -> Self {
        Error::Config {
            file: file.into(),
            source,
        }
    }
}
