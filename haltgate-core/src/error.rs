//! Error types for haltgate-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving run configuration. All are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required field was absent (or blank) in every configuration layer.
    #[error("missing required configuration: {field}")]
    Missing { field: &'static str },

    /// The repository was not an `owner/name` slug.
    #[error("invalid repository '{0}'; expected owner/name")]
    InvalidRepository(String),

    /// A field was present but out of range.
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// The config file could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load, with the file path.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
