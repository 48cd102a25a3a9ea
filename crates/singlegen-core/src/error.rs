//! Error types for singlegen
//!
//! Provides error handling for:
//! - Configuration loading and validation
//! - Tree copy, rename and rewrite operations

use std::path::PathBuf;

/// Errors while loading or validating a [`GenerationConfig`](crate::GenerationConfig)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("io error reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the expected shape
    #[error("invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config parsed but violates a constraint
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create validation error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

/// Errors during generation
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// Source tree does not exist or is not a directory
    #[error("source tree not found: {0}")]
    SourceMissing(PathBuf),

    /// Generated tree does not exist or is not a directory
    #[error("generated tree not found: {0}")]
    TargetMissing(PathBuf),

    /// Source and destination overlap, copying would recurse or destroy input
    #[error("source {source_dir} and destination {target_dir} overlap")]
    OverlappingTrees {
        source_dir: PathBuf,
        target_dir: PathBuf,
    },

    /// Filesystem operation failed
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed
    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// Requested job is not in the configuration
    #[error("unknown job: '{0}'")]
    UnknownJob(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl GenError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for generation operations
pub type GenResult<T> = Result<T, GenError>;
