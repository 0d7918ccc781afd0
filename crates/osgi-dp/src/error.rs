//! Error types for deployment package operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while assembling or reading a deployment package.
#[derive(Debug, Error)]
pub enum DpError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error.
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A candidate bundle could not be opened or read.
    #[error("Failed to process {}: {source}", .path.display())]
    Process {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// The output package could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// Manifest text could not be parsed.
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    /// A version string is not a valid OSGi version.
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// The project packaging is feature-like but no dependency tree is registered for it.
    #[error("Unknown packaging '{0}'")]
    UnknownPackaging(String),

    /// The project's primary output is required but missing.
    #[error(
        "The main artifact is missing. You may disable this error by setting 'failOnMissingMainArtifact' to 'false'"
    )]
    MissingMainArtifact,

    /// The explicit dependency batch could not be resolved.
    #[error("Failed to resolve additional dependencies: {0}")]
    Resolution(#[from] ResolutionError),

    /// Configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Failure of a batched dependency resolution request.
#[derive(Debug, Error)]
#[error("{coordinate}: {reason}")]
pub struct ResolutionError {
    /// The first coordinate that could not be resolved.
    pub coordinate: String,
    /// Why it could not be resolved.
    pub reason: String,
}

impl ResolutionError {
    pub fn new(coordinate: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            coordinate: coordinate.into(),
            reason: reason.into(),
        }
    }
}
