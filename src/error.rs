//! Error types for liftcup
//!
//! Precondition failures of the release pipeline (unknown quality, missing
//! tools, already staged file) are not errors; they are reported as
//! [`crate::release::ReleaseOutcome::Skipped`]. Everything here is a real
//! failure that aborts the current invocation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for liftcup operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for liftcup
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "upload.poster_path")
        key: Option<String>,
    },

    /// Release pipeline error (archive, parity, upload)
    #[error("release error: {0}")]
    Release(#[from] ReleaseError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// External tool execution failed (rar, par2, uploader)
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Operation not supported on this platform or configuration
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Failures of the individual release pipeline stages
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// The archiver failed to produce the volume set
    #[error("archive creation failed for {archive}: {reason}")]
    ArchiveFailed {
        /// Archive base path (without extension)
        archive: PathBuf,
        /// The reason archiving failed
        reason: String,
    },

    /// The parity tool failed to produce recovery data
    #[error("parity creation failed for {archive}: {reason}")]
    ParityFailed {
        /// Archive base path the parity set was built for
        archive: PathBuf,
        /// The reason parity creation failed
        reason: String,
    },

    /// The external uploader failed
    #[error("upload failed for {release_dir}: {reason}")]
    UploadFailed {
        /// Release directory that was being uploaded
        release_dir: PathBuf,
        /// The reason the upload failed
        reason: String,
    },

    /// Invalid path encountered while building the release bundle
    #[error("invalid path {path}: {reason}")]
    InvalidPath {
        /// The invalid path
        path: PathBuf,
        /// The reason the path is invalid
        reason: String,
    },
}

impl Error {
    /// Machine-readable code for this error, suitable for host-side status reporting
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Release(e) => match e {
                ReleaseError::ArchiveFailed { .. } => "archive_failed",
                ReleaseError::ParityFailed { .. } => "parity_failed",
                ReleaseError::UploadFailed { .. } => "upload_failed",
                ReleaseError::InvalidPath { .. } => "invalid_path",
            },
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::ExternalTool(_) => "external_tool_error",
            Error::NotSupported(_) => "not_supported",
            Error::Other(_) => "internal_error",
        }
    }
}
