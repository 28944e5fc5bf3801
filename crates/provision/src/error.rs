//! Error types for capture, reconciliation and install tracking.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the provisioning core.
#[derive(Debug, Error)]
pub enum Error {
    /// A snapshot file does not exist.
    #[error("snapshot not found: {0}")]
    SnapshotNotFound(PathBuf),

    /// A snapshot could not be decoded.
    #[error("malformed snapshot in {origin}: {source}")]
    MalformedSnapshot {
        /// File path or other description of where the data came from
        origin: String,
        source: serde_json::Error,
    },

    /// The install state file exists but cannot be decoded.
    #[error("corrupt install state {}: {source}", path.display())]
    CorruptState {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// An essential capture phase failed.
    #[error("capture failed at '{step}': {source}")]
    Capture {
        step: &'static str,
        source: Box<Error>,
    },

    /// An external command could not be run or reported failure.
    #[error("{command}: {message}")]
    Command { command: String, message: String },

    /// Some removals failed; the rest were still attempted.
    #[error("{failed} of {attempted} package removals failed")]
    PartialRemoval { failed: usize, attempted: usize },

    /// Some installs failed; the rest were still attempted.
    #[error("{failed} of {attempted} package installs failed")]
    PartialInstall { failed: usize, attempted: usize },

    /// Filesystem error on a specific path.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Serialization failure while writing.
    #[error("failed to encode {what}: {source}")]
    Encode {
        what: &'static str,
        source: serde_json::Error,
    },

    /// Package-manager failure.
    #[error(transparent)]
    Package(#[from] brewkit::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means a file was simply absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::SnapshotNotFound(_))
    }
}

/// Result type for the provisioning core.
pub type Result<T> = std::result::Result<T, Error>;
