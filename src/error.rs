//! Failure taxonomy for the install pipeline.
//!
//! Every stage failure is fatal to the current package's install and
//! propagates unchanged to the caller; rollback and process exit are the
//! caller's decision, not the pipeline's.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias for pipeline operations.
pub type InstallResult<T> = Result<T, InstallError>;

/// One variant per pipeline stage that can fail.
///
/// Rollback failures are deliberately not represented here: they are logged
/// per path during cleanup and never abort it.
#[derive(Debug, Error)]
pub enum InstallError {
    /// No unique archive URL could be determined from the repository listing.
    #[error("cannot resolve {name}: {reason}")]
    Resolution { name: String, reason: String },

    /// The HTTP request failed, returned a non-success status, or the
    /// connection dropped mid-transfer.
    #[error("transfer from {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: io::Error,
    },

    /// The payload is not valid xz data, or ends before the stream does.
    #[error("cannot decompress archive from {url}: {source}")]
    Decompression {
        url: String,
        #[source]
        source: io::Error,
    },

    /// The decompressed payload is not a well-formed tar archive.
    #[error("malformed archive from {url}: {source}")]
    Archive {
        url: String,
        #[source]
        source: io::Error,
    },

    /// Writing or chmodding a destination file failed.
    #[error("cannot place {}: {source}", .path.display())]
    Place {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl InstallError {
    /// Process exit code for this failure category.
    ///
    /// Code 1 is reserved for configuration and usage errors reported
    /// outside the pipeline.
    pub fn exit_code(&self) -> u8 {
        match self {
            InstallError::Resolution { .. } => 2,
            InstallError::Transport { .. } => 3,
            InstallError::Decompression { .. } => 4,
            InstallError::Archive { .. } => 5,
            InstallError::Place { .. } => 6,
        }
    }

    /// Short stage name used in progress and summary output.
    pub fn stage(&self) -> &'static str {
        match self {
            InstallError::Resolution { .. } => "resolve",
            InstallError::Transport { .. } => "fetch",
            InstallError::Decompression { .. } => "decompress",
            InstallError::Archive { .. } => "extract",
            InstallError::Place { .. } => "place",
        }
    }
}
