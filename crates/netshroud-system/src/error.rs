//! Error types for privileged host operations.

use thiserror::Error;

/// Result type alias using [`SystemError`].
pub type Result<T> = std::result::Result<T, SystemError>;

/// Errors produced while driving the host's network tooling.
#[derive(Error, Debug)]
pub enum SystemError {
    /// The external tool could not be spawned at all.
    #[error("failed to execute {0}: {1}")]
    Spawn(&'static str, String),

    /// The external tool ran and exited with an error.
    #[error("{0} command failed: {1}")]
    CommandFailed(&'static str, String),

    /// Permission denied (need root or CAP_NET_ADMIN).
    #[error("permission denied (requires root/CAP_NET_ADMIN)")]
    PermissionDenied,

    /// Tool output did not have the expected shape.
    #[error("failed to parse {0}")]
    Parse(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
