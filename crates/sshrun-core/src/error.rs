//! Error types for sshrun-core

use thiserror::Error;

/// A request parameter or credential field is missing or malformed
///
/// Always detected before any network activity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no host parameter provided for execution")]
    MissingHost,

    #[error("timeout should be a number, got {0}")]
    InvalidTimeout(String),

    #[error("port should be a number, got {0}")]
    InvalidPort(String),

    #[error("no command parameter provided for execution")]
    MissingCommand,

    #[error("missing ssh connection")]
    MissingConnection,

    #[error("missing ssh key")]
    MissingKey,

    #[error("missing ssh username")]
    MissingUsername,
}
