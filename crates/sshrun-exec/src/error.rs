//! Error types for sshrun-exec

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while running a command on a remote shell
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// No host was configured
    #[error("missing server host")]
    MissingHost,

    /// No private key was configured
    #[error("can't connect without a private SSH key")]
    MissingCredential,

    /// Failed to connect to remote host
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Authentication failed
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Remote command sequence exited non-zero
    #[error("Process exited with status {status}")]
    CommandFailed {
        /// Exit status code
        status: i32,
        /// Stderr output
        stderr: String,
    },

    /// The whole run exceeded its deadline
    #[error("run command timeout after {timeout:?}")]
    Timeout {
        /// Timeout duration that was exceeded
        timeout: Duration,
    },

    /// SSH key error
    #[error("SSH key error: {0}")]
    SshKeyError(String),

    /// Process spawn error
    #[error("failed to spawn process: {0}")]
    SpawnError(String),

    /// I/O error during execution
    #[error("I/O error: {0}")]
    IoError(String),

    /// Invalid session parameters
    #[error("invalid configuration: {0}")]
    ConfigError(String),
}

/// Coarse classification of an [`ExecError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Engine was handed a configuration without host or key
    Misuse,
    /// Transport, key or authentication failure
    Connect,
    /// The remote command sequence exited non-zero
    RemoteExecution,
    /// The configured timeout elapsed
    Timeout,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Misuse => "misuse",
            ErrorKind::Connect => "connect",
            ErrorKind::RemoteExecution => "remote_execution",
            ErrorKind::Timeout => "timeout",
        };
        f.write_str(name)
    }
}

impl ExecError {
    /// Classify the error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecError::MissingHost | ExecError::MissingCredential => ErrorKind::Misuse,
            ExecError::CommandFailed { .. } => ErrorKind::RemoteExecution,
            ExecError::Timeout { .. } => ErrorKind::Timeout,
            ExecError::ConnectionFailed(_)
            | ExecError::AuthenticationFailed(_)
            | ExecError::SshKeyError(_)
            | ExecError::SpawnError(_)
            | ExecError::IoError(_)
            | ExecError::ConfigError(_) => ErrorKind::Connect,
        }
    }
}
