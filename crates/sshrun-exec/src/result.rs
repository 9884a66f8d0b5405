//! Result and connection types for command execution

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Result of a command execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    /// Exit status code (0 for success, -1 when the remote reported none)
    pub status: i32,
    /// stdout output
    pub stdout: String,
    /// stderr output
    pub stderr: String,
    /// Time taken to execute
    pub duration: Duration,
}

impl CommandResult {
    /// Check if command succeeded (exit code 0)
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// stdout and stderr joined by a newline
    ///
    /// The separator is always present, even when stderr is empty.
    #[must_use]
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Fully resolved parameters for one SSH session
#[derive(Clone)]
pub struct SessionTarget {
    /// Host address
    pub host: String,
    /// Port
    pub port: u16,
    /// Username
    pub user: String,
    /// Private key text (PEM/OpenSSH or base64 of either)
    pub key: String,
    /// Key passphrase, empty for an unencrypted key
    pub passphrase: String,
    /// Optional jump host
    pub proxy: Option<ProxyHop>,
}

impl fmt::Debug for SessionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("key", &"<redacted>")
            .field("proxy", &self.proxy)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for SessionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.user, self.host, self.port)
    }
}

/// Intermediary SSH server the session is tunnelled through
#[derive(Clone, Serialize, Deserialize)]
pub struct ProxyHop {
    /// Jump host address
    pub host: String,
    /// Jump host port (default 22)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Username on the jump host
    pub user: String,
    /// Private key text for the jump host
    pub key: String,
    /// Key passphrase
    #[serde(default)]
    pub passphrase: String,
}

fn default_port() -> u16 {
    22
}

impl fmt::Debug for ProxyHop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyHop")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}
