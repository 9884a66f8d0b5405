//! Execution configuration and its defaults

use std::fmt;
use std::time::Duration;

use sshrun_exec::ProxyHop;

use crate::script;

/// Port used when the request names none
pub const DEFAULT_PORT: u16 = 22;

/// Timeout in seconds used when the request names none
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// [`DEFAULT_TIMEOUT_SECS`] as a duration
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

/// Name of the connection credentials are looked up under
pub const SSH_CONNECTION: &str = "ssh";

/// Request parameter names
pub mod params {
    pub const HOST: &str = "host";
    pub const TIMEOUT: &str = "timeout";
    pub const PORT: &str = "port";
    pub const COMMAND: &str = "command";
}

/// Credential field names
pub mod fields {
    pub const KEY: &str = "key";
    pub const USERNAME: &str = "username";
    pub const PASSPHRASE: &str = "passphrase";
}

/// Everything needed to run one command on one host
///
/// Built once per call and never changed afterwards; the `with_*` methods
/// consume the value and are meant for construction only.
#[derive(Clone)]
pub struct ExecutionConfig {
    host: String,
    port: u16,
    username: String,
    private_key: String,
    passphrase: String,
    timeout: Duration,
    command_sequence: [String; 2],
    proxy: Option<ProxyHop>,
}

impl ExecutionConfig {
    /// Create a config with the default timeout and no passphrase
    ///
    /// `host` may embed a port as `host:port`, which then takes priority
    /// over `port`.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        private_key: impl Into<String>,
        command: &str,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            private_key: private_key.into(),
            passphrase: String::new(),
            timeout: DEFAULT_TIMEOUT,
            command_sequence: script::command_sequence(command),
            proxy: None,
        }
    }

    /// Set the key passphrase
    #[must_use]
    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = passphrase.into();
        self
    }

    /// Set the timeout for the whole run
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Tunnel the session through a jump host
    #[must_use]
    pub fn with_proxy(mut self, proxy: Option<ProxyHop>) -> Self {
        self.proxy = proxy;
        self
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    #[must_use]
    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The user command followed by the exit status guard
    #[must_use]
    pub fn command_sequence(&self) -> &[String; 2] {
        &self.command_sequence
    }

    #[must_use]
    pub fn proxy(&self) -> Option<&ProxyHop> {
        self.proxy.as_ref()
    }

    /// The text submitted to the remote shell
    #[must_use]
    pub fn script(&self) -> String {
        self.command_sequence.join("\n")
    }
}

impl fmt::Debug for ExecutionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("private_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("command_sequence", &self.command_sequence)
            .field("proxy", &self.proxy)
            .finish_non_exhaustive()
    }
}
