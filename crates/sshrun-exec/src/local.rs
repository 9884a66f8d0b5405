//! Local command execution using `tokio::process`

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error, instrument};

use crate::error::ExecError;
use crate::result::{CommandResult, SessionTarget};
use crate::traits::RemoteShell;

/// Local shell
///
/// Runs the command text with `sh -c` on this machine and ignores the
/// session target. Useful for trying a command sequence without a server.
#[derive(Debug, Clone, Default)]
pub struct LocalShell;

impl LocalShell {
    /// Create a new local shell
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self), level = "debug")]
    async fn execute(&self, cmd: &str) -> Result<CommandResult, ExecError> {
        let start = Instant::now();

        let child = Command::new("sh")
            .arg("-c")
            .arg(cmd)
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExecError::SpawnError(e.to_string()))?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ExecError::IoError(e.to_string()))?;

        let duration = start.elapsed();

        let status = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        debug!(status, duration = ?duration, "command completed");

        Ok(CommandResult {
            status,
            stdout,
            stderr,
            duration,
        })
    }
}

#[async_trait]
impl RemoteShell for LocalShell {
    #[instrument(skip(self, _target), level = "debug")]
    async fn run(
        &self,
        _target: &SessionTarget,
        cmd: &str,
        timeout_duration: Duration,
    ) -> Result<CommandResult, ExecError> {
        let start = Instant::now();

        // Dropping the timed-out future kills the child
        let result = timeout(timeout_duration, self.execute(cmd)).await;

        result.unwrap_or_else(|_| {
            error!(
                command = %cmd,
                timeout = ?timeout_duration,
                elapsed = ?start.elapsed(),
                "command timed out"
            );
            Err(ExecError::Timeout {
                timeout: timeout_duration,
            })
        })
    }

    fn shell_type(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> SessionTarget {
        SessionTarget {
            host: "localhost".to_string(),
            port: 22,
            user: "ops".to_string(),
            key: String::new(),
            passphrase: String::new(),
            proxy: None,
        }
    }

    async fn run(cmd: &str) -> Result<CommandResult, ExecError> {
        LocalShell::new()
            .run(&target(), cmd, Duration::from_secs(10))
            .await
    }

    #[tokio::test]
    async fn test_run_success() {
        let result = run("echo hello").await.unwrap();

        assert!(result.success());
        assert_eq!(result.stdout, "hello\n");
    }

    #[tokio::test]
    async fn test_run_failure_is_not_an_error() {
        let result = run("exit 42").await.unwrap();

        assert!(!result.success());
        assert_eq!(result.status, 42);
    }

    #[tokio::test]
    async fn test_run_timeout() {
        let result = LocalShell::new()
            .run(&target(), "sleep 5", Duration::from_millis(100))
            .await;

        assert!(matches!(result, Err(ExecError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_run_with_stderr() {
        let result = run("echo error >&2").await.unwrap();

        assert!(result.success());
        assert_eq!(result.stderr, "error\n");
    }
}
