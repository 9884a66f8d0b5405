//! Remote execution engine

use sshrun_exec::{CommandResult, ExecError, RemoteShell, SessionTarget};
use tracing::{error, info, instrument};

use crate::config::ExecutionConfig;

/// Result of one [`Engine::exec`] call
///
/// Output is already trimmed of one trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Zero exit, stdout only
    Success { output: String },
    /// Transport failure or non-zero exit, stdout and stderr combined
    Failure { output: String, cause: ExecError },
}

impl ExecutionOutcome {
    fn failure(cause: ExecError) -> Self {
        ExecutionOutcome::Failure {
            output: String::new(),
            cause,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success { .. })
    }

    #[must_use]
    pub fn output(&self) -> &str {
        match self {
            ExecutionOutcome::Success { output } | ExecutionOutcome::Failure { output, .. } => {
                output
            }
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&ExecError> {
        match self {
            ExecutionOutcome::Success { .. } => None,
            ExecutionOutcome::Failure { cause, .. } => Some(cause),
        }
    }

    /// Split into output and optional error
    #[must_use]
    pub fn into_parts(self) -> (String, Option<ExecError>) {
        match self {
            ExecutionOutcome::Success { output } => (output, None),
            ExecutionOutcome::Failure { output, cause } => (output, Some(cause)),
        }
    }
}

/// Runs an [`ExecutionConfig`] through a [`RemoteShell`]
///
/// Holds no per-call state, so one engine can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct Engine<S> {
    shell: S,
}

impl<S: RemoteShell> Engine<S> {
    pub fn new(shell: S) -> Self {
        Self { shell }
    }

    /// The transport this engine runs on
    pub fn shell(&self) -> &S {
        &self.shell
    }

    /// Run the configured command sequence once
    ///
    /// Never retries. Every transport error and every non-zero exit ends up
    /// in [`ExecutionOutcome::Failure`].
    #[instrument(skip_all, fields(host = %config.host(), shell = self.shell.shell_type()))]
    pub async fn exec(&self, config: &ExecutionConfig) -> ExecutionOutcome {
        if config.host().is_empty() {
            return ExecutionOutcome::failure(ExecError::MissingHost);
        }
        if config.private_key().is_empty() {
            return ExecutionOutcome::failure(ExecError::MissingCredential);
        }

        let (host, port) = host_port(config.host(), config.port());
        let Ok(port) = port.parse::<u16>() else {
            return ExecutionOutcome::failure(ExecError::ConfigError(format!(
                "invalid port {port:?} in host {:?}",
                config.host()
            )));
        };

        let target = SessionTarget {
            host: host.to_string(),
            port,
            user: config.username().to_string(),
            key: config.private_key().to_string(),
            passphrase: config.passphrase().to_string(),
            proxy: config.proxy().cloned(),
        };
        let script = config.script();

        info!(target = %target, command = ?config.command_sequence(), "running SSH command");

        let result = self.shell.run(&target, &script, config.timeout()).await;
        let outcome = classify(result);

        match outcome.error() {
            None => info!(output = %outcome.output(), "SSH command succeeded"),
            Some(e) => error!(kind = %e.kind(), error = %e, output = %outcome.output(), "SSH command failed"),
        }
        outcome
    }
}

fn classify(result: Result<CommandResult, ExecError>) -> ExecutionOutcome {
    match result {
        Ok(result) if result.success() => ExecutionOutcome::Success {
            output: trim_trailing_newline(&result.stdout).to_string(),
        },
        Ok(result) => ExecutionOutcome::Failure {
            output: trim_trailing_newline(&result.combined_output()).to_string(),
            cause: ExecError::CommandFailed {
                status: result.status,
                stderr: result.stderr,
            },
        },
        // No output was captured, so stdout and stderr joined is a lone
        // newline, which trims to nothing
        Err(e) => ExecutionOutcome::failure(e),
    }
}

/// Split `host:port`, falling back to the configured port
///
/// Splits on the first `:` only; whatever follows it is the port text.
#[must_use]
pub fn host_port(host: &str, port: u16) -> (&str, String) {
    match host.split_once(':') {
        Some((host, port)) => (host, port.to_string()),
        None => (host, port.to_string()),
    }
}

/// Strip exactly one trailing `\n`, if present
#[must_use]
pub fn trim_trailing_newline(output: &str) -> &str {
    output.strip_suffix('\n').unwrap_or(output)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_host_port_embedded_port_wins() {
        assert_eq!(host_port("a.b.c:2222", 22), ("a.b.c", "2222".to_string()));
    }

    #[test]
    fn test_host_port_uses_configured_port() {
        assert_eq!(host_port("a.b.c", 22), ("a.b.c", "22".to_string()));
        assert_eq!(host_port("a.b.c", 2200), ("a.b.c", "2200".to_string()));
    }

    #[test]
    fn test_host_port_splits_on_first_colon() {
        assert_eq!(host_port("h:1:2", 22), ("h", "1:2".to_string()));
        assert_eq!(host_port("h:", 22), ("h", String::new()));
    }

    #[test]
    fn test_trim_trailing_newline() {
        assert_eq!(trim_trailing_newline("hi\n"), "hi");
        assert_eq!(trim_trailing_newline("hi"), "hi");
        assert_eq!(trim_trailing_newline("hi\n\n"), "hi\n");
        assert_eq!(trim_trailing_newline("hi \t"), "hi \t");
        assert_eq!(trim_trailing_newline("hi\r\n"), "hi\r");
        assert_eq!(trim_trailing_newline(""), "");
    }

    fn result(stdout: &str, stderr: &str, status: i32) -> CommandResult {
        CommandResult {
            status,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn test_classify_success_drops_stderr() {
        let outcome = classify(Ok(result("hi\n", "warning\n", 0)));
        assert_eq!(
            outcome,
            ExecutionOutcome::Success {
                output: "hi".to_string()
            }
        );
    }

    #[test]
    fn test_classify_non_zero_exit_combines_output() {
        let outcome = classify(Ok(result("partial\n", "boom\n", 3)));
        let (output, error) = outcome.into_parts();

        assert_eq!(output, "partial\n\nboom");
        assert_eq!(
            error,
            Some(ExecError::CommandFailed {
                status: 3,
                stderr: "boom\n".to_string()
            })
        );
    }

    #[test]
    fn test_classify_transport_error() {
        let outcome = classify(Err(ExecError::ConnectionFailed("refused".into())));

        assert!(!outcome.is_success());
        assert_eq!(outcome.output(), "");
        assert_eq!(
            outcome.error(),
            Some(&ExecError::ConnectionFailed("refused".into()))
        );
    }
}
