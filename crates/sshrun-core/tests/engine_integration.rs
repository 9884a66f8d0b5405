use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use sshrun_core::*;
use sshrun_exec::{CommandResult, LocalShell, RemoteShell, SessionTarget};

#[derive(Debug, Clone)]
struct Call {
    target: SessionTarget,
    command: String,
    timeout: Duration,
}

/// Records every call and answers with a canned response
struct MockShell {
    response: Result<CommandResult, ExecError>,
    calls: Mutex<Vec<Call>>,
}

impl MockShell {
    fn replying(stdout: &str, stderr: &str, status: i32) -> Self {
        Self::with_response(Ok(CommandResult {
            status,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            duration: Duration::from_millis(1),
        }))
    }

    fn with_response(response: Result<CommandResult, ExecError>) -> Self {
        Self {
            response,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteShell for MockShell {
    async fn run(
        &self,
        target: &SessionTarget,
        command: &str,
        timeout: Duration,
    ) -> Result<CommandResult, ExecError> {
        self.calls.lock().unwrap().push(Call {
            target: target.clone(),
            command: command.to_string(),
            timeout,
        });
        self.response.clone()
    }

    fn shell_type(&self) -> &'static str {
        "mock"
    }
}

fn request(pairs: &[(&str, &str)]) -> ExecutionConfig {
    let parameters: Parameters = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    let credentials: Credentials = [
        ("key".to_string(), json!("<valid-key>")),
        ("username".to_string(), json!("ops")),
    ]
    .into_iter()
    .collect();
    let store = HashMap::from([(SSH_CONNECTION.to_string(), credentials)]);

    ExecutionConfig::from_request(&parameters, &store).unwrap()
}

#[tokio::test]
async fn test_echo_scenario() {
    let engine = Engine::new(MockShell::replying("hi\n", "", 0));
    let config = request(&[("host", "10.0.0.5"), ("command", "echo hi")]);

    let (output, error) = engine.exec(&config).await.into_parts();

    assert_eq!(output, "hi");
    assert!(error.is_none());

    let calls = engine.shell().calls();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(call.target.host, "10.0.0.5");
    assert_eq!(call.target.port, 22);
    assert_eq!(call.target.user, "ops");
    assert_eq!(call.target.key, "<valid-key>");
    assert_eq!(call.target.passphrase, "");
    assert!(call.target.proxy.is_none());
    assert_eq!(call.command, format!("echo hi\n{}", status_guard()));
    assert_eq!(call.timeout, DEFAULT_TIMEOUT);
}

#[tokio::test]
async fn test_embedded_port_overrides_port_parameter() {
    let engine = Engine::new(MockShell::replying("", "", 0));
    let config = request(&[("host", "a.b.c:2222"), ("port", "22"), ("command", "true")]);

    engine.exec(&config).await;

    let call = &engine.shell().calls()[0];
    assert_eq!(call.target.host, "a.b.c");
    assert_eq!(call.target.port, 2222);
}

#[tokio::test]
async fn test_port_and_timeout_parameters_reach_transport() {
    let engine = Engine::new(MockShell::replying("", "", 0));
    let config = request(&[
        ("host", "a.b.c"),
        ("port", "2200"),
        ("timeout", "5"),
        ("command", "true"),
    ]);

    engine.exec(&config).await;

    let call = &engine.shell().calls()[0];
    assert_eq!(call.target.port, 2200);
    assert_eq!(call.timeout, Duration::from_secs(5));
}

#[tokio::test]
async fn test_invalid_embedded_port_never_reaches_transport() {
    let engine = Engine::new(MockShell::replying("", "", 0));
    let config = request(&[("host", "a.b.c:ssh"), ("command", "true")]);

    let outcome = engine.exec(&config).await;

    assert!(matches!(outcome.error(), Some(ExecError::ConfigError(_))));
    assert_eq!(outcome.error().map(ExecError::kind), Some(ErrorKind::Connect));
    assert!(engine.shell().calls().is_empty());
}

#[tokio::test]
async fn test_pre_checks_guard_direct_callers() {
    let engine = Engine::new(MockShell::replying("", "", 0));

    let no_host = ExecutionConfig::new("", 22, "ops", "KEY", "true");
    let outcome = engine.exec(&no_host).await;
    assert_eq!(outcome.error(), Some(&ExecError::MissingHost));

    let no_key = ExecutionConfig::new("h", 22, "ops", "", "true");
    let outcome = engine.exec(&no_key).await;
    assert_eq!(outcome.error(), Some(&ExecError::MissingCredential));

    assert!(engine.shell().calls().is_empty());
}

#[tokio::test]
async fn test_proxy_is_passed_through() {
    let engine = Engine::new(MockShell::replying("", "", 0));
    let proxy = ProxyHop {
        host: "bastion".to_string(),
        port: 2022,
        user: "jump".to_string(),
        key: "JUMP-KEY".to_string(),
        passphrase: String::new(),
    };
    let config = request(&[("host", "10.0.0.5"), ("command", "true")]).with_proxy(Some(proxy));

    engine.exec(&config).await;

    let call = &engine.shell().calls()[0];
    let hop = call.target.proxy.as_ref().unwrap();
    assert_eq!(hop.host, "bastion");
    assert_eq!(hop.port, 2022);
}

#[tokio::test]
async fn test_non_zero_exit_returns_combined_output() {
    let engine = Engine::new(MockShell::replying("", "", 3));
    let config = request(&[("host", "10.0.0.5"), ("command", "exit 3")]);

    let outcome = engine.exec(&config).await;

    assert_eq!(outcome.output(), "");
    let error = outcome.error().unwrap();
    assert_eq!(error.kind(), ErrorKind::RemoteExecution);
    assert!(matches!(error, ExecError::CommandFailed { status: 3, .. }));
}

#[tokio::test]
async fn test_transport_errors_are_surfaced_once() {
    for cause in [
        ExecError::ConnectionFailed("connection refused".to_string()),
        ExecError::AuthenticationFailed("public key authentication failed".to_string()),
        ExecError::Timeout {
            timeout: Duration::from_secs(1),
        },
    ] {
        let engine = Engine::new(MockShell::with_response(Err(cause.clone())));
        let config = request(&[("host", "10.0.0.5"), ("command", "uptime")]);

        let (output, error) = engine.exec(&config).await.into_parts();

        assert_eq!(output, "");
        assert_eq!(error, Some(cause));
        assert_eq!(engine.shell().calls().len(), 1, "no retries");
    }
}

#[tokio::test]
async fn test_guard_propagates_exit_status_through_sh() {
    let engine = Engine::new(LocalShell::new());
    let config = request(&[("host", "localhost"), ("command", "echo out; echo err >&2; exit 3")]);

    let (output, error) = engine.exec(&config).await.into_parts();

    assert_eq!(output, "out\n\nerr");
    assert!(matches!(
        error,
        Some(ExecError::CommandFailed { status: 3, .. })
    ));
}

#[tokio::test]
async fn test_guard_catches_failure_of_last_statement() {
    let engine = Engine::new(LocalShell::new());
    let config = request(&[("host", "localhost"), ("command", "echo before\nfalse")]);

    let outcome = engine.exec(&config).await;

    assert_eq!(outcome.output(), "before\n");
    assert!(matches!(
        outcome.error(),
        Some(ExecError::CommandFailed { status: 1, .. })
    ));
}

#[tokio::test]
async fn test_guard_is_silent_on_success() {
    let engine = Engine::new(LocalShell::new());
    let config = request(&[("host", "localhost"), ("command", "printf 'a\\n\\n'")]);

    let outcome = engine.exec(&config).await;

    assert_eq!(
        outcome,
        ExecutionOutcome::Success {
            output: "a\n".to_string()
        }
    );
}

#[tokio::test]
async fn test_timeout_through_sh() {
    let engine = Engine::new(LocalShell::new());
    let config = request(&[("host", "localhost"), ("command", "sleep 5")])
        .with_timeout(Duration::from_millis(100));

    let outcome = engine.exec(&config).await;

    assert_eq!(outcome.error().map(ExecError::kind), Some(ErrorKind::Timeout));
}
