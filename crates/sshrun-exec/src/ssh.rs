//! SSH command execution using russh crate

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use russh::keys::{PrivateKey, PrivateKeyWithHashAlg, ssh_key};
use russh::{ChannelMsg, Disconnect, client};
use tokio::time::timeout_at;
use tracing::{debug, error, info, instrument, warn};

use crate::error::ExecError;
use crate::keys::decode_private_key;
use crate::result::{CommandResult, ProxyHop, SessionTarget};
use crate::traits::RemoteShell;

/// Originator reported to the jump host for the forwarded channel
const FORWARD_ORIGINATOR: &str = "127.0.0.1";

/// Stand-in deadline for timeouts too large to add to the clock (~30 years)
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// SSH client handler for russh
#[derive(Debug)]
struct SshClientHandler;

impl client::Handler for SshClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> Result<bool, Self::Error> {
        // No known_hosts verification, like StrictHostKeyChecking=no
        debug!(algorithm = %server_public_key.algorithm(), "accepting server host key");
        Ok(true)
    }
}

type Session = client::Handle<SshClientHandler>;

/// An authenticated session plus the jump session carrying it, if any
struct Connected {
    session: Session,
    jump: Option<Session>,
}

impl Connected {
    /// Tear down the session, then the jump session
    async fn close(self) {
        disconnect(self.session, "target").await;
        if let Some(jump) = self.jump {
            disconnect(jump, "proxy").await;
        }
    }
}

async fn disconnect(session: Session, role: &'static str) {
    if let Err(e) = session
        .disconnect(Disconnect::ByApplication, "", "English")
        .await
    {
        warn!(role, error = %e, "failed to disconnect SSH session");
    } else {
        debug!(role, "SSH session closed");
    }
}

/// SSH remote shell
///
/// Every [`RemoteShell::run`] call opens a fresh session, runs one command
/// and disconnects. Nothing is pooled.
#[derive(Clone)]
pub struct SshShell {
    config: Arc<client::Config>,
}

impl std::fmt::Debug for SshShell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshShell").finish_non_exhaustive()
    }
}

impl SshShell {
    /// Create a new SSH shell with default client settings
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Arc::new(client::Config::default()),
        }
    }

    /// Connect and authenticate, through the jump host when one is set
    #[instrument(skip_all, fields(target = %target))]
    async fn connect(&self, target: &SessionTarget) -> Result<Connected, ExecError> {
        let key = decode_private_key(&target.key, &target.passphrase)
            .map_err(|e| ExecError::SshKeyError(e.to_string()))?;

        let Some(hop) = &target.proxy else {
            info!(
                host = %target.host,
                port = target.port,
                user = %target.user,
                "connecting to SSH"
            );
            let mut session = client::connect(
                self.config.clone(),
                (target.host.as_str(), target.port),
                SshClientHandler,
            )
            .await
            .map_err(|e| ExecError::ConnectionFailed(e.to_string()))?;

            if let Err(e) = authenticate(&mut session, &target.user, key).await {
                disconnect(session, "target").await;
                return Err(e);
            }

            info!(host = %target.host, "SSH connected and authenticated");
            return Ok(Connected {
                session,
                jump: None,
            });
        };

        let jump = self.connect_jump(hop).await?;
        match self.connect_through(&jump, target, key).await {
            Ok(session) => {
                info!(host = %target.host, proxy = %hop.host, "SSH connected through proxy");
                Ok(Connected {
                    session,
                    jump: Some(jump),
                })
            }
            Err(e) => {
                disconnect(jump, "proxy").await;
                Err(e)
            }
        }
    }

    async fn connect_jump(&self, hop: &ProxyHop) -> Result<Session, ExecError> {
        info!(
            host = %hop.host,
            port = hop.port,
            user = %hop.user,
            "connecting to SSH proxy"
        );

        let key = decode_private_key(&hop.key, &hop.passphrase)
            .map_err(|e| ExecError::SshKeyError(format!("proxy: {e}")))?;

        let mut jump = client::connect(
            self.config.clone(),
            (hop.host.as_str(), hop.port),
            SshClientHandler,
        )
        .await
        .map_err(|e| ExecError::ConnectionFailed(format!("proxy {}: {e}", hop.host)))?;

        if let Err(e) = authenticate(&mut jump, &hop.user, key).await {
            disconnect(jump, "proxy").await;
            return Err(e);
        }
        Ok(jump)
    }

    async fn connect_through(
        &self,
        jump: &Session,
        target: &SessionTarget,
        key: PrivateKey,
    ) -> Result<Session, ExecError> {
        let channel = jump
            .channel_open_direct_tcpip(
                target.host.clone(),
                u32::from(target.port),
                FORWARD_ORIGINATOR,
                0,
            )
            .await
            .map_err(|e| ExecError::ConnectionFailed(format!("proxy forward: {e}")))?;

        let mut session =
            client::connect_stream(self.config.clone(), channel.into_stream(), SshClientHandler)
                .await
                .map_err(|e| ExecError::ConnectionFailed(e.to_string()))?;

        if let Err(e) = authenticate(&mut session, &target.user, key).await {
            disconnect(session, "target").await;
            return Err(e);
        }
        Ok(session)
    }
}

impl Default for SshShell {
    fn default() -> Self {
        Self::new()
    }
}

async fn authenticate(session: &mut Session, user: &str, key: PrivateKey) -> Result<(), ExecError> {
    let hash_alg = session
        .best_supported_rsa_hash()
        .await
        .ok()
        .flatten()
        .flatten();
    let auth_res = session
        .authenticate_publickey(user, PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg))
        .await
        .map_err(|e| ExecError::AuthenticationFailed(e.to_string()))?;

    if !auth_res.success() {
        return Err(ExecError::AuthenticationFailed(
            "public key authentication failed".to_string(),
        ));
    }
    Ok(())
}

/// Run one command on an authenticated session and collect its output
async fn execute_remote(session: &Session, cmd: &str) -> Result<CommandResult, ExecError> {
    let start = Instant::now();

    let mut channel = session
        .channel_open_session()
        .await
        .map_err(|e| ExecError::IoError(e.to_string()))?;

    channel
        .exec(true, cmd)
        .await
        .map_err(|e| ExecError::IoError(e.to_string()))?;

    let mut status = -1;
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();

    // Exit status may arrive after EOF, so drain until the channel closes
    while let Some(msg) = channel.wait().await {
        match msg {
            ChannelMsg::Data { data } => {
                stdout.extend_from_slice(&data);
            }
            ChannelMsg::ExtendedData { data, ext } => {
                if ext == 1 {
                    stderr.extend_from_slice(&data);
                }
            }
            ChannelMsg::ExitStatus { exit_status } => {
                status = exit_status.cast_signed();
            }
            ChannelMsg::ExitSignal { signal_name, .. } => {
                warn!(signal = ?signal_name, "remote process killed by signal");
            }
            _ => {}
        }
    }

    let duration = start.elapsed();
    let stdout = String::from_utf8_lossy(&stdout).to_string();
    let stderr = String::from_utf8_lossy(&stderr).to_string();

    debug!(status, duration = ?duration, "remote command completed");

    Ok(CommandResult {
        status,
        stdout,
        stderr,
        duration,
    })
}

/// Instant `timeout` from now, clamped when the addition would overflow
fn deadline_after(timeout: Duration) -> tokio::time::Instant {
    let now = tokio::time::Instant::now();
    now.checked_add(timeout).unwrap_or_else(|| now + FAR_FUTURE)
}

#[async_trait]
impl RemoteShell for SshShell {
    #[instrument(skip(self, target, cmd), fields(target = %target))]
    async fn run(
        &self,
        target: &SessionTarget,
        cmd: &str,
        timeout_duration: Duration,
    ) -> Result<CommandResult, ExecError> {
        let start = Instant::now();
        let deadline = deadline_after(timeout_duration);

        debug!(command = %cmd, timeout = ?timeout_duration, "executing with timeout");

        let Ok(connected) = timeout_at(deadline, self.connect(target)).await else {
            error!(
                timeout = ?timeout_duration,
                elapsed = ?start.elapsed(),
                "SSH connect timed out"
            );
            return Err(ExecError::Timeout {
                timeout: timeout_duration,
            });
        };
        let connected = connected?;

        let result = timeout_at(deadline, execute_remote(&connected.session, cmd)).await;
        connected.close().await;

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
        "ssh"
    }
}
