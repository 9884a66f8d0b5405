//! Remote shell trait

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ExecError;
use crate::result::{CommandResult, SessionTarget};

/// A shell that can run one command per call
///
/// Each call opens its own session, bounds connect and execution together by
/// `timeout`, and closes the session before returning. A non-zero exit is
/// reported through [`CommandResult::status`], not as an error.
#[async_trait]
pub trait RemoteShell: Send + Sync {
    async fn run(
        &self,
        target: &SessionTarget,
        command: &str,
        timeout: Duration,
    ) -> Result<CommandResult, ExecError>;

    fn shell_type(&self) -> &'static str;
}
