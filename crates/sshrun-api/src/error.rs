//! Error types for sshrun-api

use sshrun_core::{ExecError, ValidationError};
use thiserror::Error;

/// The request could not be routed to a handler
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("action is not supported: {0}")]
    UnsupportedAction(String),
}

/// Why an action failed, before it is folded into an `ActionResponse`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Exec(#[from] ExecError),
}
