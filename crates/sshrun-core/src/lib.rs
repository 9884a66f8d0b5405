//! sshrun-core: Request validation and the remote execution engine
//!
//! Turns untyped request parameters and credentials into an
//! `ExecutionConfig`, then runs its command sequence through a `RemoteShell`
//! and classifies the outcome.

pub mod config;
pub mod engine;
pub mod error;
pub mod script;
pub mod validate;

pub use config::{
    DEFAULT_PORT, DEFAULT_TIMEOUT, DEFAULT_TIMEOUT_SECS, ExecutionConfig, SSH_CONNECTION,
};
pub use engine::{Engine, ExecutionOutcome, host_port, trim_trailing_newline};
pub use error::ValidationError;
pub use script::{command_sequence, status_guard};
pub use validate::{CredentialSource, Credentials, Parameters};

pub use sshrun_exec::{ErrorKind, ExecError, ProxyHop};
