//! sshrun-exec: Remote shell transport
//!
//! Provides the `RemoteShell` trait and its implementations for running a
//! command over SSH (russh) or through the local `sh`.

pub mod error;
pub mod keys;
pub mod local;
pub mod result;
pub mod ssh;
pub mod traits;

pub use error::{ErrorKind, ExecError};
pub use keys::{KeyError, decode_private_key};
pub use local::LocalShell;
pub use result::{CommandResult, ProxyHop, SessionTarget};
pub use ssh::SshShell;
pub use traits::RemoteShell;
