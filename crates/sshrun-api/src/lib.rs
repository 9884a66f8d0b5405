//! sshrun-api: Action dispatch boundary
//!
//! Contains the action catalog, the request/response envelopes, and the
//! `Plugin` that routes a named action to the execution engine.

pub mod catalog;
pub mod error;
pub mod plugin;
pub mod requests;
pub mod responses;

pub use catalog::{ActionDescriptor, EXECUTE_ACTION, ParameterDescriptor};
pub use error::{ActionError, DispatchError};
pub use plugin::Plugin;
pub use requests::ActionRequest;
pub use responses::{ActionResponse, CredentialsValidation};
