//! Catalog of the actions this plugin serves

use serde::{Deserialize, Serialize};
use sshrun_core::config::params;
use sshrun_core::{DEFAULT_PORT, DEFAULT_TIMEOUT_SECS, SSH_CONNECTION};

/// Name of the only action
pub const EXECUTE_ACTION: &str = "execute";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub name: String,
    pub description: String,
    /// Connection whose credentials the action needs
    pub connection: String,
    pub parameters: Vec<ParameterDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub description: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl ParameterDescriptor {
    fn required(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            required: true,
            default: None,
        }
    }

    fn optional(name: &str, description: &str, default: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            required: false,
            default: Some(default.to_string()),
        }
    }
}

/// Describe the `execute` action
#[must_use]
pub fn execute_action() -> ActionDescriptor {
    ActionDescriptor {
        name: EXECUTE_ACTION.to_string(),
        description: "Run a shell command on a remote host over SSH".to_string(),
        connection: SSH_CONNECTION.to_string(),
        parameters: vec![
            ParameterDescriptor::required(params::HOST, "Host to connect to, optionally as host:port"),
            ParameterDescriptor::required(params::COMMAND, "Command to run"),
            ParameterDescriptor::optional(params::PORT, "SSH port", DEFAULT_PORT),
            ParameterDescriptor::optional(
                params::TIMEOUT,
                "Seconds allowed for connecting and running the command",
                DEFAULT_TIMEOUT_SECS,
            ),
        ],
    }
}

/// Every action served
#[must_use]
pub fn actions() -> Vec<ActionDescriptor> {
    vec![execute_action()]
}
