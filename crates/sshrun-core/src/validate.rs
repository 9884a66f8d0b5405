//! Request validation
//!
//! The only place untyped request data is coerced. Rules are applied in a
//! fixed order and the first failure wins.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::config::{
    DEFAULT_PORT, DEFAULT_TIMEOUT_SECS, ExecutionConfig, SSH_CONNECTION, fields, params,
};
use crate::error::ValidationError;

/// Request parameters by name
pub type Parameters = HashMap<String, String>;

/// Decrypted credential fields of one connection
pub type Credentials = HashMap<String, Value>;

/// Lookup of credentials by connection name
pub trait CredentialSource: Send + Sync {
    /// Credentials of the named connection, `None` when there are none
    fn credentials(&self, connection: &str) -> Option<Credentials>;
}

impl CredentialSource for HashMap<String, Credentials> {
    fn credentials(&self, connection: &str) -> Option<Credentials> {
        self.get(connection).cloned()
    }
}

impl ExecutionConfig {
    /// Build a config from request parameters and the `ssh` connection
    ///
    /// # Errors
    /// Returns the first `ValidationError` in this order: host, timeout,
    /// port, command, connection, key, username
    pub fn from_request(
        parameters: &Parameters,
        source: &dyn CredentialSource,
    ) -> Result<Self, ValidationError> {
        let host = non_empty_param(parameters, params::HOST).ok_or(ValidationError::MissingHost)?;

        let timeout_secs = match parameters.get(params::TIMEOUT) {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| ValidationError::InvalidTimeout(raw.clone()))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let port = match parameters.get(params::PORT) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ValidationError::InvalidPort(raw.clone()))?,
            None => DEFAULT_PORT,
        };

        let command =
            non_empty_param(parameters, params::COMMAND).ok_or(ValidationError::MissingCommand)?;

        let credentials = source
            .credentials(SSH_CONNECTION)
            .ok_or(ValidationError::MissingConnection)?;

        let key = non_empty_field(&credentials, fields::KEY).ok_or(ValidationError::MissingKey)?;
        let username =
            non_empty_field(&credentials, fields::USERNAME).ok_or(ValidationError::MissingUsername)?;
        let passphrase = credentials
            .get(fields::PASSPHRASE)
            .and_then(Value::as_str)
            .unwrap_or_default();

        debug!(host, port, timeout_secs, user = username, "validated execution request");

        Ok(ExecutionConfig::new(host, port, username, key, command)
            .with_passphrase(passphrase)
            .with_timeout(Duration::from_secs(timeout_secs)))
    }
}

fn non_empty_param<'a>(parameters: &'a Parameters, name: &str) -> Option<&'a str> {
    parameters
        .get(name)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

fn non_empty_field<'a>(credentials: &'a Credentials, name: &str) -> Option<&'a str> {
    credentials
        .get(name)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}
