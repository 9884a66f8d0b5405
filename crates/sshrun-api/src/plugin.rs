//! Routes named actions to the execution engine

use std::sync::Arc;

use sshrun_core::{CredentialSource, Engine, ExecutionConfig, Parameters, ProxyHop};
use sshrun_exec::RemoteShell;
use tracing::{debug, error, info, instrument};

use crate::catalog::{self, ActionDescriptor, EXECUTE_ACTION};
use crate::error::{ActionError, DispatchError};
use crate::requests::ActionRequest;
use crate::responses::{ActionResponse, CredentialsValidation};

/// SSH plugin: one engine, one credential source, an optional jump host
pub struct Plugin<S> {
    engine: Engine<S>,
    credentials: Arc<dyn CredentialSource>,
    proxy: Option<ProxyHop>,
}

impl<S: RemoteShell> Plugin<S> {
    pub fn new(shell: S, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            engine: Engine::new(shell),
            credentials,
            proxy: None,
        }
    }

    /// Tunnel every session through this jump host
    #[must_use]
    pub fn with_proxy(mut self, proxy: Option<ProxyHop>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn engine(&self) -> &Engine<S> {
        &self.engine
    }

    /// Actions this plugin serves
    #[must_use]
    pub fn actions(&self) -> Vec<ActionDescriptor> {
        catalog::actions()
    }

    /// Credentials cannot be checked without running something
    #[must_use]
    pub fn test_credentials(&self) -> CredentialsValidation {
        CredentialsValidation {
            are_credentials_valid: true,
            raw_validation_response: "credentials validation is not supported on this plugin"
                .to_string(),
        }
    }

    /// Run the named action
    ///
    /// Failures of the action itself come back as an `ActionResponse` with a
    /// non-zero `error_code`.
    ///
    /// # Errors
    /// Returns `DispatchError::UnsupportedAction` for unknown action names
    #[instrument(skip_all, fields(action = %request.name))]
    pub async fn execute_action(
        &self,
        request: &ActionRequest,
    ) -> Result<ActionResponse, DispatchError> {
        debug!(parameters = ?request.parameters, "executing action");

        let (output, result) = match request.name.as_str() {
            EXECUTE_ACTION => self.execute(&request.parameters).await,
            other => return Err(DispatchError::UnsupportedAction(other.to_string())),
        };

        Ok(match result {
            Ok(()) => ActionResponse::success(output),
            Err(e) => {
                let message = format!("error: {e}, output: {output}");
                error!("{message}");
                ActionResponse::failure(message)
            }
        })
    }

    async fn execute(&self, parameters: &Parameters) -> (String, Result<(), ActionError>) {
        let config = match ExecutionConfig::from_request(parameters, self.credentials.as_ref()) {
            Ok(config) => config.with_proxy(self.proxy.clone()),
            Err(e) => return (String::new(), Err(e.into())),
        };

        info!(command = ?config.command_sequence(), "about to run SSH command");
        let (output, error) = self.engine.exec(&config).await.into_parts();

        match error {
            None => (output, Ok(())),
            Some(e) => (output, Err(e.into())),
        }
    }
}
