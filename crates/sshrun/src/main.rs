//! sshrun
//!
//! Runs one shell command on a remote host over SSH and reports its output
//! and status.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use sshrun_api::{ActionRequest, ActionResponse, EXECUTE_ACTION, Plugin, catalog};
use sshrun_core::CredentialSource;
use sshrun_exec::{LocalShell, RemoteShell, SshShell};

mod cli;
mod config;
mod credentials;
mod logging;

use cli::{Cli, Commands, ExecArgs};
use config::Config;
use credentials::FileCredentialStore;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    logging::init(&config.log)?;

    match cli.command {
        Commands::Actions => {
            println!("{}", serde_json::to_string_pretty(&catalog::actions())?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::TestCredentials => {
            let plugin = Plugin::new(LocalShell::new(), Arc::new(FileCredentialStore::default()));
            println!("{}", serde_json::to_string_pretty(&plugin.test_credentials())?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Exec(args) => exec(&config, &args).await,
    }
}

async fn exec(config: &Config, args: &ExecArgs) -> Result<ExitCode> {
    let credentials_path = args.credentials.as_ref().or(config.credentials.as_ref());
    let store: Arc<dyn CredentialSource> = match credentials_path {
        Some(path) => Arc::new(FileCredentialStore::load(path)?),
        None => {
            tracing::warn!("no credentials file configured");
            Arc::new(FileCredentialStore::default())
        }
    };

    let request = ActionRequest {
        name: EXECUTE_ACTION.to_string(),
        parameters: args.parameters(),
    };

    let response = if args.local {
        dispatch(Plugin::new(LocalShell::new(), store), config, &request).await?
    } else {
        dispatch(Plugin::new(SshShell::new(), store), config, &request).await?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else if response.is_success() {
        println!("{}", response.result);
    } else {
        eprintln!("{}", response.result);
    }

    Ok(match u8::try_from(response.error_code) {
        Ok(code) => ExitCode::from(code),
        Err(_) => ExitCode::FAILURE,
    })
}

async fn dispatch<S: RemoteShell>(
    plugin: Plugin<S>,
    config: &Config,
    request: &ActionRequest,
) -> Result<ActionResponse> {
    let plugin = plugin.with_proxy(config.proxy.clone());
    Ok(plugin.execute_action(request).await?)
}
