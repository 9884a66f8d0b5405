//! Command-line interface

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sshrun_core::Parameters;
use sshrun_core::config::params;

#[derive(Debug, Parser)]
#[command(name = "sshrun")]
#[command(about = "Run one shell command on a remote host over SSH", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to $SSHRUN_CONFIG, ./sshrun.toml, ...)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a command on a remote host
    #[command(name = "exec")]
    Exec(ExecArgs),
    /// Print the action catalog as JSON
    #[command(name = "actions")]
    Actions,
    /// Report whether credentials can be validated
    #[command(name = "test-credentials")]
    TestCredentials,
}

#[derive(Debug, Args)]
pub struct ExecArgs {
    /// Host to connect to, optionally as host:port
    #[arg(long)]
    pub host: Option<String>,
    /// Command to run
    #[arg(long)]
    pub command: Option<String>,
    /// SSH port (default 22)
    #[arg(long)]
    pub port: Option<String>,
    /// Seconds allowed for connecting and running (default 60)
    #[arg(long)]
    pub timeout: Option<String>,
    /// Credentials file, overriding the configured one
    #[arg(long)]
    pub credentials: Option<PathBuf>,
    /// Run through the local `sh` instead of SSH
    #[arg(long)]
    pub local: bool,
    /// Print the full response as JSON
    #[arg(long)]
    pub json: bool,
}

impl ExecArgs {
    /// Parameters for the `execute` action
    ///
    /// Flags that were not given stay absent, so absent and empty differ.
    #[must_use]
    pub fn parameters(&self) -> Parameters {
        [
            (params::HOST, &self.host),
            (params::COMMAND, &self.command),
            (params::PORT, &self.port),
            (params::TIMEOUT, &self.timeout),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| (name.to_string(), v.clone())))
        .collect()
    }
}
