//! Confidant command-line interface.

pub mod commands;
pub mod render;

use clap::{Parser, Subcommand};
use confidant_client::ConfidantClient;
use confidant_core::{Config, ConfigError};
use std::path::PathBuf;

/// Confidant - manage services and credentials in a Confidant store
#[derive(Parser)]
#[command(name = "confidant")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = "CONFIDANT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Store base URL, overriding config and environment
    #[arg(long, global = true)]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Manage services and their credentials
    Service(commands::service::ServiceArgs),

    /// Inspect credentials
    Credentials(commands::credentials::CredentialsArgs),

    /// Inspect and provision KMS grants
    Grants(commands::grants::GrantsArgs),

    /// Inspect permitted service roles
    Roles(commands::roles::RolesArgs),

    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Print the identity requests are sent as
    Whoami,
}

impl Cli {
    /// Config from `--config` or the default path, with environment and
    /// `--url` overrides applied. A missing default file yields defaults.
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => match Config::load_default() {
                Ok(config) => config,
                Err(ConfigError::NotFound(_)) => Config::default(),
                Err(e) => return Err(e),
            },
        };

        config.apply_env();
        if let Some(url) = &self.url {
            config.store.url = url.clone();
        }
        Ok(config)
    }

    /// Client for the loaded configuration.
    pub async fn client(&self) -> anyhow::Result<ConfidantClient> {
        connect(&self.load_config()?).await
    }

    /// Path `config init` writes to.
    pub fn config_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => confidant_core::paths::config_file(),
        }
    }
}

/// Build a client from the loaded configuration.
pub async fn connect(config: &Config) -> anyhow::Result<ConfidantClient> {
    ConfidantClient::from_config(config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize client: {}", e))
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Service(args) => commands::service::run(&cli.client().await?, args).await,
        Commands::Credentials(args) => {
            commands::credentials::run(&cli.client().await?, args).await
        }
        Commands::Grants(args) => commands::grants::run(&cli.client().await?, args).await,
        Commands::Roles(args) => commands::roles::run(&cli.client().await?, args).await,
        Commands::Config(args) => commands::config::run(&cli, args),
        Commands::Whoami => commands::whoami::run(&cli.client().await?),
    }
}
