//! Configuration management commands.

use clap::Args;
use confidant_core::config::{Config, EncryptorKind};
use confidant_kmsauth::LocalEncryptor;
use console::style;

use crate::{render, Cli};

/// Config command arguments.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (secrets omitted)
    Show,

    /// Write a starter configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,

        /// Use the local encryptor and generate a key for it
        #[arg(long)]
        local_key: bool,
    },

    /// Validate the effective configuration
    Validate,
}

/// Starter configuration; the local variant leaves the key to the environment.
fn starter(local: bool) -> Config {
    let mut config = Config::default();
    config.store.url = "https://confidant.example.com".to_string();
    config.auth.to = "confidant-production".to_string();
    config.auth.from = "my-service".to_string();
    if local {
        config.auth.encryptor = EncryptorKind::Local;
    } else {
        config.auth.key_id = "alias/authnz-production".to_string();
    }
    config
}

/// Run the config command.
pub fn run(cli: &Cli, args: &ConfigArgs) -> anyhow::Result<()> {
    match &args.command {
        ConfigCommand::Show => {
            let config = cli.load_config()?;
            println!("{}", config.to_json5()?);
        }

        ConfigCommand::Init { force, local_key } => {
            let path = cli.config_path()?;

            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists: {:?}. Use --force to overwrite.",
                    path
                );
            }

            starter(*local_key).save(&path)?;
            render::success(format!("Created config file: {}", path.display()));

            if *local_key {
                let key = hex::encode(LocalEncryptor::generate_key());
                eprintln!("  The key is not stored in the config file. Export it before use:");
                println!("export CONFIDANT_LOCAL_KEY={key}");
            }
            eprintln!("  {}", style("Edit store.url and auth.* before connecting.").dim());
        }

        ConfigCommand::Validate => {
            let config = cli.load_config()?;
            match config.validate() {
                Ok(()) => render::success("Configuration is valid"),
                Err(e) => anyhow::bail!("{}", e),
            }
        }
    }

    Ok(())
}
