//! Credential commands.

use clap::Args;
use confidant_client::ConfidantClient;
use serde_json::Value;

use crate::render;

/// Credentials command arguments.
#[derive(Args)]
pub struct CredentialsArgs {
    #[command(subcommand)]
    pub command: CredentialsCommand,
}

#[derive(clap::Subcommand)]
pub enum CredentialsCommand {
    /// List all credentials (pair values are withheld)
    List,

    /// Resolve credential names to IDs
    Find {
        /// Credential names
        #[arg(required = true)]
        names: Vec<String>,
    },
}

/// Run the credentials command.
pub async fn run(client: &ConfidantClient, args: &CredentialsArgs) -> anyhow::Result<()> {
    let credentials = match &args.command {
        CredentialsCommand::List => client.list_credentials().await?,
        CredentialsCommand::Find { names } => client.find_credentials_by_name(names).await?,
    };

    let views: Vec<Value> = credentials.iter().map(render::credential_view).collect();
    render::print_json(&Value::Array(views))
}
