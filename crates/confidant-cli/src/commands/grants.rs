//! Grant commands.

use clap::Args;
use confidant_client::ConfidantClient;

use crate::render;

/// Grants command arguments.
#[derive(Args)]
pub struct GrantsArgs {
    #[command(subcommand)]
    pub command: GrantsCommand,
}

#[derive(clap::Subcommand)]
pub enum GrantsCommand {
    /// Show a service's current grants
    Get {
        /// Service name
        name: String,
    },

    /// Provision grants, waiting until both are in place
    Ensure {
        /// Service name
        name: String,
    },
}

/// Run the grants command.
pub async fn run(client: &ConfidantClient, args: &GrantsArgs) -> anyhow::Result<()> {
    match &args.command {
        GrantsCommand::Get { name } => {
            let grants = client.get_grants(name).await?;
            render::print_json(&render::grants_view(name, &grants))
        }
        GrantsCommand::Ensure { name } => {
            let grants = client.ensure_grants(name).await?;
            render::success(format!("Grants in place for '{}'", name));
            render::print_json(&render::grants_view(name, &grants))
        }
    }
}
