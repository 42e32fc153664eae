//! Role commands.

use clap::Args;
use confidant_client::ConfidantClient;
use serde_json::json;

use crate::render;

/// Roles command arguments.
#[derive(Args)]
pub struct RolesArgs {
    #[command(subcommand)]
    pub command: RolesCommand,
}

#[derive(clap::Subcommand)]
pub enum RolesCommand {
    /// List roles services may be created for
    List,

    /// Check that a name is a permitted role
    Check {
        /// Service name
        name: String,
    },
}

/// Run the roles command.
pub async fn run(client: &ConfidantClient, args: &RolesArgs) -> anyhow::Result<()> {
    match &args.command {
        RolesCommand::List => {
            let roles = client.list_roles().await?;
            render::print_json(&json!(roles))
        }
        RolesCommand::Check { name } => {
            client.check_role(name).await?;
            render::success(format!("'{}' is a permitted role", name));
            Ok(())
        }
    }
}
