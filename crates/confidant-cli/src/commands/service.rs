//! Service commands.
//!
//! Provides `confidant service get|list|create|set-credentials|
//! update-credentials|assign|unassign|enable|disable`.

use clap::Args;
use confidant_client::{ClientError, ConfidantClient};
use serde_json::Value;

use crate::render;

/// Service command arguments.
#[derive(Args)]
pub struct ServiceArgs {
    #[command(subcommand)]
    pub command: ServiceCommand,
}

#[derive(clap::Subcommand)]
pub enum ServiceCommand {
    /// Show one service
    Get {
        /// Service name
        name: String,
    },

    /// List all services
    List,

    /// Create a service with the named credentials
    Create {
        /// Service name (must be a permitted role)
        name: String,

        /// Credential name to assign (repeatable)
        #[arg(long = "credential")]
        credentials: Vec<String>,
    },

    /// Replace a service's credentials
    SetCredentials {
        /// Service name
        name: String,

        /// Credential names the service should hold
        credentials: Vec<String>,
    },

    /// Add and remove credentials
    UpdateCredentials {
        /// Service name
        name: String,

        /// Credential name to add (repeatable)
        #[arg(long)]
        add: Vec<String>,

        /// Credential name to remove (repeatable)
        #[arg(long)]
        remove: Vec<String>,
    },

    /// Assign one credential to a service
    Assign {
        /// Service name
        service: String,

        /// Credential name
        credential: String,
    },

    /// Remove one credential from a service
    Unassign {
        /// Service name
        service: String,

        /// Credential name
        credential: String,
    },

    /// Enable a service
    Enable {
        /// Service name
        name: String,
    },

    /// Disable a service and remove all its credentials
    Disable {
        /// Service name
        name: String,
    },
}

/// Run the service command.
pub async fn run(client: &ConfidantClient, args: &ServiceArgs) -> anyhow::Result<()> {
    let service = match &args.command {
        ServiceCommand::Get { name } => client.get_service(name).await?,

        ServiceCommand::List => {
            let services = client.list_services().await?;
            let views: Vec<Value> = services.iter().map(render::service_view).collect();
            return render::print_json(&Value::Array(views));
        }

        ServiceCommand::Create { name, credentials } => {
            match client.create_service(name, credentials).await {
                Ok(service) => {
                    render::success(format!("Created service '{}'", name));
                    service
                }
                Err(ClientError::AlreadyExists(_)) => {
                    render::warning(format!(
                        "Service '{}' already exists; grants are in place",
                        name
                    ));
                    anyhow::bail!("Service already exists: {}", name);
                }
                Err(e) => return Err(e.into()),
            }
        }

        ServiceCommand::SetCredentials { name, credentials } => {
            let service = client.set_service_credentials(name, credentials).await?;
            render::success(format!("Set {} credential(s) on '{}'", credentials.len(), name));
            service
        }

        ServiceCommand::UpdateCredentials { name, add, remove } => {
            if add.is_empty() && remove.is_empty() {
                anyhow::bail!("Nothing to update: pass --add and/or --remove");
            }
            let service = client.update_service_credentials(name, add, remove).await?;
            render::success(format!(
                "Updated '{}': {} added, {} removed",
                name,
                add.len(),
                remove.len()
            ));
            service
        }

        ServiceCommand::Assign {
            service,
            credential,
        } => {
            let updated = client.assign_credential(service, credential).await?;
            render::success(format!("Assigned '{}' to '{}'", credential, service));
            updated
        }

        ServiceCommand::Unassign {
            service,
            credential,
        } => {
            let updated = client.unassign_credential(service, credential).await?;
            render::success(format!("Removed '{}' from '{}'", credential, service));
            updated
        }

        ServiceCommand::Enable { name } => {
            let service = client.enable_service(name).await?;
            render::success(format!("Enabled '{}'", name));
            service
        }

        ServiceCommand::Disable { name } => {
            let service = client.disable_service(name).await?;
            render::success(format!("Disabled '{}' and removed its credentials", name));
            service
        }
    };

    render::print_json(&render::service_view(&service))
}
