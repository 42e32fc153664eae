//! Identity command.

use confidant_client::ConfidantClient;
use serde_json::json;

use crate::render;

/// Print the caller identity and store URL. The token itself is never shown.
pub fn run(client: &ConfidantClient) -> anyhow::Result<()> {
    render::print_json(&json!({
        "username": client.username(),
        "url": client.base_url(),
    }))
}
