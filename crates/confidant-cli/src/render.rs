//! Terminal output.
//!
//! Results go to stdout as pretty JSON; status lines go to stderr. Credential
//! pair values are never printed, only their keys.

use confidant_client::{Credential, Grants, Service};
use console::style;
use serde_json::{json, Value};

/// Credential with pair values withheld.
pub fn credential_view(credential: &Credential) -> Value {
    let mut keys: Vec<&str> = credential
        .credential_pairs
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort_unstable();

    json!({
        "id": credential.id,
        "name": credential.name,
        "enabled": credential.enabled,
        "revision": credential.revision,
        "keys": keys,
    })
}

/// Service with its credentials rendered by [`credential_view`].
pub fn service_view(service: &Service) -> Value {
    json!({
        "id": service.id,
        "enabled": service.enabled,
        "revision": service.revision,
        "account": service.account,
        "credentials": service.credentials.iter().map(credential_view).collect::<Vec<_>>(),
        "blind_credentials": service.blind_credentials,
        "modified_by": service.modified_by,
        "modified_date": service.modified_date,
    })
}

pub fn grants_view(service: &str, grants: &Grants) -> Value {
    json!({
        "service": service,
        "encrypt_grant": grants.encrypt_grant,
        "decrypt_grant": grants.decrypt_grant,
    })
}

/// Print a value as pretty JSON on stdout.
pub fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a success line on stderr.
pub fn success(message: impl AsRef<str>) {
    eprintln!("{} {}", style("*").green(), message.as_ref());
}

/// Print a warning line on stderr.
pub fn warning(message: impl AsRef<str>) {
    eprintln!("{} {}", style("!").yellow().bold(), message.as_ref());
}
