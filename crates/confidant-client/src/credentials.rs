//! Credential set arithmetic.
//!
//! Pure functions over credential lists. Nothing here talks to the store;
//! the client fetches, calls into this module, and submits the result.

use std::collections::{BTreeMap, HashMap};

use crate::error::{ClientError, Result};
use crate::types::Credential;

/// IDs of `credentials`, in list order.
pub fn ids_from_list(credentials: &[Credential]) -> Vec<String> {
    credentials.iter().map(|c| c.id.clone()).collect()
}

/// IDs of a reconciled mapping, in key order.
pub fn ids_from_mapping(credentials: &BTreeMap<String, Credential>) -> Vec<String> {
    credentials.keys().cloned().collect()
}

/// New credential set from `initial` plus `add` minus `remove`, keyed by ID.
///
/// Adds overwrite on ID collision, removes run last. Removing an absent ID
/// and adding a present one are both no-ops on the resulting ID set.
pub fn reconcile(
    initial: &[Credential],
    add: &[Credential],
    remove: &[Credential],
) -> BTreeMap<String, Credential> {
    let mut result: BTreeMap<String, Credential> = initial
        .iter()
        .map(|c| (c.id.clone(), c.clone()))
        .collect();

    for credential in add {
        result.insert(credential.id.clone(), credential.clone());
    }
    for credential in remove {
        result.remove(&credential.id);
    }

    result
}

/// Look up every name in `available`, failing with all names that are absent.
///
/// Output follows the order of `names`. Duplicate store names resolve to
/// the last credential listed.
pub fn resolve_names(available: &[Credential], names: &[String]) -> Result<Vec<Credential>> {
    let by_name: HashMap<&str, &Credential> =
        available.iter().map(|c| (c.name.as_str(), c)).collect();

    let mut resolved = Vec::with_capacity(names.len());
    let mut missing = Vec::new();
    for name in names {
        match by_name.get(name.as_str()) {
            Some(credential) => resolved.push((*credential).clone()),
            None => missing.push(name.clone()),
        }
    }

    if missing.is_empty() {
        Ok(resolved)
    } else {
        Err(ClientError::UnresolvedCredentials { names: missing })
    }
}
