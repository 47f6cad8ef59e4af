//! Target interface resolution.

use anyhow::{bail, Result};
use tracing::{debug, warn};

use crate::ops::HostOps;

const LOOPBACK: &str = "lo";

/// Resolve the set of target interfaces for a run.
///
/// An explicit comma-separated list is taken verbatim (no existence
/// check; a bogus name fails later at the controller level, for that
/// interface only). Without an explicit list the host link table is
/// queried and loopback excluded. An enumeration failure resolves to an
/// empty set.
///
/// # Errors
///
/// Resolving zero interfaces is fatal: the run must not proceed without
/// targets.
pub fn resolve_targets(explicit: Option<&str>, ops: &dyn HostOps) -> Result<Vec<String>> {
    let interfaces = match explicit {
        Some(list) => split_interface_list(list),
        None => match ops.list_interface_names() {
            Ok(names) => names.into_iter().filter(|name| name != LOOPBACK).collect(),
            Err(err) => {
                warn!("failed to enumerate network interfaces: {:#}", err);
                Vec::new()
            }
        },
    };

    if interfaces.is_empty() {
        bail!("no network interfaces found");
    }

    debug!("resolved targets: {}", interfaces.join(", "));
    Ok(interfaces)
}

fn split_interface_list(list: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for token in list.split(',') {
        let token = token.trim();
        if token.is_empty() || names.iter().any(|n| n == token) {
            continue;
        }
        names.push(token.to_string());
    }
    names
}
