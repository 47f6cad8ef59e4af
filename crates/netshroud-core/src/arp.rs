//! ARP visibility control.
//!
//! Concealing a host from ARP-based scanners tightens two per-interface
//! kernel parameters: `arp_ignore` 8 refuses requests unless the target
//! address is local to the receiving interface, and `arp_announce` 2
//! restricts announcements to the best local source. Revealing resets
//! both to the kernel's permissive default of 0.

use anyhow::Result;
use tracing::{debug, warn};

use crate::engine::Direction;
use crate::ops::HostOps;

const ARP_IGNORE_STRICT: i64 = 8;
const ARP_ANNOUNCE_STRICT: i64 = 2;
const ARP_DEFAULT: i64 = 0;

fn settings_for(direction: Direction) -> [(&'static str, i64); 2] {
    match direction {
        Direction::Conceal => [
            ("arp_ignore", ARP_IGNORE_STRICT),
            ("arp_announce", ARP_ANNOUNCE_STRICT),
        ],
        Direction::Reveal => [("arp_ignore", ARP_DEFAULT), ("arp_announce", ARP_DEFAULT)],
    }
}

/// Apply or revert the ARP policy on one interface.
///
/// The two parameter writes are applied independently: a failure on one
/// does not skip the other, but any failure makes the whole call report
/// failure for this interface (the first error wins). Writes overwrite
/// directly; re-applying an already-active direction is a no-op that
/// still succeeds.
pub fn set_arp(ops: &dyn HostOps, interface: &str, direction: Direction) -> Result<()> {
    let mut first_failure: Option<anyhow::Error> = None;

    for (param, value) in settings_for(direction) {
        let key = format!("net.ipv4.conf.{interface}.{param}");
        debug!("applying {} = {}", key, value);

        if let Err(err) = ops.set_parameter(&key, value) {
            warn!("failed to set {} = {}: {:#}", key, value, err);
            if first_failure.is_none() {
                first_failure = Some(err.context(format!("setting {key}")));
            }
        }
    }

    match first_failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
