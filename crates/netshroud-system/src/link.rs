//! Interface-name discovery via the `ip` tool.

use std::process::Command;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::error::{Result, SystemError};

static LINK_ENTRY: OnceLock<Regex> = OnceLock::new();

/// List interface names from the host link table.
///
/// Runs `ip link show` and extracts the name from each numeric-index
/// prefixed entry (`2: eth0: <BROADCAST,...>`). VLAN and virtual
/// sub-interfaces keep only the name before any `@parent` suffix.
/// Loopback is included; callers decide whether to filter it.
///
/// # Errors
///
/// * `Spawn` - the `ip` binary could not be executed
/// * `CommandFailed` - `ip link show` exited nonzero
pub fn list_interface_names() -> Result<Vec<String>> {
    let output = Command::new("ip")
        .args(["link", "show"])
        .output()
        .map_err(|e| SystemError::Spawn("ip", e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SystemError::CommandFailed(
            "ip",
            stderr.trim().to_string(),
        ));
    }

    let listing = String::from_utf8_lossy(&output.stdout);
    let names = parse_link_names(&listing);
    debug!("link table lists {} interface(s)", names.len());
    Ok(names)
}

fn parse_link_names(listing: &str) -> Vec<String> {
    let entry = LINK_ENTRY
        .get_or_init(|| Regex::new(r"(?m)^\d+:\s+([^:@\s]+)").expect("link entry pattern"));

    entry
        .captures_iter(listing)
        .map(|caps| caps[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
1: lo: <LOOPBACK,UP,LOWER_UP> mtu 65536 qdisc noqueue state UNKNOWN mode DEFAULT group default qlen 1000
    link/loopback 00:00:00:00:00:00 brd 00:00:00:00:00:00
2: eth0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 qdisc fq_codel state UP mode DEFAULT group default qlen 1000
    link/ether aa:bb:cc:dd:ee:ff brd ff:ff:ff:ff:ff:ff
3: wlan0: <BROADCAST,MULTICAST> mtu 1500 qdisc noop state DOWN mode DEFAULT group default qlen 1000
    link/ether 11:22:33:44:55:66 brd ff:ff:ff:ff:ff:ff
4: veth1@if5: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 qdisc noqueue state UP mode DEFAULT group default
    link/ether 77:88:99:aa:bb:cc brd ff:ff:ff:ff:ff:ff
";

    #[test]
    fn parses_indexed_entries_in_order() {
        assert_eq!(parse_link_names(SAMPLE), vec!["lo", "eth0", "wlan0", "veth1"]);
    }

    #[test]
    fn continuation_lines_are_ignored() {
        let names = parse_link_names(SAMPLE);
        assert!(!names.iter().any(|n| n.contains("link/")));
    }

    #[test]
    fn vlan_suffix_is_stripped() {
        let names = parse_link_names("7: eth0.100@eth0: <BROADCAST> mtu 1500\n");
        assert_eq!(names, vec!["eth0.100"]);
    }

    #[test]
    fn empty_listing_yields_no_names() {
        assert!(parse_link_names("").is_empty());
    }
}
