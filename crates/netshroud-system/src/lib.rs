//! Privileged host plumbing for netshroud.
//!
//! Wraps the system tools a stealth toggle needs — `sysctl` for kernel
//! parameters, `iptables` for the firewall, `ip` for link discovery —
//! behind small typed interfaces. Every operation is a blocking external
//! invocation; most require root or `CAP_NET_ADMIN`.
//!
//! ## Example
//!
//! ```no_run
//! use netshroud_system::{IptablesManager, Rule, Table, Chain, Target, Protocol};
//!
//! # fn example() -> netshroud_system::Result<()> {
//! let firewall = IptablesManager::new()?;
//! let rule = Rule::new(Table::Filter, Chain::Input, Target::Drop)
//!     .protocol(Protocol::Icmp);
//!
//! if !firewall.check_rule(&rule)? {
//!     firewall.append_rule(&rule)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod firewall;
pub mod link;
pub mod sysctl;

pub use error::{Result, SystemError};
pub use firewall::{Chain, IptablesManager, Protocol, Rule, Table, Target};
pub use link::list_interface_names;
pub use sysctl::{read_parameter, set_parameter};

/// Check if running with sufficient privileges.
///
/// Kernel parameter writes and firewall mutations require root.
///
/// # Returns
///
/// `true` if the effective uid is 0.
#[must_use]
pub fn check_privileges() -> bool {
    unsafe { libc::geteuid() == 0 }
}
