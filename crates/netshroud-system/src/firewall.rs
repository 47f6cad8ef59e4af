//! Firewall rule control through the `iptables` binary.
//!
//! Provides a typed rule builder and a thin manager around rule
//! inspection (`-C`), insertion (`-A`), deletion (`-D`) and
//! `iptables-save` persistence.
//!
//! ## Example
//!
//! ```no_run
//! use netshroud_system::firewall::*;
//!
//! # fn example() -> netshroud_system::Result<()> {
//! let mgr = IptablesManager::new()?;
//!
//! let drop_icmp = Rule::new(Table::Filter, Chain::Input, Target::Drop)
//!     .protocol(Protocol::Icmp);
//!
//! if !mgr.check_rule(&drop_icmp)? {
//!     mgr.append_rule(&drop_icmp)?;
//! }
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

use crate::error::{Result, SystemError};

/// Where persisted rules land, read back by iptables-persistent on boot.
const RULES_V4_PATH: &str = "/etc/iptables/rules.v4";

/// Netfilter tables addressed by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Filter,
    Nat,
    Mangle,
}

impl Table {
    fn as_str(&self) -> &str {
        match self {
            Table::Filter => "filter",
            Table::Nat => "nat",
            Table::Mangle => "mangle",
        }
    }
}

/// Built-in chain names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chain {
    Input,
    Output,
    Forward,
}

impl Chain {
    fn as_str(&self) -> &str {
        match self {
            Chain::Input => "INPUT",
            Chain::Output => "OUTPUT",
            Chain::Forward => "FORWARD",
        }
    }
}

/// Target actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Accept,
    Drop,
    Reject,
}

impl Target {
    fn as_str(&self) -> &str {
        match self {
            Target::Accept => "ACCEPT",
            Target::Drop => "DROP",
            Target::Reject => "REJECT",
        }
    }
}

/// Protocol types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
    All,
}

impl Protocol {
    fn as_str(&self) -> &str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::Icmp => "icmp",
            Protocol::All => "all",
        }
    }
}

/// Iptables rule builder.
///
/// A `Rule` is a match specification plus a target; the same value is
/// passed to check, append and delete so all three address the identical
/// rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    table: Table,
    chain: Chain,
    protocol: Option<Protocol>,
    in_interface: Option<String>,
    target: Target,
}

impl Rule {
    pub fn new(table: Table, chain: Chain, target: Target) -> Self {
        Self {
            table,
            chain,
            protocol: None,
            in_interface: None,
            target,
        }
    }

    pub fn protocol(mut self, proto: Protocol) -> Self {
        self.protocol = Some(proto);
        self
    }

    pub fn in_interface(mut self, iface: &str) -> Self {
        self.in_interface = Some(iface.to_string());
        self
    }

    fn to_args(&self, action: &str) -> Vec<String> {
        let mut args = vec![
            "-t".to_string(),
            self.table.as_str().to_string(),
            action.to_string(),
            self.chain.as_str().to_string(),
        ];

        if let Some(proto) = &self.protocol {
            args.push("-p".to_string());
            args.push(proto.as_str().to_string());
        }

        if let Some(iface) = &self.in_interface {
            args.push("-i".to_string());
            args.push(iface.clone());
        }

        args.push("-j".to_string());
        args.push(self.target.as_str().to_string());

        args
    }
}

/// Manager for firewall rule operations.
pub struct IptablesManager;

impl IptablesManager {
    /// Create a new iptables manager.
    ///
    /// # Errors
    ///
    /// Returns `SystemError::PermissionDenied` if not running as root.
    pub fn new() -> Result<Self> {
        if unsafe { libc::geteuid() } != 0 {
            warn!("iptables operations require root privileges (CAP_NET_ADMIN)");
            return Err(SystemError::PermissionDenied);
        }

        debug!("iptables manager initialized with root privileges");
        Ok(Self)
    }

    /// Check whether a matching rule exists (`iptables -C`).
    ///
    /// A nonzero exit status means "no matching rule". A spawn failure is
    /// an error: it says nothing about the rule, only that the check
    /// itself could not run.
    pub fn check_rule(&self, rule: &Rule) -> Result<bool> {
        let output = self.run(&rule.to_args("-C"))?;
        Ok(output.status.success())
    }

    /// Append a rule (`iptables -A`).
    pub fn append_rule(&self, rule: &Rule) -> Result<()> {
        self.execute(&rule.to_args("-A"))
    }

    /// Delete a rule (`iptables -D`).
    ///
    /// Deleting a rule that does not exist is an error; callers that need
    /// idempotent removal check first with [`check_rule`](Self::check_rule).
    pub fn delete_rule(&self, rule: &Rule) -> Result<()> {
        self.execute(&rule.to_args("-D"))
    }

    /// Persist the current rule set across reboots.
    ///
    /// Runs `iptables-save` and writes its output to
    /// `/etc/iptables/rules.v4`.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - rules written
    /// * `Ok(false)` - `iptables-save` is not installed; nothing persisted
    ///
    /// # Errors
    ///
    /// The save binary ran but failed, or the rules file could not be
    /// written.
    pub fn save_rules(&self) -> Result<bool> {
        let Some(binary) = find_save_binary() else {
            warn!("iptables-save not found; install iptables-persistent to keep rules across reboots");
            return Ok(false);
        };

        debug!("persisting firewall rules via {}", binary);

        let output = Command::new(binary)
            .output()
            .map_err(|e| SystemError::Spawn("iptables-save", e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SystemError::CommandFailed(
                "iptables-save",
                stderr.trim().to_string(),
            ));
        }

        write_rules_file(Path::new(RULES_V4_PATH), &output.stdout)?;
        Ok(true)
    }

    fn run(&self, args: &[String]) -> Result<std::process::Output> {
        debug!("iptables {}", args.join(" "));

        Command::new("iptables")
            .args(args)
            .output()
            .map_err(|e| SystemError::Spawn("iptables", e.to_string()))
    }

    fn execute(&self, args: &[String]) -> Result<()> {
        let output = self.run(args)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("iptables command failed: {}", stderr.trim());
            return Err(SystemError::CommandFailed(
                "iptables",
                stderr.trim().to_string(),
            ));
        }

        Ok(())
    }
}

fn find_save_binary() -> Option<&'static str> {
    [
        "/usr/sbin/iptables-save",
        "/sbin/iptables-save",
        "/usr/bin/iptables-save",
    ]
    .into_iter()
    .find(|path| Path::new(path).exists())
}

fn write_rules_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}
