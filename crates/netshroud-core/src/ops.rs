//! Capability trait for privileged host access.
//!
//! Every interaction with kernel parameters, the firewall and the link
//! table goes through [`HostOps`], so the controllers and the engine can
//! be exercised against an in-memory mock instead of a root shell.

use anyhow::Result;
use tracing::warn;

use netshroud_system::firewall::{IptablesManager, Rule};

/// Result of a firewall rule presence check.
///
/// `Unknown` means the inspection call itself failed to run; it says
/// nothing about the rule. Callers decide how to proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulePresence {
    Present,
    Absent,
    Unknown,
}

/// Privileged host surface consumed by the toggle engine.
pub trait HostOps: Send + Sync {
    /// Names from the host link table, loopback included, in table order.
    fn list_interface_names(&self) -> Result<Vec<String>>;

    /// Write a kernel parameter. The write itself is idempotent.
    fn set_parameter(&self, key: &str, value: i64) -> Result<()>;

    /// Check whether a matching firewall rule exists.
    fn rule_exists(&self, rule: &Rule) -> RulePresence;

    /// Append a firewall rule.
    fn insert_rule(&self, rule: &Rule) -> Result<()>;

    /// Delete a firewall rule. Deleting an absent rule is an error.
    fn remove_rule(&self, rule: &Rule) -> Result<()>;

    /// Persist the firewall rule set across reboots.
    ///
    /// `Ok(false)` means the persistence tooling is not installed.
    fn persist_rules(&self) -> Result<bool>;
}

/// Live implementation backed by the host's system tools.
pub struct RealHostOps {
    firewall: IptablesManager,
}

impl RealHostOps {
    /// # Errors
    ///
    /// Fails when not running as root.
    pub fn new() -> Result<Self> {
        let firewall = IptablesManager::new()?;
        Ok(Self { firewall })
    }
}

impl HostOps for RealHostOps {
    fn list_interface_names(&self) -> Result<Vec<String>> {
        Ok(netshroud_system::link::list_interface_names()?)
    }

    fn set_parameter(&self, key: &str, value: i64) -> Result<()> {
        Ok(netshroud_system::sysctl::set_parameter(key, value)?)
    }

    fn rule_exists(&self, rule: &Rule) -> RulePresence {
        match self.firewall.check_rule(rule) {
            Ok(true) => RulePresence::Present,
            Ok(false) => RulePresence::Absent,
            Err(err) => {
                warn!("firewall rule inspection failed: {}", err);
                RulePresence::Unknown
            }
        }
    }

    fn insert_rule(&self, rule: &Rule) -> Result<()> {
        Ok(self.firewall.append_rule(rule)?)
    }

    fn remove_rule(&self, rule: &Rule) -> Result<()> {
        Ok(self.firewall.delete_rule(rule)?)
    }

    fn persist_rules(&self) -> Result<bool> {
        Ok(self.firewall.save_rules()?)
    }
}
