//! The toggle engine.
//!
//! Drives both subsystems over a resolved interface set in a fixed
//! order: ARP per interface first, then the host-wide ICMP rule. Each
//! operation contributes one [`OperationResult`] to the [`RunOutcome`];
//! an individual failure never aborts the remaining work, so a fleet of
//! heterogeneous interfaces (wireless, virtual, bridge) degrades
//! per-interface instead of wholesale.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::ops::HostOps;
use crate::{arp, icmp};

/// Target label used for the host-wide ICMP result.
pub const GLOBAL_TARGET: &str = "host";

/// Which way the toggle runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Disable ARP replies/announcements and drop inbound ICMP.
    Conceal,
    /// Restore the kernel's default, responsive behavior.
    Reveal,
}

/// Which subsystems a run touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubsystemFilter {
    All,
    ArpOnly,
    IcmpOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Subsystem {
    Arp,
    Icmp,
}

/// Outcome of one controller operation. Immutable once produced.
#[derive(Debug, Clone, Serialize)]
pub struct OperationResult {
    /// Interface name, or [`GLOBAL_TARGET`] for the ICMP rule.
    pub target: String,
    pub subsystem: Subsystem,
    pub direction: Direction,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Ordered results of a full run, plus the persistence flag when
/// persistence was requested.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub results: Vec<OperationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persisted: Option<bool>,
}

impl RunOutcome {
    pub fn has_failures(&self) -> bool {
        self.results.iter().any(|r| !r.success)
    }
}

/// Orchestrates the ARP and ICMP controllers over a resolved target set.
pub struct StealthEngine {
    ops: Arc<dyn HostOps>,
}

impl StealthEngine {
    pub fn new(ops: Arc<dyn HostOps>) -> Self {
        Self { ops }
    }

    /// Run one toggle pass.
    ///
    /// `interfaces` must already be resolved and non-empty; the resolver
    /// rejects empty target sets before the engine is reached. The ARP
    /// phase walks the interfaces in the given order, then the ICMP rule
    /// is toggled exactly once regardless of interface count. When
    /// `persist` is set the firewall state is saved after both phases.
    pub fn run(
        &self,
        interfaces: &[String],
        direction: Direction,
        filter: SubsystemFilter,
        persist: bool,
    ) -> RunOutcome {
        info!(
            ?direction,
            "starting toggle run over {} interface(s)",
            interfaces.len()
        );

        let mut results = Vec::new();

        if filter != SubsystemFilter::IcmpOnly {
            for interface in interfaces {
                let (success, detail) = match arp::set_arp(self.ops.as_ref(), interface, direction)
                {
                    Ok(()) => (true, None),
                    Err(err) => (false, Some(format!("{err:#}"))),
                };
                results.push(OperationResult {
                    target: interface.clone(),
                    subsystem: Subsystem::Arp,
                    direction,
                    success,
                    detail,
                });
            }
        }

        if filter != SubsystemFilter::ArpOnly {
            let (success, detail) = match icmp::set_icmp(self.ops.as_ref(), direction) {
                Ok(note) => (true, note),
                Err(err) => (false, Some(format!("{err:#}"))),
            };
            results.push(OperationResult {
                target: GLOBAL_TARGET.to_string(),
                subsystem: Subsystem::Icmp,
                direction,
                success,
                detail,
            });
        }

        let persisted = persist.then(|| self.persist_rules());

        RunOutcome { results, persisted }
    }

    fn persist_rules(&self) -> bool {
        match self.ops.persist_rules() {
            Ok(true) => {
                info!("firewall rules persisted");
                true
            }
            Ok(false) => {
                warn!("iptables-save not available; rules will not survive a reboot");
                false
            }
            Err(err) => {
                warn!("failed to persist firewall rules: {:#}", err);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icmp::icmp_drop_rule;
    use crate::ops::tests::MockHostOps;

    fn targets(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn all_filter_yields_one_result_per_interface_plus_icmp() {
        let ops = Arc::new(MockHostOps::new());
        let engine = StealthEngine::new(ops.clone());
        let ifaces = targets(&["eth0", "wlan0", "br0"]);

        let outcome = engine.run(&ifaces, Direction::Conceal, SubsystemFilter::All, false);

        assert_eq!(outcome.results.len(), 4);
        for (result, iface) in outcome.results.iter().zip(["eth0", "wlan0", "br0"]) {
            assert_eq!(result.subsystem, Subsystem::Arp);
            assert_eq!(result.target, iface);
        }
        let last = outcome.results.last().unwrap();
        assert_eq!(last.subsystem, Subsystem::Icmp);
        assert_eq!(last.target, GLOBAL_TARGET);
        assert!(!outcome.has_failures());
    }

    #[test]
    fn conceal_twice_is_idempotent() {
        let ops = Arc::new(MockHostOps::new());
        let engine = StealthEngine::new(ops.clone());
        let ifaces = targets(&["eth0"]);

        let first = engine.run(&ifaces, Direction::Conceal, SubsystemFilter::All, false);
        let ignore_after_first = ops.parameter("net.ipv4.conf.eth0.arp_ignore");
        let announce_after_first = ops.parameter("net.ipv4.conf.eth0.arp_announce");

        let second = engine.run(&ifaces, Direction::Conceal, SubsystemFilter::All, false);

        assert!(!first.has_failures());
        assert!(!second.has_failures());
        assert_eq!(ignore_after_first, Some(8));
        assert_eq!(announce_after_first, Some(2));
        assert_eq!(ops.parameter("net.ipv4.conf.eth0.arp_ignore"), Some(8));
        assert_eq!(ops.parameter("net.ipv4.conf.eth0.arp_announce"), Some(2));
        assert_eq!(ops.rule_count(&icmp_drop_rule()), 1);
    }

    #[test]
    fn arp_only_skips_the_icmp_phase() {
        let ops = Arc::new(MockHostOps::new());
        let engine = StealthEngine::new(ops.clone());

        let outcome = engine.run(
            &targets(&["eth0"]),
            Direction::Conceal,
            SubsystemFilter::ArpOnly,
            false,
        );

        assert!(outcome.results.iter().all(|r| r.subsystem == Subsystem::Arp));
        assert_eq!(ops.rule_count(&icmp_drop_rule()), 0);
    }

    #[test]
    fn icmp_only_skips_the_arp_phase() {
        let ops = Arc::new(MockHostOps::new());
        let engine = StealthEngine::new(ops.clone());

        let outcome = engine.run(
            &targets(&["eth0", "wlan0"]),
            Direction::Conceal,
            SubsystemFilter::IcmpOnly,
            false,
        );

        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].subsystem, Subsystem::Icmp);
        assert_eq!(ops.parameter_writes(), 0);
    }

    #[test]
    fn one_interface_failing_does_not_block_the_rest() {
        let ops = Arc::new(MockHostOps::new());
        ops.fail_parameters_containing(".wlan0.");
        let engine = StealthEngine::new(ops.clone());

        let outcome = engine.run(
            &targets(&["eth0", "wlan0", "br0"]),
            Direction::Conceal,
            SubsystemFilter::All,
            false,
        );

        let flags: Vec<bool> = outcome.results.iter().map(|r| r.success).collect();
        assert_eq!(flags, vec![true, false, true, true]);
        assert!(outcome.results[1].detail.is_some());
        assert_eq!(ops.rule_count(&icmp_drop_rule()), 1);
        assert!(outcome.has_failures());
    }

    #[test]
    fn conceal_then_reveal_round_trips() {
        let ops = Arc::new(MockHostOps::new());
        let engine = StealthEngine::new(ops.clone());
        let ifaces = targets(&["eth0"]);

        engine.run(&ifaces, Direction::Conceal, SubsystemFilter::All, false);
        let outcome = engine.run(&ifaces, Direction::Reveal, SubsystemFilter::All, false);

        assert!(!outcome.has_failures());
        assert_eq!(ops.parameter("net.ipv4.conf.eth0.arp_ignore"), Some(0));
        assert_eq!(ops.parameter("net.ipv4.conf.eth0.arp_announce"), Some(0));
        assert_eq!(ops.rule_count(&icmp_drop_rule()), 0);
    }

    #[test]
    fn reveal_with_broken_inspection_skips_the_delete() {
        let ops = Arc::new(MockHostOps::new());
        ops.seed_rule(icmp_drop_rule());
        ops.break_inspection();
        let engine = StealthEngine::new(ops.clone());

        let outcome = engine.run(
            &targets(&["eth0"]),
            Direction::Reveal,
            SubsystemFilter::IcmpOnly,
            false,
        );

        let icmp_result = outcome.results.last().unwrap();
        assert!(icmp_result.success);
        assert!(icmp_result.detail.is_some());
        assert_eq!(ops.rule_count(&icmp_drop_rule()), 1);
    }

    #[test]
    fn persistence_runs_after_both_phases_when_requested() {
        let ops = Arc::new(MockHostOps::new());
        let engine = StealthEngine::new(ops.clone());

        let outcome = engine.run(
            &targets(&["eth0"]),
            Direction::Conceal,
            SubsystemFilter::All,
            true,
        );

        assert_eq!(outcome.persisted, Some(true));
        assert_eq!(ops.persist_calls(), 1);
    }

    #[test]
    fn unavailable_persistence_is_flagged_not_failed() {
        let ops = Arc::new(MockHostOps::new());
        ops.set_persist_available(false);
        let engine = StealthEngine::new(ops.clone());

        let outcome = engine.run(
            &targets(&["eth0"]),
            Direction::Conceal,
            SubsystemFilter::All,
            true,
        );

        assert_eq!(outcome.persisted, Some(false));
        assert!(!outcome.has_failures());
    }

    #[test]
    fn persistence_is_skipped_unless_requested() {
        let ops = Arc::new(MockHostOps::new());
        let engine = StealthEngine::new(ops.clone());

        let outcome = engine.run(
            &targets(&["eth0"]),
            Direction::Conceal,
            SubsystemFilter::All,
            false,
        );

        assert_eq!(outcome.persisted, None);
        assert_eq!(ops.persist_calls(), 0);
    }
}
