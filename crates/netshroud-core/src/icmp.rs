//! ICMP visibility control.
//!
//! One host-wide firewall rule drops all inbound ICMP. Both directions
//! inspect before mutating so repeated runs cannot accumulate duplicate
//! rules or fail deleting a rule that was never inserted.

use anyhow::{Context, Result};
use tracing::{debug, warn};

use netshroud_system::firewall::{Chain, Protocol, Rule, Table, Target};

use crate::engine::Direction;
use crate::ops::{HostOps, RulePresence};

/// The single rule this tool owns: drop all inbound ICMP.
pub fn icmp_drop_rule() -> Rule {
    Rule::new(Table::Filter, Chain::Input, Target::Drop).protocol(Protocol::Icmp)
}

/// Apply or revert the host-wide ICMP drop rule.
///
/// Runs at most one inspection and one mutation. An inspection failure is
/// not conclusive about the rule; it is handled as "absent" so the run
/// makes progress, and the returned note carries the caveat into the
/// operation's detail.
pub fn set_icmp(ops: &dyn HostOps, direction: Direction) -> Result<Option<String>> {
    let rule = icmp_drop_rule();
    let presence = ops.rule_exists(&rule);

    if presence == RulePresence::Unknown {
        warn!("ICMP rule inspection failed; proceeding as if the rule were absent");
    }

    match direction {
        Direction::Conceal => {
            if presence == RulePresence::Present {
                debug!("ICMP drop rule already present, nothing to insert");
                return Ok(None);
            }
            ops.insert_rule(&rule).context("inserting ICMP drop rule")?;
            Ok(inspection_note(presence))
        }
        Direction::Reveal => {
            if presence == RulePresence::Present {
                ops.remove_rule(&rule).context("removing ICMP drop rule")?;
                return Ok(None);
            }
            debug!("no ICMP drop rule present, nothing to remove");
            Ok(inspection_note(presence))
        }
    }
}

fn inspection_note(presence: RulePresence) -> Option<String> {
    (presence == RulePresence::Unknown)
        .then(|| "rule inspection failed, treated as absent".to_string())
}
