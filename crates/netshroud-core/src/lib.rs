//! Orchestration core for netshroud.
//!
//! Resolves target interfaces, drives the ARP and ICMP controllers in a
//! fixed order through the [`StealthEngine`], and aggregates one
//! [`OperationResult`] per operation into a [`RunOutcome`] instead of
//! aborting on the first failure. All privileged host access goes through
//! the [`HostOps`] capability trait so the whole core is testable without
//! a root shell.

pub mod arp;
pub mod cli;
pub mod engine;
pub mod icmp;
pub mod ops;
pub mod report;
pub mod resolver;

pub use cli::{Cli, OutputFormat};
pub use engine::{
    Direction, OperationResult, RunOutcome, StealthEngine, Subsystem, SubsystemFilter,
};
pub use ops::{HostOps, RealHostOps, RulePresence};
