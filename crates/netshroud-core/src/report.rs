//! Run-outcome rendering for the terminal.

use anyhow::Result;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::engine::{Direction, RunOutcome, Subsystem};

const RED: &str = "\x1b[91m";
const RESET: &str = "\x1b[0m";

/// Print the run header before any operation executes (text mode only).
pub fn announce(targets: &[String], direction: Direction, format: OutputFormat) {
    if format == OutputFormat::Json {
        return;
    }
    let action = match direction {
        Direction::Conceal => "disabling ARP/ICMP responses",
        Direction::Reveal => "enabling ARP/ICMP responses",
    };
    println!("{} for interfaces:\n{}", action, targets.join(" / "));
}

/// Render the finalized outcome.
pub fn render(outcome: &RunOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => render_json(outcome),
        OutputFormat::Text => {
            render_text(outcome);
            Ok(())
        }
    }
}

fn render_json(outcome: &RunOutcome) -> Result<()> {
    let failures = outcome.results.iter().filter(|r| !r.success).count();
    let payload = json!({
        "status": if failures == 0 { "ok" } else { "partial" },
        "message": format!(
            "{} operation(s), {} failure(s)",
            outcome.results.len(),
            failures
        ),
        "data": outcome,
    });

    println!("{}", payload);
    Ok(())
}

fn render_text(outcome: &RunOutcome) {
    for result in &outcome.results {
        let label = match (result.subsystem, result.direction) {
            (Subsystem::Arp, Direction::Conceal) => "ARP replies disabled",
            (Subsystem::Arp, Direction::Reveal) => "ARP replies enabled",
            (Subsystem::Icmp, Direction::Conceal) => "ICMP responses disabled",
            (Subsystem::Icmp, Direction::Reveal) => "ICMP responses enabled",
        };

        if result.success {
            let line = match result.subsystem {
                Subsystem::Arp => format!("| {} for {}", label, result.target),
                Subsystem::Icmp => format!("| {}", label),
            };
            match &result.detail {
                Some(note) => println!("{} ({})", line, note),
                None => println!("{}", line),
            }
        } else {
            let detail = result.detail.as_deref().unwrap_or("unknown error");
            println!(
                "{RED}error: {} failed for {}: {}{RESET}",
                label, result.target, detail
            );
        }
    }

    match outcome.persisted {
        Some(true) => println!("| firewall rules saved"),
        Some(false) => {
            println!("{RED}warning: firewall rules were not persisted{RESET}");
        }
        None => {}
    }
}
