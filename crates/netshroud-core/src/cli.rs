use clap::{Parser, ValueEnum};

use crate::engine::{Direction, SubsystemFilter};

#[derive(Parser, Debug)]
#[command(
    name = "netshroud",
    author,
    version,
    about = "Toggle host ARP/ICMP visibility against LAN scanners"
)]
pub struct Cli {
    /// Revert changes (restore ARP and ICMP responses)
    #[arg(long)]
    pub revert: bool,

    /// Network interface(s) to affect, comma-separated. If not given, all
    /// non-loopback interfaces are affected.
    #[arg(long)]
    pub interface: Option<String>,

    /// Save iptables rules so changes persist after reboot
    #[arg(long)]
    pub save: bool,

    /// Only apply changes to ARP settings
    #[arg(long = "only-arp", conflicts_with = "only_icmp")]
    pub only_arp: bool,

    /// Only apply changes to ICMP settings
    #[arg(long = "only-icmp")]
    pub only_icmp: bool,

    /// Output format for the run report
    #[arg(long = "output", value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    pub fn direction(&self) -> Direction {
        if self.revert {
            Direction::Reveal
        } else {
            Direction::Conceal
        }
    }

    pub fn filter(&self) -> SubsystemFilter {
        if self.only_arp {
            SubsystemFilter::ArpOnly
        } else if self.only_icmp {
            SubsystemFilter::IcmpOnly
        } else {
            SubsystemFilter::All
        }
    }
}
