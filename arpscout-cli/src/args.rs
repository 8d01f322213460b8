//! CLI argument parsing

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "arpscout")]
#[command(version, about = "Passive and active ARP network reconnaissance", long_about = None)]
pub struct Cli {
    /// Verbose output (-v, -vv for increasing verbosity)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available network interfaces
    Interfaces,

    /// Passively observe ARP traffic on an interface (nothing is transmitted)
    Monitor {
        /// Network interface to listen on
        #[arg(short, long)]
        interface: String,
    },

    /// Probe a host or address range with ARP requests
    Probe {
        /// Network interface to transmit on
        #[arg(short, long)]
        interface: String,

        /// CIDR range or single address to probe
        range: String,

        /// MAC address to transmit from, or "random" to generate one
        /// (defaults to the interface MAC)
        #[arg(short = 'm', long)]
        source_mac: Option<String>,

        /// Delay between requests in milliseconds
        #[arg(long, default_value = "10")]
        send_interval_ms: u64,

        /// Seconds to keep listening after the last request
        #[arg(short, long, default_value = "5")]
        timeout: u64,

        /// Probe targets in range order instead of shuffling them
        #[arg(long)]
        no_shuffle: bool,

        /// Skip the transmit confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
