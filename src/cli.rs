use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bikealert", version, about = "Bike-share station occupancy alerts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to conf.json
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the alert loop (default)
    Run,
    /// Validate config and check every job against the live feed
    Check,
    /// List the stations closest to an address
    Station {
        /// Free-text address to geocode
        address: String,

        /// Number of stations to list (0 for all)
        #[arg(short, long, default_value_t = 1)]
        limit: usize,
    },
}

impl Cli {
    /// Default log filter when RUST_LOG is unset.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
