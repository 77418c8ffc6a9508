//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "fieldlog")]
#[command(author, version, about = "CLI logger for a BLE field sensor", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use a specific configuration file
    #[arg(long, global = true, env = "FIELDLOG_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan for the configured sensor and connect to it
    Scan {
        /// Scan timeout in seconds (overrides config)
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Take readings and append them to the data log
    TakeReading {
        /// Number of readings to take over one connection
        #[arg(short = 'n', long, default_value = "1")]
        count: u32,

        /// Seconds to wait between readings
        #[arg(short, long, default_value = "5")]
        interval: u64,

        /// Scan timeout in seconds (overrides config)
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Print the stored readings
    Log,

    /// Export the data log to a directory
    Share {
        /// Target directory (defaults to the download directory)
        #[arg(short = 't', long = "to")]
        to: Option<PathBuf>,
    },

    /// Clear the data log (asks for confirmation)
    Clear {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}
