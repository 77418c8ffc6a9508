mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::config::Config;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref());

    if let Err(e) = run(cli, &config).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: Cli, config: &Config) -> Result<()> {
    match cli.command {
        Commands::Scan { timeout } => commands::scan::cmd_scan(config, timeout, cli.quiet).await,
        Commands::TakeReading {
            count,
            interval,
            timeout,
        } => {
            commands::reading::cmd_take_reading(config, count, interval, timeout, cli.quiet).await
        }
        Commands::Log => commands::log::cmd_log(config, cli.quiet),
        Commands::Share { to } => commands::share::cmd_share(config, to, cli.quiet),
        Commands::Clear { yes } => commands::clear::cmd_clear(config, yes, cli.quiet),
    }
}

/// Map error classes to process exit codes, so scripts can distinguish
/// failure modes without parsing messages.
fn exit_code(err: &anyhow::Error) -> i32 {
    use fieldlog_core::Error;

    match err.downcast_ref::<Error>() {
        Some(Error::NotConnected) => 2,
        Some(Error::Scan(_))
        | Some(Error::Connect(_))
        | Some(Error::Discovery(_))
        | Some(Error::Timeout { .. }) => 3,
        Some(Error::Read { .. }) | Some(Error::Decode(_)) => 4,
        Some(Error::Location(_)) => 5,
        Some(Error::Storage(_)) => 6,
        Some(Error::Bluetooth(_))
        | Some(Error::BluetoothUnavailable(_))
        | Some(Error::PermissionDenied(_)) => 7,
        Some(Error::Cancelled) => 130,
        Some(_) | None => match err.downcast_ref::<fieldlog_store::Error>() {
            Some(_) => 6,
            None => 1,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_distinguish_error_classes() {
        use fieldlog_core::Error;

        assert_eq!(exit_code(&anyhow::Error::new(Error::NotConnected)), 2);
        assert_eq!(
            exit_code(&anyhow::Error::new(Error::Scan("no match".into()))),
            3
        );
        assert_eq!(
            exit_code(&anyhow::Error::new(Error::Location("no fix".into()))),
            5
        );
        assert_eq!(
            exit_code(&anyhow::Error::new(fieldlog_store::Error::NoExportTarget)),
            6
        );
        assert_eq!(exit_code(&anyhow::anyhow!("anything else")), 1);
    }
}
