//! Clear command implementation.
//!
//! Clearing is destructive, so it is two-phase: the request is only
//! executed after an explicit confirmation signal, either the interactive
//! prompt or the `--yes` flag.

use std::io::{self, IsTerminal};

use anyhow::{Result, bail};
use dialoguer::Confirm;

use fieldlog_store::RecordStore;

use crate::config::Config;

pub fn cmd_clear(config: &Config, yes: bool, quiet: bool) -> Result<()> {
    let store = RecordStore::open(config.log_path());

    let confirmed = if yes {
        true
    } else {
        if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
            bail!(
                "refusing to clear the data log without confirmation; \
                 pass --yes to confirm"
            );
        }
        let count = store.read_all().map(|records| records.len()).unwrap_or(0);
        Confirm::new()
            .with_prompt(format!(
                "Clear the data log ({} record(s) in {})?",
                count,
                store.path().display()
            ))
            .default(false)
            .interact()?
    };

    if !confirmed {
        eprintln!("Clear cancelled");
        return Ok(());
    }

    store.clear()?;
    if !quiet {
        eprintln!("File cleared!");
    }
    Ok(())
}
