//! Log command implementation.

use anyhow::Result;

use fieldlog_store::RecordStore;

use crate::commands::format_sample;
use crate::config::Config;

pub fn cmd_log(config: &Config, quiet: bool) -> Result<()> {
    let store = RecordStore::open(config.log_path());
    let records = store.read_all()?;

    if records.is_empty() {
        println!("Log is empty ({})", store.path().display());
        return Ok(());
    }

    for sample in &records {
        println!("{}", format_sample(sample));
    }
    if !quiet {
        eprintln!("{} record(s) in {}", records.len(), store.path().display());
    }
    Ok(())
}
