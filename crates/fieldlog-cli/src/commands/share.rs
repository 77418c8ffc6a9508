//! Share command implementation.

use std::path::PathBuf;

use anyhow::Result;

use fieldlog_store::{DirectorySink, RecordStore};

use crate::config::Config;

pub fn cmd_share(config: &Config, to: Option<PathBuf>, quiet: bool) -> Result<()> {
    let store = RecordStore::open(config.log_path());
    let sink = match to {
        Some(dir) => DirectorySink::new(dir),
        None => DirectorySink::default_location(),
    };

    let destination = store.export(&sink)?;
    if !quiet {
        eprintln!("Log exported");
    }
    println!("{}", destination.display());
    Ok(())
}
