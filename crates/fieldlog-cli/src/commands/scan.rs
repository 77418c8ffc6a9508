//! Scan command implementation.

use std::time::Duration;

use anyhow::Result;

use crate::commands::{build_controller, spawn_status_printer};
use crate::config::Config;

pub async fn cmd_scan(config: &Config, timeout_secs: Option<u64>, quiet: bool) -> Result<()> {
    let mut session_config = config.session_config();
    if let Some(secs) = timeout_secs {
        session_config = session_config.scan_timeout(Duration::from_secs(secs));
    }

    let mut controller = build_controller(config, session_config).await?;
    spawn_status_printer(&controller, quiet);

    // Ctrl-C aborts the scan instead of killing the process mid-connect.
    let cancel = controller.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    controller.scan_and_connect().await?;

    match controller.device() {
        Some(device) => println!("Connected to {} ({})", device.name, device.identifier),
        None => println!("Connected"),
    }

    controller.shutdown().await.ok();
    Ok(())
}
