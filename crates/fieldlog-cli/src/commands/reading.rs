//! Take-reading command implementation.

use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::commands::{build_controller, format_sample, spawn_status_printer};
use crate::config::Config;

pub async fn cmd_take_reading(
    config: &Config,
    count: u32,
    interval_secs: u64,
    timeout_secs: Option<u64>,
    quiet: bool,
) -> Result<()> {
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

    // Several readings share one connection; only the first command pays for
    // the scan. A failed reading aborts the run - the user re-invokes.
    let count = count.max(1);
    for taken in 0..count {
        if taken > 0 {
            tokio::time::sleep(Duration::from_secs(interval_secs)).await;
        }
        let sample = controller.take_reading().await?;
        println!("{}", format_sample(&sample));
    }

    info!(
        "Appended {} record(s) to {}",
        count,
        controller.log_path().display()
    );
    controller.shutdown().await.ok();
    Ok(())
}
