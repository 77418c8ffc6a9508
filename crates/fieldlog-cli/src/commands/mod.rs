//! Command implementations.

pub mod clear;
pub mod log;
pub mod reading;
pub mod scan;
pub mod share;

use std::sync::Arc;

use anyhow::Result;

use fieldlog_core::{
    AdapterPermissions, BleTransport, BtleplugTransport, SessionConfig, SessionController,
};
use fieldlog_store::RecordStore;

use crate::config::Config;

/// Wire the real transport, position provider, and store into a controller.
pub(crate) async fn build_controller(
    config: &Config,
    session_config: SessionConfig,
) -> Result<SessionController> {
    let transport: Arc<dyn BleTransport> = Arc::new(BtleplugTransport::new().await?);
    let permissions = AdapterPermissions::new(Arc::clone(&transport));
    let store = RecordStore::open(config.log_path());

    Ok(SessionController::new(
        transport,
        config.gps_provider(),
        &permissions,
        store,
        session_config,
    )
    .await)
}

/// Forward controller status events to stderr as short status lines.
pub(crate) fn spawn_status_printer(controller: &SessionController, quiet: bool) {
    if quiet {
        return;
    }
    let mut events = controller.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            eprintln!("{}", event);
        }
    });
}

/// Render a sample as one aligned output row.
pub(crate) fn format_sample(sample: &fieldlog_types::Sample) -> String {
    let timestamp = sample
        .timestamp
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "-".to_string());
    format!(
        "{}  {}, {}  {} °C  {} %",
        timestamp, sample.latitude, sample.longitude, sample.temperature, sample.humidity
    )
}
