//! Integration tests for fieldlog-core.
//!
//! These tests require a live sensor and should be run with:
//! `cargo test --package fieldlog-core -- --ignored --nocapture`
//!
//! Set the FIELDLOG_DEVICE environment variable to pick the target name:
//! `FIELDLOG_DEVICE="MyESP32" cargo test --package fieldlog-core -- --ignored`

use std::env;
use std::sync::Arc;
use std::time::Duration;

use fieldlog_core::{
    BleTransport, BtleplugTransport, DeviceSession, EventDispatcher, SessionConfig,
};
use tokio::time::timeout;

/// Overall bound on each hardware test.
const TEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Get the device name from environment or use the firmware default.
fn device_name() -> String {
    env::var("FIELDLOG_DEVICE").unwrap_or_else(|_| "MyESP32".to_string())
}

#[tokio::test]
#[ignore = "requires BLE hardware"]
async fn test_establish_and_read() {
    let transport: Arc<dyn BleTransport> =
        Arc::new(BtleplugTransport::new().await.expect("no adapter"));

    let config = SessionConfig::default().device_name(device_name());
    let events = EventDispatcher::default();
    let mut rx = events.subscribe();
    let mut session = DeviceSession::new(Arc::clone(&transport), config, events);

    let result = timeout(TEST_TIMEOUT, session.establish()).await;
    match result {
        Ok(Ok(())) => println!("Connected to {:?}", session.device()),
        Ok(Err(e)) => panic!("Failed to establish session: {}", e),
        Err(_) => panic!("Establish timed out after {:?}", TEST_TIMEOUT),
    }

    match timeout(Duration::from_secs(15), session.read_sample()).await {
        Ok(Ok(readout)) => {
            println!("Temperature: {:.1} °C", readout.temperature);
            println!("Humidity: {:.1} %", readout.humidity);
        }
        Ok(Err(e)) => eprintln!("Failed to read: {}", e),
        Err(_) => eprintln!("Read timed out"),
    }

    while let Ok(event) = rx.try_recv() {
        println!("  event: {}", event);
    }

    session.disconnect().await.ok();
    transport.shutdown().await.ok();
}

#[tokio::test]
#[ignore = "requires BLE hardware"]
async fn test_repeated_reads_over_one_connection() {
    let transport: Arc<dyn BleTransport> =
        Arc::new(BtleplugTransport::new().await.expect("no adapter"));

    let config = SessionConfig::default().device_name(device_name());
    let mut session = DeviceSession::new(Arc::clone(&transport), config, EventDispatcher::default());

    timeout(TEST_TIMEOUT, session.establish())
        .await
        .expect("establish timed out")
        .expect("failed to establish");

    for attempt in 1..=3 {
        match session.read_sample().await {
            Ok(readout) => println!(
                "[{}] {:.1} °C, {:.1} %",
                attempt, readout.temperature, readout.humidity
            ),
            Err(e) => eprintln!("[{}] read failed: {}", attempt, e),
        }
        tokio::time::sleep(Duration::from_secs(2)).await;
    }

    session.disconnect().await.ok();
    transport.shutdown().await.ok();
}
