//! Core BLE session machine for the fieldlog sensor logger.
//!
//! This crate drives one named BLE peripheral (an ESP32 field sensor
//! exposing temperature and humidity characteristics) through the
//! scan, filter, connect, discover, read lifecycle, and orchestrates it
//! with a position provider and the append-only record store.
//!
//! # Components
//!
//! - [`DeviceSession`]: the connection state machine over one peripheral
//! - [`SessionController`]: the user-facing command surface
//!   (scan-and-connect, take-reading, share, two-phase clear)
//! - [`BleTransport`] / [`GpsProvider`] / [`PermissionGate`]: collaborator
//!   traits, with the real transport in [`transport`] and mocks in [`mock`]
//! - [`SessionEvent`]: the observable status stream
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use fieldlog_core::{
//!     AdapterPermissions, BtleplugTransport, NoGps, SessionConfig, SessionController,
//! };
//! use fieldlog_store::RecordStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = Arc::new(BtleplugTransport::new().await?);
//!     let permissions = AdapterPermissions::new(transport.clone());
//!     let mut controller = SessionController::new(
//!         transport,
//!         Arc::new(NoGps),
//!         &permissions,
//!         RecordStore::open_default(),
//!         SessionConfig::default(),
//!     )
//!     .await;
//!
//!     controller.scan_and_connect().await?;
//!     let sample = controller.take_reading().await?;
//!     println!("{} °C, {} %", sample.temperature, sample.humidity);
//!
//!     controller.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod controller;
pub mod error;
pub mod events;
pub mod gps;
pub mod mock;
pub mod permission;
pub mod session;
pub mod traits;
pub mod transport;

pub use controller::{ClearOutcome, SessionController};
pub use error::{Error, Result};
pub use events::{EventDispatcher, EventReceiver, EventSender, SessionEvent};
pub use gps::{ManualGps, NoGps};
pub use mock::{MockGps, MockTransport};
pub use permission::AdapterPermissions;
pub use session::{DeviceSession, FoundDevice, SensorReadout, SessionConfig, SessionState};
pub use traits::{
    AdapterState, Advertisement, BleTransport, GpsProvider, LinkEvent, PermissionGate, Scope,
};
pub use transport::BtleplugTransport;

// Re-export the shared value types.
pub use fieldlog_types::{GeoFix, Sample, uuids};
