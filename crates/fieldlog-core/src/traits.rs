//! Trait abstractions for the session's external collaborators.
//!
//! The BLE transport, position provider, and permission gate are modeled as
//! traits so the session machine and controller can be exercised against
//! mock collaborators without hardware. The real implementations live in
//! [`crate::transport`], [`crate::gps`], and [`crate::permission`].

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use fieldlog_types::GeoFix;

use crate::error::Result;

/// Power state of the Bluetooth adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    /// Adapter present and responsive.
    PoweredOn,
    /// Adapter missing, unresponsive, or radio off.
    PoweredOff,
}

/// One advertisement observed while scanning.
#[derive(Debug, Clone)]
pub struct Advertisement {
    /// Transport identifier used for connect/read calls.
    pub identifier: String,
    /// Advertised local name, if the peripheral broadcasts one.
    pub name: Option<String>,
    /// Signal strength in dBm.
    pub rssi: Option<i16>,
}

/// Asynchronous link notifications from the transport.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum LinkEvent {
    /// The peripheral dropped its connection.
    Disconnected {
        /// Transport identifier of the lost peripheral.
        identifier: String,
    },
}

/// Bluetooth Low Energy transport collaborator.
///
/// One instance is created per process and passed by handle into the session
/// at construction; teardown is explicit via [`shutdown`](Self::shutdown).
/// Scan results are delivered as a cancellable sequence of advertisement
/// events: the receiver stays live until [`stop_scan`](Self::stop_scan) is
/// called or the receiver is dropped.
#[async_trait]
pub trait BleTransport: Send + Sync {
    /// Probe the adapter power state.
    async fn adapter_state(&self) -> Result<AdapterState>;

    /// Start scanning and return the stream of observed advertisements.
    async fn start_scan(&self) -> Result<mpsc::Receiver<Advertisement>>;

    /// Stop an in-progress scan. A no-op when not scanning.
    async fn stop_scan(&self) -> Result<()>;

    /// Subscribe to asynchronous link-loss notifications.
    fn link_events(&self) -> broadcast::Receiver<LinkEvent>;

    /// Connect to a previously advertised peripheral.
    async fn connect(&self, identifier: &str) -> Result<()>;

    /// Enumerate services and characteristics on a connected peripheral.
    async fn discover_services(&self, identifier: &str) -> Result<()>;

    /// Read one characteristic value under a service.
    async fn read_characteristic(
        &self,
        identifier: &str,
        service: Uuid,
        characteristic: Uuid,
    ) -> Result<Vec<u8>>;

    /// Disconnect from a peripheral.
    async fn disconnect(&self, identifier: &str) -> Result<()>;

    /// Release adapter resources. Called once at controller shutdown.
    async fn shutdown(&self) -> Result<()>;
}

/// Position provider collaborator.
///
/// Treated as fallible and possibly slow; implementations bound their own
/// acquisition time.
#[async_trait]
pub trait GpsProvider: Send + Sync {
    /// Acquire the current position fix.
    async fn current_fix(&self) -> Result<GeoFix>;
}

/// Capability scopes checked at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Scope {
    /// Bluetooth scanning and connections.
    Bluetooth,
    /// Position access.
    Location,
}

/// Permission gate collaborator.
///
/// Consulted once at controller construction; a denial is logged, not fatal.
#[async_trait]
pub trait PermissionGate: Send + Sync {
    /// Check whether all given scopes are granted.
    async fn ensure_granted(&self, scopes: &[Scope]) -> bool;
}
