//! Mock collaborators for testing without BLE hardware or a position source.
//!
//! [`MockTransport`] implements [`BleTransport`] with scripted
//! advertisements, per-characteristic payloads, and failure injection, so
//! the session machine and controller can be exercised deterministically.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use fieldlog_types::GeoFix;

use crate::error::{Error, Result};
use crate::traits::{
    AdapterState, Advertisement, BleTransport, GpsProvider, LinkEvent,
};

/// A scripted BLE transport.
///
/// Advertisements queued with [`advertise`](Self::advertise) are delivered
/// on the next [`start_scan`](BleTransport::start_scan); the stream then
/// closes unless [`keep_scan_open`](Self::keep_scan_open) was requested.
pub struct MockTransport {
    advertisements: Mutex<Vec<Advertisement>>,
    characteristics: Mutex<HashMap<Uuid, Vec<u8>>>,
    failed_reads: Mutex<HashSet<Uuid>>,
    open_scan: Mutex<Option<mpsc::Sender<Advertisement>>>,
    link_tx: broadcast::Sender<LinkEvent>,
    last_connected: Mutex<Option<String>>,
    connected: AtomicBool,
    scanning: AtomicBool,
    powered_on: AtomicBool,
    fail_connect: AtomicBool,
    fail_discovery: AtomicBool,
    hold_scan_open: AtomicBool,
    advert_counter: AtomicU32,
    connect_count: AtomicU32,
    read_count: AtomicU32,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("connected", &self.connected.load(Ordering::Relaxed))
            .field("scanning", &self.scanning.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Create a powered-on transport with an empty script.
    pub fn new() -> Self {
        let (link_tx, _) = broadcast::channel(16);
        Self {
            advertisements: Mutex::new(Vec::new()),
            characteristics: Mutex::new(HashMap::new()),
            failed_reads: Mutex::new(HashSet::new()),
            open_scan: Mutex::new(None),
            link_tx,
            last_connected: Mutex::new(None),
            connected: AtomicBool::new(false),
            scanning: AtomicBool::new(false),
            powered_on: AtomicBool::new(true),
            fail_connect: AtomicBool::new(false),
            fail_discovery: AtomicBool::new(false),
            hold_scan_open: AtomicBool::new(false),
            advert_counter: AtomicU32::new(0),
            connect_count: AtomicU32::new(0),
            read_count: AtomicU32::new(0),
        }
    }

    /// Queue an advertisement for the next scan.
    pub fn advertise(&self, name: Option<&str>) {
        let n = self.advert_counter.fetch_add(1, Ordering::Relaxed);
        self.advertisements
            .lock()
            .expect("advertisements lock")
            .push(Advertisement {
                identifier: format!("mock-{:04}", n),
                name: name.map(|s| s.to_string()),
                rssi: Some(-60),
            });
    }

    /// Set the payload returned for a characteristic.
    pub fn set_characteristic(&self, characteristic: Uuid, payload: &[u8]) {
        self.characteristics
            .lock()
            .expect("characteristics lock")
            .insert(characteristic, payload.to_vec());
    }

    /// Make reads of a characteristic fail.
    pub fn fail_read(&self, characteristic: Uuid) {
        self.failed_reads
            .lock()
            .expect("failed_reads lock")
            .insert(characteristic);
    }

    /// Stop failing reads of a characteristic.
    pub fn clear_read_failure(&self, characteristic: Uuid) {
        self.failed_reads
            .lock()
            .expect("failed_reads lock")
            .remove(&characteristic);
    }

    /// Make the next connect attempt fail.
    pub fn set_fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::Relaxed);
    }

    /// Make service discovery fail.
    pub fn set_fail_discovery(&self, fail: bool) {
        self.fail_discovery.store(fail, Ordering::Relaxed);
    }

    /// Report the adapter as powered off.
    pub fn set_powered_on(&self, powered: bool) {
        self.powered_on.store(powered, Ordering::Relaxed);
    }

    /// Keep the advertisement stream open after the script is exhausted,
    /// so scan timeouts can be exercised.
    pub fn keep_scan_open(&self) {
        self.hold_scan_open.store(true, Ordering::Relaxed);
    }

    /// Simulate an asynchronous link loss of the connected peripheral.
    pub fn drop_link(&self) {
        self.connected.store(false, Ordering::Relaxed);
        if let Some(identifier) = self
            .last_connected
            .lock()
            .expect("last_connected lock")
            .clone()
        {
            let _ = self.link_tx.send(LinkEvent::Disconnected { identifier });
        }
    }

    /// Number of connect attempts made.
    pub fn connect_count(&self) -> u32 {
        self.connect_count.load(Ordering::Relaxed)
    }

    /// Number of characteristic reads attempted.
    pub fn read_count(&self) -> u32 {
        self.read_count.load(Ordering::Relaxed)
    }

    /// Whether a scan is currently running.
    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::Relaxed)
    }

    /// Whether a peripheral is currently connected.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl BleTransport for MockTransport {
    async fn adapter_state(&self) -> Result<AdapterState> {
        if self.powered_on.load(Ordering::Relaxed) {
            Ok(AdapterState::PoweredOn)
        } else {
            Ok(AdapterState::PoweredOff)
        }
    }

    async fn start_scan(&self) -> Result<mpsc::Receiver<Advertisement>> {
        let script: Vec<Advertisement> =
            self.advertisements.lock().expect("advertisements lock").drain(..).collect();
        let (tx, rx) = mpsc::channel(script.len().max(1) + 1);
        for advertisement in script {
            // Capacity covers the whole script, so try_send cannot fail.
            let _ = tx.try_send(advertisement);
        }
        if self.hold_scan_open.load(Ordering::Relaxed) {
            *self.open_scan.lock().expect("open_scan lock") = Some(tx);
        }
        self.scanning.store(true, Ordering::Relaxed);
        Ok(rx)
    }

    async fn stop_scan(&self) -> Result<()> {
        self.scanning.store(false, Ordering::Relaxed);
        self.open_scan.lock().expect("open_scan lock").take();
        Ok(())
    }

    fn link_events(&self) -> broadcast::Receiver<LinkEvent> {
        self.link_tx.subscribe()
    }

    async fn connect(&self, identifier: &str) -> Result<()> {
        self.connect_count.fetch_add(1, Ordering::Relaxed);
        if self.fail_connect.load(Ordering::Relaxed) {
            return Err(Error::Connect("simulated connect failure".to_string()));
        }
        self.connected.store(true, Ordering::Relaxed);
        *self.last_connected.lock().expect("last_connected lock") =
            Some(identifier.to_string());
        Ok(())
    }

    async fn discover_services(&self, _identifier: &str) -> Result<()> {
        if !self.connected.load(Ordering::Relaxed) {
            return Err(Error::NotConnected);
        }
        if self.fail_discovery.load(Ordering::Relaxed) {
            return Err(Error::Discovery(
                "simulated discovery failure".to_string(),
            ));
        }
        Ok(())
    }

    async fn read_characteristic(
        &self,
        _identifier: &str,
        _service: Uuid,
        characteristic: Uuid,
    ) -> Result<Vec<u8>> {
        self.read_count.fetch_add(1, Ordering::Relaxed);
        if !self.connected.load(Ordering::Relaxed) {
            return Err(Error::NotConnected);
        }
        if self
            .failed_reads
            .lock()
            .expect("failed_reads lock")
            .contains(&characteristic)
        {
            return Err(Error::read(characteristic, "simulated read failure"));
        }
        self.characteristics
            .lock()
            .expect("characteristics lock")
            .get(&characteristic)
            .cloned()
            .ok_or_else(|| Error::read(characteristic, "characteristic not found"))
    }

    async fn disconnect(&self, _identifier: &str) -> Result<()> {
        self.connected.store(false, Ordering::Relaxed);
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        self.stop_scan().await
    }
}

/// A scripted position provider.
pub struct MockGps {
    fix: Option<GeoFix>,
}

impl MockGps {
    /// Always return the given fix.
    pub fn new(fix: GeoFix) -> Self {
        Self { fix: Some(fix) }
    }

    /// Always fail to acquire a fix.
    pub fn failing() -> Self {
        Self { fix: None }
    }
}

#[async_trait]
impl GpsProvider for MockGps {
    async fn current_fix(&self) -> Result<GeoFix> {
        self.fix
            .ok_or_else(|| Error::Location("simulated fix failure".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scan_delivers_script_then_closes() {
        let transport = MockTransport::new();
        transport.advertise(Some("A"));
        transport.advertise(None);

        let mut rx = transport.start_scan().await.unwrap();
        assert_eq!(rx.recv().await.unwrap().name.as_deref(), Some("A"));
        assert_eq!(rx.recv().await.unwrap().name, None);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_read_requires_connection() {
        let transport = MockTransport::new();
        transport.set_characteristic(Uuid::nil(), b"MjUuNQ==");

        let err = transport
            .read_characteristic("mock-0000", Uuid::nil(), Uuid::nil())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotConnected));

        transport.connect("mock-0000").await.unwrap();
        let data = transport
            .read_characteristic("mock-0000", Uuid::nil(), Uuid::nil())
            .await
            .unwrap();
        assert_eq!(data, b"MjUuNQ==");
    }

    #[tokio::test]
    async fn test_drop_link_notifies_subscribers() {
        let transport = MockTransport::new();
        let mut rx = transport.link_events();

        transport.connect("mock-0007").await.unwrap();
        transport.drop_link();

        match rx.recv().await.unwrap() {
            LinkEvent::Disconnected { identifier } => assert_eq!(identifier, "mock-0007"),
        }
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_mock_gps() {
        let gps = MockGps::new(GeoFix::new(1.0, 2.0));
        assert_eq!(gps.current_fix().await.unwrap().latitude, 1.0);

        let err = MockGps::failing().current_fix().await.unwrap_err();
        assert!(matches!(err, Error::Location(_)));
    }
}
