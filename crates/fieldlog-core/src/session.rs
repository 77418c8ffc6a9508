//! Device session state machine.
//!
//! One [`DeviceSession`] owns the lifecycle of a single peripheral
//! connection: scan, filter by advertised name, connect, discover
//! capabilities, and read the two sensor characteristics. Discovery is
//! split from reading so a caller can retry [`read_sample`] many times over
//! one connection without re-scanning, which matters because scanning is
//! the slowest and most power-expensive phase.
//!
//! [`read_sample`]: DeviceSession::read_sample

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use fieldlog_types::{decode_measurement, uuids};

use crate::error::{Error, Result};
use crate::events::{EventDispatcher, SessionEvent};
use crate::traits::{BleTransport, LinkEvent};

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session activity yet.
    Idle,
    /// Advertisements are being inspected.
    Scanning,
    /// The target device was matched and scanning stopped.
    DeviceFound,
    /// A connection attempt is in flight.
    Connecting,
    /// Services and characteristics are being enumerated.
    Discovering,
    /// Connected and discovered; reads may be issued.
    Ready,
    /// A characteristic read cycle is in flight.
    Reading,
    /// The link was lost; a new scan cycle is required.
    Disconnected,
    /// Scan or connect failed; a new scan cycle is required.
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "idle",
            SessionState::Scanning => "scanning",
            SessionState::DeviceFound => "device found",
            SessionState::Connecting => "connecting",
            SessionState::Discovering => "discovering",
            SessionState::Ready => "ready",
            SessionState::Reading => "reading",
            SessionState::Disconnected => "disconnected",
            SessionState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Identity and per-phase timeout configuration for one session.
///
/// Each BLE phase gets its own bound; a stalled connect or read would
/// otherwise hang the command forever.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Advertised name the scan filter matches exactly.
    pub device_name: String,
    /// Service the sensor characteristics live under.
    pub service: Uuid,
    /// Temperature characteristic.
    pub temperature: Uuid,
    /// Humidity characteristic.
    pub humidity: Uuid,
    /// Bound on the whole scan phase.
    pub scan_timeout: Duration,
    /// Bound on the connection attempt.
    pub connect_timeout: Duration,
    /// Bound on capability discovery.
    pub discovery_timeout: Duration,
    /// Bound on each characteristic read.
    pub read_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            device_name: uuids::DEFAULT_DEVICE_NAME.to_string(),
            service: uuids::SENSOR_SERVICE,
            temperature: uuids::TEMPERATURE_CHARACTERISTIC,
            humidity: uuids::HUMIDITY_CHARACTERISTIC,
            scan_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(15),
            discovery_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(10),
        }
    }
}

impl SessionConfig {
    /// Create a config with default identifiers and timeouts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target device name.
    #[must_use]
    pub fn device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = name.into();
        self
    }

    /// Set the scan timeout.
    #[must_use]
    pub fn scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }

    /// Set the connect timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the discovery timeout.
    #[must_use]
    pub fn discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = timeout;
        self
    }

    /// Set the per-read timeout.
    #[must_use]
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

/// Identity of the matched peripheral.
#[derive(Debug, Clone)]
pub struct FoundDevice {
    /// Advertised name (equal to the configured target).
    pub name: String,
    /// Transport identifier used for connect/read calls.
    pub identifier: String,
}

/// Decoded values from one successful read cycle, before the position and
/// timestamp are attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReadout {
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
}

/// State machine over one BLE peripheral connection.
///
/// The session holds the transport by shared handle but owns the connection
/// exclusively while connected. Methods take `&mut self`, which serializes
/// all session activity: at most one scan, connect, or read is in flight at
/// a time.
pub struct DeviceSession {
    transport: Arc<dyn BleTransport>,
    config: SessionConfig,
    events: EventDispatcher,
    link_events: broadcast::Receiver<LinkEvent>,
    cancel: CancellationToken,
    state: SessionState,
    device: Option<FoundDevice>,
}

impl fmt::Debug for DeviceSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceSession")
            .field("state", &self.state)
            .field("device", &self.device)
            .field("target", &self.config.device_name)
            .finish_non_exhaustive()
    }
}

impl DeviceSession {
    /// Create a session over the given transport.
    pub fn new(
        transport: Arc<dyn BleTransport>,
        config: SessionConfig,
        events: EventDispatcher,
    ) -> Self {
        let link_events = transport.link_events();
        Self {
            transport,
            config,
            events,
            link_events,
            cancel: CancellationToken::new(),
            state: SessionState::Idle,
            device: None,
        }
    }

    /// Handle for cancelling an in-progress scan from another task.
    ///
    /// Cancellation aborts the scan with [`Error::Cancelled`] and returns
    /// the session to idle; [`reset`](Self::reset) re-arms it.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether reads may be issued.
    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    /// Identity of the matched device, retained after disconnect for
    /// diagnostics.
    pub fn device(&self) -> Option<&FoundDevice> {
        self.device.as_ref()
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Drive the session from idle, disconnected, or failed to ready.
    ///
    /// A no-op when already ready. Scanning stops at the first
    /// advertisement whose name equals the configured target; later
    /// duplicates are never acted upon.
    ///
    /// # Errors
    ///
    /// Scan, connect, and discovery failures leave the session in `Failed`
    /// with the underlying error; the caller re-issues `establish` to retry.
    pub async fn establish(&mut self) -> Result<()> {
        self.absorb_link_loss();
        if self.state == SessionState::Ready {
            debug!("establish: already ready");
            return Ok(());
        }

        // A rescan invalidates any previously matched identity.
        self.device = None;
        let found = self.scan_for_target().await?;
        self.connect_found(found).await
    }

    /// Read both sensor characteristics and decode them.
    ///
    /// Requires `Ready`. Both reads must succeed; on any read or decode
    /// failure the session returns to `Ready` (the connection survives) and
    /// no partial readout is produced.
    ///
    /// # Errors
    ///
    /// [`Error::NotConnected`] when the session is not ready,
    /// [`Error::Read`] for per-characteristic transport failures,
    /// [`Error::Decode`] for malformed payloads.
    pub async fn read_sample(&mut self) -> Result<SensorReadout> {
        self.absorb_link_loss();
        if self.state != SessionState::Ready {
            return Err(Error::NotConnected);
        }
        let device = match &self.device {
            Some(device) => device.clone(),
            None => return Err(Error::NotConnected),
        };

        self.state = SessionState::Reading;
        self.events.send(SessionEvent::Reading);

        let result = self.read_both(&device).await;

        // Read and decode failures leave the connection up; return to ready
        // so the caller can retry without re-scanning. A failure caused by
        // link loss is picked up on the next entry.
        self.state = SessionState::Ready;
        self.absorb_link_loss();

        if let Ok(readout) = &result {
            self.events.send(SessionEvent::SampleTaken {
                temperature: readout.temperature,
                humidity: readout.humidity,
            });
        }
        result
    }

    /// Disconnect from the device, keeping its identity for diagnostics.
    pub async fn disconnect(&mut self) -> Result<()> {
        if let Some(device) = &self.device {
            self.transport.disconnect(&device.identifier).await?;
        }
        self.state = SessionState::Disconnected;
        Ok(())
    }

    /// Reset to idle, dropping the matched identity and re-arming the
    /// cancellation token. Used before a rescan.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.device = None;
        self.cancel = CancellationToken::new();
    }

    async fn scan_for_target(&mut self) -> Result<FoundDevice> {
        self.state = SessionState::Scanning;
        self.events.send(SessionEvent::ScanStarted);
        info!("Scanning for '{}'...", self.config.device_name);

        let mut advertisements = match self.transport.start_scan().await {
            Ok(rx) => rx,
            Err(e) => {
                self.state = SessionState::Failed;
                return Err(e);
            }
        };

        let deadline = tokio::time::sleep(self.config.scan_timeout);
        tokio::pin!(deadline);
        let cancel = self.cancel.clone();

        loop {
            tokio::select! {
                advertisement = advertisements.recv() => match advertisement {
                    Some(advertisement) => {
                        self.events.send(SessionEvent::AdvertisementSeen {
                            name: advertisement.name.clone(),
                        });
                        if advertisement.name.as_deref() == Some(self.config.device_name.as_str()) {
                            // First exact match wins; stop before connecting so
                            // later duplicates are never acted upon.
                            self.transport.stop_scan().await.ok();
                            let found = FoundDevice {
                                name: self.config.device_name.clone(),
                                identifier: advertisement.identifier,
                            };
                            self.state = SessionState::DeviceFound;
                            self.events.send(SessionEvent::DeviceFound {
                                name: found.name.clone(),
                                identifier: found.identifier.clone(),
                            });
                            return Ok(found);
                        }
                    }
                    None => {
                        self.state = SessionState::Failed;
                        return Err(Error::Scan(
                            "advertisement stream ended before a match".to_string(),
                        ));
                    }
                },
                _ = cancel.cancelled() => {
                    self.transport.stop_scan().await.ok();
                    self.state = SessionState::Idle;
                    return Err(Error::Cancelled);
                }
                _ = &mut deadline => {
                    self.transport.stop_scan().await.ok();
                    self.state = SessionState::Failed;
                    return Err(Error::timeout("scan", self.config.scan_timeout));
                }
            }
        }
    }

    async fn connect_found(&mut self, found: FoundDevice) -> Result<()> {
        self.state = SessionState::Connecting;
        self.events.send(SessionEvent::Connecting {
            identifier: found.identifier.clone(),
        });

        match timeout(
            self.config.connect_timeout,
            self.transport.connect(&found.identifier),
        )
        .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                // Transport error surfaced verbatim.
                self.state = SessionState::Failed;
                return Err(e);
            }
            Err(_) => {
                self.state = SessionState::Failed;
                return Err(Error::timeout("connect", self.config.connect_timeout));
            }
        }

        self.state = SessionState::Discovering;
        self.events.send(SessionEvent::Discovering);

        match timeout(
            self.config.discovery_timeout,
            self.transport.discover_services(&found.identifier),
        )
        .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                self.state = SessionState::Failed;
                return Err(Error::Discovery(e.to_string()));
            }
            Err(_) => {
                self.state = SessionState::Failed;
                return Err(Error::timeout(
                    "discover services",
                    self.config.discovery_timeout,
                ));
            }
        }

        info!("Session ready: {}", found.name);
        self.events.send(SessionEvent::Connected {
            name: found.name.clone(),
        });
        self.device = Some(found);
        self.state = SessionState::Ready;
        Ok(())
    }

    async fn read_both(&self, device: &FoundDevice) -> Result<SensorReadout> {
        let temperature_raw = self.read_value(device, self.config.temperature).await?;
        let humidity_raw = self.read_value(device, self.config.humidity).await?;

        // Both reads succeeded; only now decode and assemble.
        let temperature = decode_measurement(&temperature_raw)?;
        let humidity = decode_measurement(&humidity_raw)?;
        Ok(SensorReadout {
            temperature,
            humidity,
        })
    }

    async fn read_value(&self, device: &FoundDevice, characteristic: Uuid) -> Result<Vec<u8>> {
        match timeout(
            self.config.read_timeout,
            self.transport
                .read_characteristic(&device.identifier, self.config.service, characteristic),
        )
        .await
        {
            Ok(Ok(data)) => Ok(data),
            Ok(Err(e @ Error::Read { .. })) => Err(e),
            Ok(Err(e)) => Err(Error::read(characteristic, e.to_string())),
            Err(_) => Err(Error::timeout(
                format!("read characteristic {}", characteristic),
                self.config.read_timeout,
            )),
        }
    }

    /// Drain pending link-loss notifications; a loss of our peripheral moves
    /// the session to `Disconnected` from any state.
    fn absorb_link_loss(&mut self) {
        loop {
            match self.link_events.try_recv() {
                Ok(LinkEvent::Disconnected { identifier }) => {
                    let ours = self
                        .device
                        .as_ref()
                        .is_some_and(|d| d.identifier == identifier);
                    if ours && self.state != SessionState::Disconnected {
                        warn!("Link lost to {}", identifier);
                        self.events
                            .send(SessionEvent::Disconnected { identifier });
                        self.state = SessionState::Disconnected;
                    }
                }
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!("Missed {} link events", skipped);
                }
                Err(_) => break,
            }
        }
    }
}
