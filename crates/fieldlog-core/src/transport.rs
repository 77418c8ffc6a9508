//! btleplug-backed implementation of the BLE transport.
//!
//! One [`BtleplugTransport`] is created per process and shared by handle.
//! A single background task pumps the adapter's event stream: while a scan
//! is active, discovered and updated peripherals are resolved to
//! [`Advertisement`]s and forwarded to the scan receiver; disconnect events
//! are broadcast as link-loss notifications at all times.

use std::collections::HashMap;
use std::sync::Arc;

use btleplug::api::{Central, CentralEvent, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::StreamExt;
use tokio::sync::{Mutex, RwLock, broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::traits::{AdapterState, Advertisement, BleTransport, LinkEvent};

use async_trait::async_trait;

struct Shared {
    /// Peripherals seen in the current process, keyed by transport identifier.
    peripherals: RwLock<HashMap<String, Peripheral>>,
    /// Destination for advertisements while a scan is active.
    scan_sink: Mutex<Option<mpsc::Sender<Advertisement>>>,
    link_tx: broadcast::Sender<LinkEvent>,
}

/// Process-scoped BLE transport over the first available adapter.
pub struct BtleplugTransport {
    adapter: Adapter,
    shared: Arc<Shared>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl BtleplugTransport {
    /// Acquire the first Bluetooth adapter and start the event pump.
    ///
    /// # Errors
    ///
    /// [`Error::BluetoothUnavailable`] when no adapter is present;
    /// transport errors from the underlying stack otherwise.
    pub async fn new() -> Result<Self> {
        let manager = Manager::new().await?;
        let adapters = manager.adapters().await?;
        let adapter = adapters.into_iter().next().ok_or_else(|| {
            Error::BluetoothUnavailable("no Bluetooth adapter available".to_string())
        })?;

        let (link_tx, _) = broadcast::channel(16);
        let shared = Arc::new(Shared {
            peripherals: RwLock::new(HashMap::new()),
            scan_sink: Mutex::new(None),
            link_tx,
        });

        let mut events = adapter.events().await?;
        let pump_adapter = adapter.clone();
        let pump_shared = Arc::clone(&shared);
        let pump = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                handle_central_event(&pump_adapter, &pump_shared, event).await;
            }
            debug!("Adapter event stream ended");
        });

        info!("Bluetooth transport ready");
        Ok(Self {
            adapter,
            shared,
            pump: Mutex::new(Some(pump)),
        })
    }

    async fn peripheral(&self, identifier: &str) -> Result<Peripheral> {
        self.shared
            .peripherals
            .read()
            .await
            .get(identifier)
            .cloned()
            .ok_or_else(|| {
                Error::Connect(format!(
                    "device '{}' was not discovered in this scan cycle",
                    identifier
                ))
            })
    }
}

async fn handle_central_event(adapter: &Adapter, shared: &Shared, event: CentralEvent) {
    match event {
        CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) => {
            let sink = shared.scan_sink.lock().await.clone();
            let Some(sink) = sink else {
                return;
            };
            let Ok(peripheral) = adapter.peripheral(&id).await else {
                return;
            };
            let properties = peripheral.properties().await.ok().flatten();
            let advertisement = Advertisement {
                identifier: id.to_string(),
                name: properties.as_ref().and_then(|p| p.local_name.clone()),
                rssi: properties.as_ref().and_then(|p| p.rssi),
            };
            shared
                .peripherals
                .write()
                .await
                .insert(advertisement.identifier.clone(), peripheral);
            if sink.send(advertisement).await.is_err() {
                // Receiver dropped: the scan consumer is gone.
                shared.scan_sink.lock().await.take();
            }
        }
        CentralEvent::DeviceDisconnected(id) => {
            warn!("Peripheral disconnected: {}", id);
            let _ = shared.link_tx.send(LinkEvent::Disconnected {
                identifier: id.to_string(),
            });
        }
        _ => {}
    }
}

#[async_trait]
impl BleTransport for BtleplugTransport {
    async fn adapter_state(&self) -> Result<AdapterState> {
        // btleplug exposes no portable power-state query; a responsive
        // adapter_info call is the closest available probe.
        match self.adapter.adapter_info().await {
            Ok(_) => Ok(AdapterState::PoweredOn),
            Err(e) => {
                debug!("Adapter probe failed: {}", e);
                Ok(AdapterState::PoweredOff)
            }
        }
    }

    async fn start_scan(&self) -> Result<mpsc::Receiver<Advertisement>> {
        let (tx, rx) = mpsc::channel(64);
        *self.shared.scan_sink.lock().await = Some(tx);
        if let Err(e) = self.adapter.start_scan(ScanFilter::default()).await {
            self.shared.scan_sink.lock().await.take();
            return Err(Error::Scan(e.to_string()));
        }
        info!("BLE scan started");
        Ok(rx)
    }

    async fn stop_scan(&self) -> Result<()> {
        if self.shared.scan_sink.lock().await.take().is_some() {
            self.adapter.stop_scan().await?;
            info!("BLE scan stopped");
        }
        Ok(())
    }

    fn link_events(&self) -> broadcast::Receiver<LinkEvent> {
        self.shared.link_tx.subscribe()
    }

    async fn connect(&self, identifier: &str) -> Result<()> {
        let peripheral = self.peripheral(identifier).await?;
        peripheral.connect().await?;
        Ok(())
    }

    async fn discover_services(&self, identifier: &str) -> Result<()> {
        let peripheral = self.peripheral(identifier).await?;
        peripheral.discover_services().await?;
        debug!(
            "Discovered {} services on {}",
            peripheral.services().len(),
            identifier
        );
        Ok(())
    }

    async fn read_characteristic(
        &self,
        identifier: &str,
        service: Uuid,
        characteristic: Uuid,
    ) -> Result<Vec<u8>> {
        let peripheral = self.peripheral(identifier).await?;
        let services = peripheral.services();
        let service_count = services.len();

        let target_service = services
            .iter()
            .find(|s| s.uuid == service)
            .ok_or_else(|| {
                Error::Discovery(format!(
                    "service {} not found ({} services discovered)",
                    service, service_count
                ))
            })?;
        let target = target_service
            .characteristics
            .iter()
            .find(|c| c.uuid == characteristic)
            .ok_or_else(|| {
                Error::read(
                    characteristic,
                    format!("characteristic not found under service {}", service),
                )
            })?;

        peripheral
            .read(target)
            .await
            .map_err(|e| Error::read(characteristic, e.to_string()))
    }

    async fn disconnect(&self, identifier: &str) -> Result<()> {
        let peripheral = self.peripheral(identifier).await?;
        peripheral.disconnect().await?;
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        self.stop_scan().await.ok();

        let peripherals: Vec<Peripheral> = self
            .shared
            .peripherals
            .read()
            .await
            .values()
            .cloned()
            .collect();
        for peripheral in peripherals {
            if peripheral.is_connected().await.unwrap_or(false) {
                peripheral.disconnect().await.ok();
            }
        }

        if let Some(pump) = self.pump.lock().await.take() {
            pump.abort();
        }
        info!("Bluetooth transport shut down");
        Ok(())
    }
}
