//! Orchestration of session, store, and position provider.
//!
//! [`SessionController`] turns the collaborators into the user-facing
//! commands: scan-and-connect, take-reading, share, and the two-phase
//! destructive clear. Commands are idempotent at the command level and
//! serialized per controller; every failure is surfaced as a status event
//! and as the returned error, and nothing retries on its own.

use std::path::PathBuf;
use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, warn};

use fieldlog_store::{ExportSink, RecordStore};
use fieldlog_types::Sample;

use crate::error::{Error, Result};
use crate::events::{EventDispatcher, EventReceiver, SessionEvent};
use crate::session::{DeviceSession, SessionConfig, SessionState};
use crate::traits::{BleTransport, GpsProvider, PermissionGate, Scope};

/// Outcome of the second phase of a clear request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// No clear was pending; the store was left untouched.
    NotRequested,
    /// The pending request was executed; the store is now empty.
    Cleared,
}

/// Single-session command surface over one device, one store, and one
/// position provider.
pub struct SessionController {
    session: DeviceSession,
    store: RecordStore,
    gps: Arc<dyn GpsProvider>,
    transport: Arc<dyn BleTransport>,
    events: EventDispatcher,
    clear_pending: bool,
}

impl SessionController {
    /// Wire up the controller and run the one-time capability check.
    ///
    /// A denied capability is logged as a warning, never fatal to
    /// construction; the affected command fails when invoked.
    pub async fn new(
        transport: Arc<dyn BleTransport>,
        gps: Arc<dyn GpsProvider>,
        permissions: &dyn PermissionGate,
        store: RecordStore,
        config: SessionConfig,
    ) -> Self {
        if !permissions
            .ensure_granted(&[Scope::Bluetooth, Scope::Location])
            .await
        {
            warn!("Some capabilities were not granted; commands may fail at runtime");
        }

        let events = EventDispatcher::default();
        let session = DeviceSession::new(Arc::clone(&transport), config, events.clone());
        Self {
            session,
            store,
            gps,
            transport,
            events,
            clear_pending: false,
        }
    }

    /// Subscribe to the status event stream.
    pub fn subscribe(&self) -> EventReceiver {
        self.events.subscribe()
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Identity of the matched device, if any.
    pub fn device(&self) -> Option<&crate::session::FoundDevice> {
        self.session.device()
    }

    /// Handle for cancelling an in-progress scan from another task.
    pub fn cancel_token(&self) -> tokio_util::sync::CancellationToken {
        self.session.cancel_token()
    }

    /// Path of the underlying log file.
    pub fn log_path(&self) -> &std::path::Path {
        self.store.path()
    }

    /// Drive the session to ready. A no-op when already connected.
    pub async fn scan_and_connect(&mut self) -> Result<()> {
        if self.session.is_ready() {
            debug!("Already connected; scan request is a no-op");
            return Ok(());
        }
        let result = self.session.establish().await;
        self.report(result)
    }

    /// Take one reading: acquire a position fix, read the sensor, stamp the
    /// current time, and append the record.
    ///
    /// Fails immediately with [`Error::NotConnected`] when the session is
    /// not ready, without touching the store. Any failure aborts the whole
    /// reading; re-invoke to retry.
    pub async fn take_reading(&mut self) -> Result<Sample> {
        if !self.session.is_ready() {
            return self.report(Err(Error::NotConnected));
        }
        let result = self.take_reading_inner().await;
        self.report(result)
    }

    async fn take_reading_inner(&mut self) -> Result<Sample> {
        // The fix is acquired before the characteristic reads are persisted;
        // a failed fix aborts the reading rather than storing null fields.
        let fix = self.gps.current_fix().await?;
        let readout = self.session.read_sample().await?;
        let sample = Sample::new(
            OffsetDateTime::now_utc(),
            fix,
            readout.temperature,
            readout.humidity,
        );
        self.store.append(&sample)?;
        self.events.send(SessionEvent::Appended);
        Ok(sample)
    }

    /// Read the stored records, oldest first.
    pub fn read_log(&self) -> Result<Vec<Sample>> {
        self.store.read_all().map_err(Error::from)
    }

    /// Export the log through the given sink. The session is not involved.
    pub fn share_log(&self, sink: &dyn ExportSink) -> Result<PathBuf> {
        let result = self.store.export(sink).map_err(Error::from);
        match result {
            Ok(destination) => {
                self.events.send(SessionEvent::Exported {
                    destination: destination.display().to_string(),
                });
                Ok(destination)
            }
            Err(e) => self.report(Err(e)),
        }
    }

    /// First phase of a destructive clear: arm the pending request.
    pub fn request_clear(&mut self) {
        self.clear_pending = true;
    }

    /// Abandon a pending clear request.
    pub fn cancel_clear(&mut self) {
        self.clear_pending = false;
    }

    /// Whether a clear request awaits confirmation.
    pub fn clear_pending(&self) -> bool {
        self.clear_pending
    }

    /// Second phase of a destructive clear: execute the pending request.
    ///
    /// Without a prior [`request_clear`](Self::request_clear) the store is
    /// left untouched and [`ClearOutcome::NotRequested`] is returned. A
    /// pending request is consumed exactly once, whether the clear succeeds
    /// or fails.
    pub fn confirm_clear(&mut self) -> Result<ClearOutcome> {
        if !self.clear_pending {
            debug!("Clear confirmation without a pending request; ignoring");
            return Ok(ClearOutcome::NotRequested);
        }
        self.clear_pending = false;

        match self.store.clear() {
            Ok(()) => {
                self.events.send(SessionEvent::Cleared);
                Ok(ClearOutcome::Cleared)
            }
            Err(e) => self.report(Err(Error::from(e))),
        }
    }

    /// Disconnect the session and release the transport.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.session.disconnect().await.ok();
        self.transport.shutdown().await
    }

    /// Surface a failure as a status event without consuming it.
    fn report<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.events.send(SessionEvent::Error {
                message: e.to_string(),
            });
        }
        result
    }
}
