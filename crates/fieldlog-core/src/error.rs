//! Error types for fieldlog-core.
//!
//! Every error is caught at the operation boundary where it occurs and
//! converted to a status string for the caller; nothing is swallowed and
//! nothing triggers an automatic retry. The user re-issues the command.

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while driving a device session.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Bluetooth Low Energy transport error, surfaced verbatim.
    #[error("Bluetooth error: {0}")]
    Bluetooth(#[from] btleplug::Error),

    /// Bluetooth adapter missing or powered off.
    #[error("Bluetooth unavailable: {0}")]
    BluetoothUnavailable(String),

    /// A required capability was not granted.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Scanning failed or ended without a match.
    #[error("scan failed: {0}")]
    Scan(String),

    /// Connection attempt failed.
    #[error("connect failed: {0}")]
    Connect(String),

    /// Service discovery failed after connecting.
    #[error("service discovery failed: {0}")]
    Discovery(String),

    /// A characteristic read failed.
    #[error("read failed for characteristic {characteristic}: {message}")]
    Read {
        /// The characteristic that could not be read.
        characteristic: Uuid,
        /// The underlying transport message.
        message: String,
    },

    /// A characteristic payload could not be decoded into a measurement.
    #[error("could not decode payload: {0}")]
    Decode(#[from] fieldlog_types::ParseError),

    /// The position provider could not produce a fix.
    #[error("location fix unavailable: {0}")]
    Location(String),

    /// Operation attempted while not connected to the device.
    #[error("not connected to device")]
    NotConnected,

    /// A session phase exceeded its configured timeout.
    #[error("operation '{operation}' timed out after {duration:?}")]
    Timeout {
        /// The phase that timed out.
        operation: String,
        /// The timeout that was exceeded.
        duration: Duration,
    },

    /// Operation was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// Record store error.
    #[error(transparent)]
    Storage(#[from] fieldlog_store::Error),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a timeout error with phase context.
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a read error for a specific characteristic.
    pub fn read(characteristic: Uuid, message: impl Into<String>) -> Self {
        Self::Read {
            characteristic,
            message: message.into(),
        }
    }
}

/// Result type alias using fieldlog-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;
