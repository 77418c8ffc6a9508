//! Session event stream for status reporting.
//!
//! Every lifecycle step emits a [`SessionEvent`]; observers (the CLI's
//! status printer, a future notification surface) subscribe through the
//! dispatcher. The `Display` rendering is the short human-readable status
//! string shown to the user.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events emitted while driving the session and the record store.
///
/// All events are serializable for logging and IPC.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new event types
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum SessionEvent {
    /// Scanning started.
    ScanStarted,
    /// An advertisement was observed (every advertisement, not only matches).
    AdvertisementSeen {
        /// Advertised name, absent for anonymous peripherals.
        name: Option<String>,
    },
    /// The target device was found and scanning stopped.
    DeviceFound {
        /// The matched advertised name.
        name: String,
        /// Transport identifier of the match.
        identifier: String,
    },
    /// Connection attempt started.
    Connecting {
        /// Transport identifier being connected.
        identifier: String,
    },
    /// Capability discovery started.
    Discovering,
    /// The session reached the ready state.
    Connected {
        /// Name of the connected device.
        name: String,
    },
    /// Characteristic reads started.
    Reading,
    /// Both characteristics were read and decoded.
    SampleTaken {
        /// Temperature in degrees Celsius.
        temperature: f64,
        /// Relative humidity in percent.
        humidity: f64,
    },
    /// A record was appended to the log.
    Appended,
    /// The link to the device was lost.
    Disconnected {
        /// Transport identifier of the lost device.
        identifier: String,
    },
    /// The log file was cleared.
    Cleared,
    /// The log file was exported.
    Exported {
        /// Where the export landed.
        destination: String,
    },
    /// A command failed; the message is the rendered error.
    Error {
        /// Human-readable failure description.
        message: String,
    },
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEvent::ScanStarted => write!(f, "Starting scan..."),
            SessionEvent::AdvertisementSeen { name: Some(name) } => {
                write!(f, "Found device: {}", name)
            }
            SessionEvent::AdvertisementSeen { name: None } => {
                write!(f, "Found device with no name")
            }
            SessionEvent::DeviceFound { name, .. } => {
                write!(f, "Found target device {}, stopping scan...", name)
            }
            SessionEvent::Connecting { .. } => write!(f, "Connecting to device..."),
            SessionEvent::Discovering => {
                write!(f, "Discovering services and characteristics...")
            }
            SessionEvent::Connected { name } => write!(f, "Connected to {}", name),
            SessionEvent::Reading => write!(f, "Reading data from device..."),
            SessionEvent::SampleTaken {
                temperature,
                humidity,
            } => write!(f, "Read {} °C, {} %", temperature, humidity),
            SessionEvent::Appended => write!(f, "Data appended!"),
            SessionEvent::Disconnected { identifier } => {
                write!(f, "Device disconnected: {}", identifier)
            }
            SessionEvent::Cleared => write!(f, "File cleared!"),
            SessionEvent::Exported { destination } => {
                write!(f, "Log exported to {}", destination)
            }
            SessionEvent::Error { message } => write!(f, "Error: {}", message),
        }
    }
}

/// Sender for session events.
pub type EventSender = broadcast::Sender<SessionEvent>;

/// Receiver for session events.
pub type EventReceiver = broadcast::Receiver<SessionEvent>;

/// Event dispatcher fanning session events out to any number of observers.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    sender: EventSender,
}

impl EventDispatcher {
    /// Create a new dispatcher with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events.
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Send an event. Dropped silently when nobody is subscribed.
    pub fn send(&self, event: SessionEvent) {
        let _ = self.sender.send(event);
    }

    /// Number of active receivers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_status_strings() {
        assert_eq!(SessionEvent::ScanStarted.to_string(), "Starting scan...");
        assert_eq!(
            SessionEvent::AdvertisementSeen {
                name: Some("MyESP32".into())
            }
            .to_string(),
            "Found device: MyESP32"
        );
        assert_eq!(
            SessionEvent::AdvertisementSeen { name: None }.to_string(),
            "Found device with no name"
        );
        assert_eq!(SessionEvent::Appended.to_string(), "Data appended!");
        assert_eq!(SessionEvent::Cleared.to_string(), "File cleared!");
    }

    #[test]
    fn test_event_serialization() {
        let event = SessionEvent::SampleTaken {
            temperature: 25.5,
            humidity: 60.0,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"sample_taken\""));
        assert!(json.contains("25.5"));
    }

    #[tokio::test]
    async fn test_dispatcher_fan_out() {
        let dispatcher = EventDispatcher::new(8);
        let mut rx1 = dispatcher.subscribe();
        let mut rx2 = dispatcher.subscribe();

        dispatcher.send(SessionEvent::ScanStarted);

        assert!(matches!(rx1.recv().await, Ok(SessionEvent::ScanStarted)));
        assert!(matches!(rx2.recv().await, Ok(SessionEvent::ScanStarted)));
    }

    #[test]
    fn test_dispatcher_send_without_subscribers() {
        let dispatcher = EventDispatcher::new(8);
        dispatcher.send(SessionEvent::Reading);
        assert_eq!(dispatcher.receiver_count(), 0);
    }
}
