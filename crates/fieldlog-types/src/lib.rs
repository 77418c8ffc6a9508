//! Platform-agnostic types for the fieldlog BLE sensor logger.
//!
//! This crate provides the shared value types used by the BLE session
//! (fieldlog-core) and the record store (fieldlog-store).
//!
//! # Features
//!
//! - [`Sample`]: one timestamped, geotagged temperature/humidity reading
//! - Record line codec: quoted CSV serialization and round-trip parsing
//! - [`decode_measurement`]: characteristic payload decoding
//! - UUID and device-name constants for the sensor firmware
//!
//! # Example
//!
//! ```
//! use fieldlog_types::{GeoFix, Sample};
//! use time::OffsetDateTime;
//!
//! let sample = Sample::new(
//!     OffsetDateTime::UNIX_EPOCH,
//!     GeoFix::new(56.95, 24.1),
//!     25.5,
//!     60.0,
//! );
//! let line = sample.to_csv_line();
//! assert_eq!(Sample::from_csv_line(&line).unwrap(), sample);
//! ```

pub mod error;
pub mod types;
pub mod uuid;

pub use error::{ParseError, ParseResult};
pub use types::{GeoFix, Sample, decode_measurement};
pub use uuid as uuids;
