//! Bluetooth identifiers for the field sensor.
//!
//! These are fixed configuration constants matching the ESP32 firmware.
//! They can be overridden at runtime through the CLI configuration file.

use uuid::{Uuid, uuid};

/// Default advertised name of the target peripheral.
pub const DEFAULT_DEVICE_NAME: &str = "MyESP32";

/// Environmental sensing service exposed by the sensor firmware.
pub const SENSOR_SERVICE: Uuid = uuid!("00001234-0000-1000-8000-00805f9b34fb");

/// Temperature characteristic (base64-encoded UTF-8 text, degrees Celsius).
pub const TEMPERATURE_CHARACTERISTIC: Uuid = uuid!("00005678-0000-1000-8000-00805f9b34fb");

/// Humidity characteristic (base64-encoded UTF-8 text, percent relative humidity).
pub const HUMIDITY_CHARACTERISTIC: Uuid = uuid!("00005679-0000-1000-8000-00805f9b34fb");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_service_uuid() {
        let expected = "00001234-0000-1000-8000-00805f9b34fb";
        assert_eq!(SENSOR_SERVICE.to_string(), expected);
    }

    #[test]
    fn test_characteristic_uuids_are_distinct() {
        assert_ne!(TEMPERATURE_CHARACTERISTIC, HUMIDITY_CHARACTERISTIC);
        assert_eq!(
            TEMPERATURE_CHARACTERISTIC.to_string(),
            "00005678-0000-1000-8000-00805f9b34fb"
        );
        assert_eq!(
            HUMIDITY_CHARACTERISTIC.to_string(),
            "00005679-0000-1000-8000-00805f9b34fb"
        );
    }

    #[test]
    fn test_default_device_name() {
        assert_eq!(DEFAULT_DEVICE_NAME, "MyESP32");
    }
}
