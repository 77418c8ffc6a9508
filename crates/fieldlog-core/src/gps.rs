//! Position providers.
//!
//! No portable host GPS interface exists for desktop platforms, so the
//! shipped providers are a configured fixed coordinate and an always-failing
//! placeholder. Anything that can produce a [`GeoFix`] can implement
//! [`GpsProvider`] and be dropped in.

use async_trait::async_trait;

use fieldlog_types::GeoFix;

use crate::error::{Error, Result};
use crate::traits::GpsProvider;

/// Fixed-coordinate provider for stationary logging hosts.
///
/// The coordinate comes from configuration; every fix request succeeds
/// immediately with the same position.
#[derive(Debug, Clone, Copy)]
pub struct ManualGps {
    fix: GeoFix,
}

impl ManualGps {
    /// Always report the given position.
    pub fn new(fix: GeoFix) -> Self {
        Self { fix }
    }
}

#[async_trait]
impl GpsProvider for ManualGps {
    async fn current_fix(&self) -> Result<GeoFix> {
        Ok(self.fix)
    }
}

/// Provider used when no position source is configured; every fix attempt
/// fails with a location error, which aborts the reading.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGps;

#[async_trait]
impl GpsProvider for NoGps {
    async fn current_fix(&self) -> Result<GeoFix> {
        Err(Error::Location(
            "no position source configured; set [gps] latitude and longitude in the config file"
                .to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_manual_gps_returns_configured_fix() {
        let gps = ManualGps::new(GeoFix::new(56.9496, 24.1052));
        let fix = gps.current_fix().await.unwrap();
        assert_eq!(fix.latitude, 56.9496);
        assert_eq!(fix.longitude, 24.1052);
    }

    #[tokio::test]
    async fn test_no_gps_always_fails() {
        let err = NoGps.current_fix().await.unwrap_err();
        assert!(matches!(err, Error::Location(_)));
    }
}
