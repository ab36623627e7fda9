//! Location-sensor provider abstraction.
//!
//! This module defines the trait that sensor integrations must fulfill and
//! the fault taxonomy for a failed fix request.

use thiserror::Error;

use crate::record::Fix;

/// Ways a location-fix request can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorFault {
    /// The device has no usable location sensor.
    #[error("location sensing is not supported on this device")]
    NotSupported,

    /// The sensor exists but is switched off or unreachable.
    #[error("location sensing is not enabled: {0}")]
    NotEnabled(String),

    /// The user or OS denied access to the sensor.
    #[error("location permission denied: {0}")]
    PermissionDenied(String),

    /// Any other failure to obtain a fix.
    #[error("unable to get location: {0}")]
    Unknown(String),
}

impl SensorFault {
    /// Create a not-enabled fault.
    #[must_use]
    pub fn not_enabled(message: impl Into<String>) -> Self {
        Self::NotEnabled(message.into())
    }

    /// Create a permission-denied fault.
    #[must_use]
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }

    /// Create an unknown fault.
    #[must_use]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown(message.into())
    }

    /// Check if this fault is a permission issue.
    #[must_use]
    pub fn is_permission_fault(&self) -> bool {
        matches!(self, Self::PermissionDenied(_))
    }
}

/// A source of location fixes.
///
/// Implementors wrap a platform location API or an external sensor daemon.
/// A provider yields exactly one fix per call; polling, retry, and timeout
/// policy live behind this seam, not in the callers.
#[async_trait::async_trait]
pub trait LocationProvider: Send + Sync {
    /// The name of this provider (for logging/debugging).
    fn name(&self) -> &'static str;

    /// Request a single current-position fix.
    ///
    /// Suspends the calling flow until the sensor resolves with a fix or a
    /// fault.
    ///
    /// # Errors
    ///
    /// Returns a [`SensorFault`] describing why no fix could be obtained.
    async fn current_fix(&self) -> Result<Fix, SensorFault>;
}

/// The gpsd-backed sensor provider.
///
/// Wraps [`waymark_gpsd::GpsdClient`] and maps its errors onto the sensor
/// fault taxonomy.
#[derive(Debug, Clone)]
pub struct GpsdProvider {
    client: waymark_gpsd::GpsdClient,
}

impl GpsdProvider {
    /// Create a provider for a gpsd endpoint with a fetch deadline.
    #[must_use]
    pub fn new(addr: impl Into<String>, timeout: std::time::Duration) -> Self {
        Self {
            client: waymark_gpsd::GpsdClient::new(addr, timeout),
        }
    }
}

#[async_trait::async_trait]
impl LocationProvider for GpsdProvider {
    fn name(&self) -> &'static str {
        "gpsd"
    }

    async fn current_fix(&self) -> Result<Fix, SensorFault> {
        let fix = self.client.current_fix().await.map_err(map_gpsd_error)?;
        Ok(Fix {
            latitude: fix.latitude,
            longitude: fix.longitude,
            altitude: fix.altitude,
        })
    }
}

/// Map a gpsd client error onto the sensor fault taxonomy.
fn map_gpsd_error(err: waymark_gpsd::GpsdError) -> SensorFault {
    use waymark_gpsd::GpsdError;

    match err {
        GpsdError::NoDevices => SensorFault::NotSupported,
        GpsdError::ConnectionFailed { .. } => SensorFault::not_enabled(err.to_string()),
        GpsdError::Io(ref io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
            SensorFault::permission_denied(err.to_string())
        }
        GpsdError::Timeout { .. } | GpsdError::Protocol(_) | GpsdError::Io(_) => {
            SensorFault::unknown(err.to_string())
        }
    }
}

/// A provider that always returns the same fix. Used for manual coordinate
/// entry and in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedProvider {
    fix: Fix,
}

impl FixedProvider {
    /// Create a provider that yields the given fix.
    #[must_use]
    pub fn new(fix: Fix) -> Self {
        Self { fix }
    }
}

#[async_trait::async_trait]
impl LocationProvider for FixedProvider {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn current_fix(&self) -> Result<Fix, SensorFault> {
        Ok(self.fix)
    }
}
