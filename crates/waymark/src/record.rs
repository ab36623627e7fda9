//! Core location types for waymark.
//!
//! This module defines the fundamental data structures for representing
//! a named, saved location and a raw sensor reading.

use serde::{Deserialize, Serialize};

/// A single instantaneous position reading from the location sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Altitude in meters, if the sensor reported one.
    pub altitude: Option<f64>,
}

impl Fix {
    /// Create a new fix without altitude.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
        }
    }

    /// Create a new fix with an altitude reading.
    #[must_use]
    pub fn with_altitude(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: Some(altitude),
        }
    }
}

impl std::fmt::Display for Fix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.altitude {
            Some(alt) => write!(
                f,
                "{}, {} (alt {})",
                self.latitude, self.longitude, alt
            ),
            None => write!(f, "{}, {}", self.latitude, self.longitude),
        }
    }
}

/// A named, saved location.
///
/// Coordinates are stored as the decimal-text rendering of the sensor's
/// floating-point reading, so the persisted form is exactly what the user
/// saw when the location was captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// The user-supplied name. Unique within a ledger.
    pub name: String,

    /// Latitude as decimal text.
    pub latitude: String,

    /// Longitude as decimal text.
    pub longitude: String,
}

impl LocationRecord {
    /// Create a record from a name and already-formatted coordinates.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        latitude: impl Into<String>,
        longitude: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }

    /// Create a record from a sensor fix.
    ///
    /// The fix's coordinates are rendered with `f64`'s default formatting.
    /// Altitude is not persisted.
    #[must_use]
    pub fn from_fix(name: impl Into<String>, fix: &Fix) -> Self {
        Self {
            name: name.into(),
            latitude: fix.latitude.to_string(),
            longitude: fix.longitude.to_string(),
        }
    }

    /// Both coordinates as a single `"lat, lon"` string, for clipboard use.
    #[must_use]
    pub fn coordinates(&self) -> String {
        format!("{}, {}", self.latitude, self.longitude)
    }
}

impl std::fmt::Display for LocationRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: Latitude: {} Longitude: {}",
            self.name, self.latitude, self.longitude
        )
    }
}
