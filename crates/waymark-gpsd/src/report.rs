//! gpsd wire-protocol report types.
//!
//! gpsd emits newline-delimited JSON objects, each tagged with a `class`
//! field. Only a handful of classes matter here: `TPV` carries the position,
//! `DEVICES` tells us whether any GPS hardware is attached. Everything else
//! is noise to skip.

use serde::Deserialize;

use crate::error::GpsdError;

/// A time-position-velocity report.
///
/// Fields are optional on the wire; a TPV without a 2D-or-better mode or
/// without coordinates is a dead report the reader skips.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Tpv {
    /// NMEA fix mode: 0/1 = none, 2 = 2D, 3 = 3D.
    pub mode: Option<u8>,

    /// Latitude in decimal degrees.
    pub lat: Option<f64>,

    /// Longitude in decimal degrees.
    pub lon: Option<f64>,

    /// Altitude above the WGS84 ellipsoid, in meters (gpsd >= 3.20).
    #[serde(rename = "altHAE")]
    pub alt_hae: Option<f64>,

    /// Legacy altitude field, in meters.
    pub alt: Option<f64>,
}

impl Tpv {
    /// Extract a usable position, if this report carries one.
    ///
    /// Requires a 2D-or-better mode and both coordinates.
    #[must_use]
    pub fn position(&self) -> Option<(f64, f64, Option<f64>)> {
        if self.mode.unwrap_or(0) < 2 {
            return None;
        }
        let lat = self.lat?;
        let lon = self.lon?;
        Some((lat, lon, self.alt_hae.or(self.alt)))
    }
}

/// A device-inventory report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Devices {
    /// Attached GPS devices.
    #[serde(default)]
    pub devices: Vec<serde_json::Value>,
}

impl Devices {
    /// Check whether gpsd has any GPS hardware attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

/// A single parsed report line.
#[derive(Debug, Clone)]
pub enum Report {
    /// A position report.
    Tpv(Tpv),
    /// A device inventory.
    Devices(Devices),
    /// Any other class (VERSION, WATCH, SKY, ...).
    Other(String),
}

/// Parse one newline-delimited report from gpsd.
///
/// # Errors
///
/// Returns a protocol error if the line is not a JSON object with a string
/// `class` field, or if a known class fails to deserialize.
pub fn parse_report(line: &str) -> Result<Report, GpsdError> {
    let value: serde_json::Value = serde_json::from_str(line)
        .map_err(|e| GpsdError::protocol(format!("malformed report: {e}")))?;

    let class = value
        .get("class")
        .and_then(|c| c.as_str())
        .ok_or_else(|| GpsdError::protocol("report has no class field"))?;

    match class {
        "TPV" => {
            let tpv = serde_json::from_value(value.clone())
                .map_err(|e| GpsdError::protocol(format!("bad TPV report: {e}")))?;
            Ok(Report::Tpv(tpv))
        }
        "DEVICES" => {
            let devices = serde_json::from_value(value.clone())
                .map_err(|e| GpsdError::protocol(format!("bad DEVICES report: {e}")))?;
            Ok(Report::Devices(devices))
        }
        other => Ok(Report::Other(other.to_string())),
    }
}
