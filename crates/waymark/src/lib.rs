//! `waymark` - Capture, name, and keep GPS locations
//!
//! This library provides the location ledger: an ordered list of named
//! GPS captures mirrored to local key-value storage, plus the capture flow
//! that turns a sensor fix into a saved record.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod flow;
pub mod ledger;
pub mod logging;
pub mod provider;
pub mod record;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use flow::{BusySignal, CaptureFlow};
pub use ledger::Ledger;
pub use logging::init_logging;
pub use provider::{FixedProvider, GpsdProvider, LocationProvider, SensorFault};
pub use record::{Fix, LocationRecord};
pub use storage::PrefStore;
