//! gpsd client for waymark
//!
//! This crate speaks gpsd's newline-delimited JSON protocol over TCP to
//! obtain a single current-position fix. It knows nothing about waymark's
//! ledger; the main crate adapts [`GpsdClient`] to its provider seam.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

mod client;
mod error;
pub mod report;

pub use client::{GpsdClient, GpsdFix};
pub use error::{GpsdError, Result};
