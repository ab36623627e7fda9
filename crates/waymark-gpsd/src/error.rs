//! Error types for the gpsd client.

use thiserror::Error;

/// Errors that can occur while talking to gpsd.
#[derive(Debug, Error)]
pub enum GpsdError {
    /// Could not reach the gpsd daemon.
    #[error("failed to connect to gpsd at {addr}: {source}")]
    ConnectionFailed {
        /// The daemon address.
        addr: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// gpsd is running but has no GPS hardware attached.
    #[error("gpsd reports no GPS devices attached")]
    NoDevices,

    /// No usable fix arrived within the deadline.
    #[error("no fix from gpsd within {seconds} seconds")]
    Timeout {
        /// The deadline that expired.
        seconds: u64,
    },

    /// gpsd sent something we couldn't make sense of.
    #[error("gpsd protocol error: {0}")]
    Protocol(String),

    /// A read or write on the daemon connection failed.
    #[error("gpsd I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GpsdError {
    /// Create a protocol error.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Check if this error means the daemon was unreachable.
    #[must_use]
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. })
    }
}

/// Result type for gpsd operations.
pub type Result<T> = std::result::Result<T, GpsdError>;
