//! Async gpsd client.
//!
//! Connects to the daemon, enables JSON watch mode, and reads reports until
//! a TPV with a usable position shows up or the deadline expires.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, trace};

use crate::error::{GpsdError, Result};
use crate::report::{parse_report, Report};

/// Watch request enabling JSON reports.
const WATCH_COMMAND: &[u8] = b"?WATCH={\"enable\":true,\"json\":true};\n";

/// A position obtained from gpsd.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsdFix {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Altitude in meters, if reported.
    pub altitude: Option<f64>,
}

/// Client for a single gpsd endpoint.
#[derive(Debug, Clone)]
pub struct GpsdClient {
    addr: String,
    timeout: Duration,
}

impl GpsdClient {
    /// Create a client for the given `host:port` address with a fetch
    /// deadline.
    #[must_use]
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }

    /// The daemon address this client talks to.
    #[must_use]
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Request one current-position fix.
    ///
    /// Opens a fresh connection, enables watch mode, and reads reports
    /// until a usable TPV arrives. The whole exchange is bounded by the
    /// client's deadline.
    ///
    /// # Errors
    ///
    /// Returns an error if the daemon is unreachable, reports no attached
    /// devices, sends garbage, or the deadline expires first.
    pub async fn current_fix(&self) -> Result<GpsdFix> {
        match tokio::time::timeout(self.timeout, self.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(GpsdError::Timeout {
                seconds: self.timeout.as_secs(),
            }),
        }
    }

    async fn fetch(&self) -> Result<GpsdFix> {
        debug!("Connecting to gpsd at {}", self.addr);
        let stream =
            TcpStream::connect(&self.addr)
                .await
                .map_err(|source| GpsdError::ConnectionFailed {
                    addr: self.addr.clone(),
                    source,
                })?;

        let (reader, mut writer) = stream.into_split();
        writer.write_all(WATCH_COMMAND).await?;
        writer.flush().await?;
        debug!("Watch enabled, waiting for a fix");

        let mut lines = BufReader::new(reader).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            trace!("gpsd: {line}");

            match parse_report(&line)? {
                Report::Tpv(tpv) => {
                    if let Some((latitude, longitude, altitude)) = tpv.position() {
                        debug!("Got fix: {latitude}, {longitude}");
                        return Ok(GpsdFix {
                            latitude,
                            longitude,
                            altitude,
                        });
                    }
                    trace!("TPV without usable position, still waiting");
                }
                Report::Devices(devices) => {
                    if devices.is_empty() {
                        return Err(GpsdError::NoDevices);
                    }
                }
                Report::Other(class) => {
                    trace!("Skipping {class} report");
                }
            }
        }

        Err(GpsdError::protocol("connection closed before a fix arrived"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    /// Spawn a scripted gpsd that sends the given lines to one client.
    async fn scripted_gpsd(lines: &'static [&'static str]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind test listener");
        let addr = listener.local_addr().unwrap().to_string();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept failed");

            // Consume the WATCH command so the write side doesn't stall
            let mut buf = [0u8; 256];
            let _ = socket.read(&mut buf).await;

            for line in lines {
                socket
                    .write_all(line.as_bytes())
                    .await
                    .expect("write failed");
                socket.write_all(b"\n").await.expect("write failed");
            }
            socket.flush().await.expect("flush failed");
        });

        addr
    }

    #[tokio::test]
    async fn test_fix_from_scripted_daemon() {
        let addr = scripted_gpsd(&[
            r#"{"class":"VERSION","release":"3.25"}"#,
            r#"{"class":"DEVICES","devices":[{"path":"/dev/ttyACM0"}]}"#,
            r#"{"class":"WATCH","enable":true,"json":true}"#,
            r#"{"class":"SKY","satellites":[]}"#,
            r#"{"class":"TPV","mode":1}"#,
            r#"{"class":"TPV","mode":3,"lat":37.5665,"lon":126.978,"altHAE":82.4}"#,
        ])
        .await;

        let client = GpsdClient::new(addr, Duration::from_secs(5));
        let fix = client.current_fix().await.unwrap();

        assert_eq!(fix.latitude, 37.5665);
        assert_eq!(fix.longitude, 126.978);
        assert_eq!(fix.altitude, Some(82.4));
    }

    #[tokio::test]
    async fn test_no_devices() {
        let addr = scripted_gpsd(&[
            r#"{"class":"VERSION","release":"3.25"}"#,
            r#"{"class":"DEVICES","devices":[]}"#,
        ])
        .await;

        let client = GpsdClient::new(addr, Duration::from_secs(5));
        let err = client.current_fix().await.unwrap_err();
        assert!(matches!(err, GpsdError::NoDevices));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // A freshly bound-then-dropped port is almost certainly closed
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let client = GpsdClient::new(addr, Duration::from_secs(5));
        let err = client.current_fix().await.unwrap_err();
        assert!(err.is_connection_failure());
    }

    #[tokio::test]
    async fn test_connection_closed_before_fix() {
        let addr = scripted_gpsd(&[r#"{"class":"VERSION","release":"3.25"}"#]).await;

        let client = GpsdClient::new(addr, Duration::from_secs(5));
        let err = client.current_fix().await.unwrap_err();
        assert!(matches!(err, GpsdError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_deadline_expires() {
        // A listener that accepts but never writes keeps the client waiting
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.expect("accept failed");
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let client = GpsdClient::new(addr, Duration::from_millis(100));
        let err = client.current_fix().await.unwrap_err();
        assert!(matches!(err, GpsdError::Timeout { .. }));
    }

    #[test]
    fn test_client_addr() {
        let client = GpsdClient::new("10.0.0.5:2947", Duration::from_secs(1));
        assert_eq!(client.addr(), "10.0.0.5:2947");
    }
}
