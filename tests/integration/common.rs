//! Shared fixtures for the integration tests.

use std::net::UdpSocket;
use std::sync::Once;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use xray_segments::{DaemonConfig, payload};

static INIT_LOGGING: Once = Once::new();

/// Installs a test-writer subscriber once per test binary.
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("xray_segments=debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// A loopback socket standing in for the collector daemon.
pub struct FakeDaemon {
    socket: UdpSocket,
}

impl FakeDaemon {
    pub fn start() -> Result<Self> {
        let socket = UdpSocket::bind("127.0.0.1:0").context("binding fake daemon")?;
        socket.set_read_timeout(Some(Duration::from_secs(2)))?;
        Ok(Self { socket })
    }

    pub fn config(&self) -> Result<DaemonConfig> {
        Ok(DaemonConfig::builder().address(self.socket.local_addr()?).build())
    }

    /// Receives one datagram and returns it as text.
    pub fn recv(&self) -> Result<String> {
        let mut buf = vec![0u8; 65_536];
        let (len, _) = self.socket.recv_from(&mut buf).context("waiting for datagram")?;
        Ok(String::from_utf8(buf[..len].to_vec())?)
    }

    /// Receives one datagram and parses its body.
    pub fn recv_segment(&self) -> Result<Value> {
        let datagram = self.recv()?;
        let body = payload::split(&datagram).context("datagram lacks the format header")?;
        Ok(serde_json::from_str(body)?)
    }

    /// Returns `true` if nothing arrives within `wait`.
    pub fn is_silent_for(&self, wait: Duration) -> Result<bool> {
        self.socket.set_read_timeout(Some(wait))?;
        let mut buf = [0u8; 1024];
        let silent = self.socket.recv_from(&mut buf).is_err();
        self.socket.set_read_timeout(Some(Duration::from_secs(2)))?;
        Ok(silent)
    }
}
