//! UDP submitter for the local collector daemon.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

use super::payload;
use super::traits::SegmentSubmitter;
use crate::config::DaemonConfig;
use crate::{Error, Result, Segment};

/// Sends segments to the local daemon, one datagram per segment.
///
/// Delivery is fire-and-forget: nothing is acknowledged, nothing is retried,
/// and an unreachable daemon is only noticed if the operating system
/// reports it on send. Unsampled segments are skipped.
///
/// ## Example
///
/// ```rust,no_run
/// use xray_segments::{DaemonConfig, DaemonSubmitter, Segment};
///
/// let submitter = DaemonSubmitter::new(DaemonConfig::default()).unwrap();
///
/// let mut segment = Segment::new();
/// segment.set_name("job").set_sampled(true).begin().end();
/// segment.submit(&submitter);
/// ```
#[derive(Debug)]
pub struct DaemonSubmitter {
    socket: UdpSocket,
    config: DaemonConfig,
}

impl DaemonSubmitter {
    /// Opens a local socket for sending to the configured daemon.
    pub fn new(config: DaemonConfig) -> Result<Self> {
        let local: SocketAddr = match config.address {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(local).map_err(|err| {
            Error::connection(format!("could not bind local UDP socket: {}", err)).with_source(err)
        })?;

        tracing::debug!(daemon = %config.address, "opened daemon socket");

        Ok(Self { socket, config })
    }

    /// Opens a submitter using `AWS_XRAY_DAEMON_ADDRESS`, falling back to
    /// the default address.
    pub fn from_env() -> Result<Self> {
        Self::new(DaemonConfig::from_env()?)
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &DaemonConfig {
        &self.config
    }

    /// Returns the local address datagrams are sent from.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}

impl SegmentSubmitter for DaemonSubmitter {
    fn submit_segment(&self, segment: &Segment) -> Result<()> {
        if !segment.is_sampled() {
            tracing::debug!(segment = %segment.id(), "segment not sampled, not sending");
            return Ok(());
        }

        let payload = payload::encode(segment)?;
        if payload.len() > self.config.max_datagram_size {
            tracing::warn!(
                segment = %segment.id(),
                bytes = payload.len(),
                limit = self.config.max_datagram_size,
                "segment payload exceeds datagram limit"
            );
        }

        let sent = self
            .socket
            .send_to(payload.as_bytes(), self.config.address)
            .map_err(|err| {
                Error::transport(format!(
                    "could not send segment to {}: {}",
                    self.config.address, err
                ))
                .with_source(err)
            })?;

        tracing::trace!(
            segment = %segment.id(),
            daemon = %self.config.address,
            bytes = sent,
            "sent segment"
        );
        Ok(())
    }
}
