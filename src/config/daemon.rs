//! Where and how segments reach the local daemon.

use std::env::VarError;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, ToSocketAddrs};

use crate::{Error, Result};

/// Environment variable holding the daemon address.
pub const DAEMON_ADDRESS_ENV: &str = "AWS_XRAY_DAEMON_ADDRESS";

/// The daemon's standard UDP endpoint.
pub const DEFAULT_DAEMON_ADDRESS: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 2000));

/// Largest UDP payload an IPv4 datagram can carry.
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// Configuration for [`DaemonSubmitter`](crate::DaemonSubmitter).
///
/// ## Default Values
///
/// - `address`: `127.0.0.1:2000`
/// - `max_datagram_size`: 65507 bytes
///
/// Payloads larger than `max_datagram_size` are still sent (the operating
/// system decides their fate) but are reported with a warning.
///
/// ## Example
///
/// ```rust
/// use xray_segments::DaemonConfig;
///
/// let config = DaemonConfig::builder()
///     .address("10.0.0.5:2000".parse().unwrap())
///     .build();
/// assert_eq!(config.address.port(), 2000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
pub struct DaemonConfig {
    /// UDP address of the daemon.
    #[builder(default = DEFAULT_DAEMON_ADDRESS)]
    pub address: SocketAddr,

    /// Payload size above which a warning is logged.
    #[builder(default = MAX_DATAGRAM_SIZE)]
    pub max_datagram_size: usize,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl DaemonConfig {
    /// Reads the daemon address from `AWS_XRAY_DAEMON_ADDRESS`.
    ///
    /// A missing variable yields the defaults. A malformed value is an
    /// [`InvalidArgument`](crate::ErrorKind::InvalidArgument) error.
    pub fn from_env() -> Result<Self> {
        Self::from_env_value(std::env::var(DAEMON_ADDRESS_ENV))
    }

    fn from_env_value(value: std::result::Result<String, VarError>) -> Result<Self> {
        match value {
            Ok(value) if value.trim().is_empty() => Ok(Self::default()),
            Ok(value) => {
                let address = Self::parse_address(&value)?;
                Ok(Self::builder().address(address).build())
            }
            Err(VarError::NotPresent) => Ok(Self::default()),
            Err(err @ VarError::NotUnicode(_)) => Err(Error::invalid_argument(format!(
                "{} is not valid unicode",
                DAEMON_ADDRESS_ENV
            ))
            .with_source(err)),
        }
    }

    /// Parses a daemon address.
    ///
    /// Accepts a single `host:port`, or the dual form
    /// `tcp:host:port udp:host:port` from which the UDP entry is used.
    /// Host names are resolved and the first address wins.
    ///
    /// ```rust
    /// use xray_segments::DaemonConfig;
    ///
    /// let addr = DaemonConfig::parse_address("tcp:127.0.0.1:2000 udp:127.0.0.2:2001").unwrap();
    /// assert_eq!(addr.to_string(), "127.0.0.2:2001");
    /// ```
    pub fn parse_address(value: &str) -> Result<SocketAddr> {
        let entries: Vec<&str> = value.split_whitespace().collect();
        let target = match entries.as_slice() {
            [single] => single.strip_prefix("udp:").unwrap_or(*single),
            [] => return Err(Error::invalid_argument("daemon address is empty")),
            many => many
                .iter()
                .find_map(|entry| entry.strip_prefix("udp:"))
                .ok_or_else(|| {
                    Error::invalid_argument(format!(
                        "daemon address {:?} has no udp: entry",
                        value
                    ))
                })?,
        };

        if let Ok(address) = target.parse::<SocketAddr>() {
            return Ok(address);
        }

        target
            .to_socket_addrs()
            .map_err(|err| {
                Error::invalid_argument(format!("invalid daemon address {:?}", target)).with_source(err)
            })?
            .next()
            .ok_or_else(|| {
                Error::invalid_argument(format!("daemon address {:?} did not resolve", target))
            })
    }
}
