//! Configuration types.
//!
//! - [`DaemonConfig`]: address and limits for the local collector daemon

mod daemon;

pub use daemon::{DAEMON_ADDRESS_ENV, DEFAULT_DAEMON_ADDRESS, DaemonConfig, MAX_DATAGRAM_SIZE};
