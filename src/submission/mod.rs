//! Submission of finished segments to the collector daemon.
//!
//! - [`SegmentSubmitter`]: the capability the rest of the crate depends on
//! - [`DaemonSubmitter`]: UDP delivery to the local daemon
//! - [`NoopSubmitter`]: discards everything
//! - [`payload`]: the two-line wire framing
//!
//! Delivery is best effort. There is no batching, no retry and no response
//! from the daemon.

mod daemon;
mod noop;
pub mod payload;
mod traits;

pub use daemon::DaemonSubmitter;
pub use noop::NoopSubmitter;
pub use traits::SegmentSubmitter;
