//! Error types for the segment library.
//!
//! Building, mutating and serializing segments never fails. Errors only
//! surface from the edges of the crate:
//! - parsing a propagated trace header,
//! - reading daemon configuration,
//! - rendering and sending a payload through a [`SegmentSubmitter`].
//!
//! ## Key Invariant
//!
//! [`Segment::submit()`] swallows submitter failures (they are logged, not
//! returned). Telemetry must never break the instrumented code path. Call
//! [`SegmentSubmitter::submit_segment()`] directly if you need the error.
//!
//! [`SegmentSubmitter`]: crate::SegmentSubmitter
//! [`SegmentSubmitter::submit_segment()`]: crate::SegmentSubmitter::submit_segment
//! [`Segment::submit()`]: crate::Segment::submit

mod core;
mod kind;

pub use self::core::Error;
pub use kind::ErrorKind;

/// A specialized `Result` type for segment library operations.
pub type Result<T> = std::result::Result<T, Error>;
