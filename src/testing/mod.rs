//! Testing utilities.
//!
//! - [`RecordingSubmitter`]: captures payloads in memory instead of sending
//!   them, with optional failure injection
//!
//! ## Quick Start
//!
//! ```rust
//! use xray_segments::Segment;
//! use xray_segments::testing::RecordingSubmitter;
//!
//! let recorder = RecordingSubmitter::new();
//!
//! let mut segment = Segment::new();
//! segment.set_sampled(false).begin().end();
//! segment.submit(&recorder);
//!
//! // unsampled segments never reach the submitter
//! assert_eq!(recorder.submission_count(), 0);
//! ```

mod recording;

pub use recording::RecordingSubmitter;
