//! The submitter abstraction.

use crate::{Result, Segment};

/// Delivers finished segments to a collector.
///
/// Implementations decide how (and whether) a segment leaves the process.
/// The library ships [`DaemonSubmitter`] for production,
/// [`NoopSubmitter`] for disabled tracing, and
/// [`RecordingSubmitter`] for tests.
///
/// Callers normally go through [`Segment::submit()`], which skips unsampled
/// segments and swallows errors. Calling `submit_segment` directly bypasses
/// both.
///
/// ## Example
///
/// ```rust
/// use xray_segments::{Result, Segment, SegmentSubmitter};
///
/// struct StdoutSubmitter;
///
/// impl SegmentSubmitter for StdoutSubmitter {
///     fn submit_segment(&self, segment: &Segment) -> Result<()> {
///         println!("{}", xray_segments::payload::encode(segment)?);
///         Ok(())
///     }
/// }
/// ```
///
/// [`DaemonSubmitter`]: crate::DaemonSubmitter
/// [`NoopSubmitter`]: crate::NoopSubmitter
/// [`RecordingSubmitter`]: crate::testing::RecordingSubmitter
pub trait SegmentSubmitter: Send + Sync {
    /// Transmits one segment, including all of its subsegments.
    fn submit_segment(&self, segment: &Segment) -> Result<()>;
}

impl<T: SegmentSubmitter + ?Sized> SegmentSubmitter for &T {
    fn submit_segment(&self, segment: &Segment) -> Result<()> {
        (**self).submit_segment(segment)
    }
}

impl<T: SegmentSubmitter + ?Sized> SegmentSubmitter for std::sync::Arc<T> {
    fn submit_segment(&self, segment: &Segment) -> Result<()> {
        (**self).submit_segment(segment)
    }
}

impl<T: SegmentSubmitter + ?Sized> SegmentSubmitter for Box<T> {
    fn submit_segment(&self, segment: &Segment) -> Result<()> {
        (**self).submit_segment(segment)
    }
}
