//! A submitter that discards everything.

use super::traits::SegmentSubmitter;
use crate::{Result, Segment};

/// Accepts every segment and sends nothing.
///
/// Useful when tracing is disabled but instrumented code still calls
/// [`Segment::submit()`](crate::Segment::submit).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSubmitter;

impl SegmentSubmitter for NoopSubmitter {
    fn submit_segment(&self, _segment: &Segment) -> Result<()> {
        Ok(())
    }
}
