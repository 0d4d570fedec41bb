//! In-memory submitter that keeps every payload it receives.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde_json::Value;

use crate::submission::{SegmentSubmitter, payload};
use crate::{Error, Result, Segment};

/// A submitter that records encoded payloads instead of sending them.
///
/// Every call to [`submit_segment`](SegmentSubmitter::submit_segment) is
/// counted, and the encoded payload (header line plus body) is stored.
/// A failure can be injected for the next call.
///
/// ## Example
///
/// ```rust
/// use xray_segments::Segment;
/// use xray_segments::testing::RecordingSubmitter;
///
/// let recorder = RecordingSubmitter::new();
///
/// let mut segment = Segment::new();
/// segment.set_name("checkout").set_sampled(true).begin().end();
/// segment.submit(&recorder);
///
/// assert_eq!(recorder.submission_count(), 1);
/// let body = recorder.last_segment_json().unwrap();
/// assert_eq!(body["name"], "checkout");
/// ```
#[derive(Debug)]
pub struct RecordingSubmitter {
    payloads: RwLock<Vec<String>>,
    submission_count: AtomicU64,
    simulate_failure: RwLock<Option<Error>>,
}

impl RecordingSubmitter {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self {
            payloads: RwLock::new(Vec::new()),
            submission_count: AtomicU64::new(0),
            simulate_failure: RwLock::new(None),
        }
    }

    /// Makes the next submission fail with `error`.
    pub fn set_failure(&self, error: Error) {
        *self.simulate_failure.write() = Some(error);
    }

    /// Clears any pending simulated failure.
    pub fn clear_failure(&self) {
        *self.simulate_failure.write() = None;
    }

    /// Returns how many times the submitter was invoked, failures included.
    pub fn submission_count(&self) -> u64 {
        self.submission_count.load(Ordering::Relaxed)
    }

    /// Returns the successfully recorded payloads, oldest first.
    pub fn payloads(&self) -> Vec<String> {
        self.payloads.read().clone()
    }

    /// Parses the body of the most recent payload.
    pub fn last_segment_json(&self) -> Option<Value> {
        let payloads = self.payloads.read();
        let body = payload::split(payloads.last()?)?;
        serde_json::from_str(body).ok()
    }

    /// Forgets recorded payloads and resets the counter.
    pub fn reset(&self) {
        self.payloads.write().clear();
        self.submission_count.store(0, Ordering::Relaxed);
        self.clear_failure();
    }

    fn check_failure(&self) -> Result<()> {
        let failure = self.simulate_failure.write().take();
        if let Some(error) = failure {
            return Err(error);
        }
        Ok(())
    }
}

impl Default for RecordingSubmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentSubmitter for RecordingSubmitter {
    fn submit_segment(&self, segment: &Segment) -> Result<()> {
        self.submission_count.fetch_add(1, Ordering::Relaxed);
        self.check_failure()?;

        let encoded = payload::encode(segment)?;
        self.payloads.write().push(encoded);
        Ok(())
    }
}
