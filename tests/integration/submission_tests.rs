//! Submission tests: gating, framing and delivery to a loopback daemon.

use std::time::Duration;

use anyhow::{Context, Result};
use xray_segments::testing::RecordingSubmitter;
use xray_segments::{DaemonSubmitter, Error, NoopSubmitter, Segment, payload};

use crate::common::{FakeDaemon, init_logging};

fn finished(name: &str, sampled: bool) -> Segment {
    let mut segment = Segment::new();
    segment.set_name(name).set_sampled(sampled).begin().end();
    segment
}

#[test]
fn test_unsampled_segment_never_reaches_submitter() {
    init_logging();
    let recorder = RecordingSubmitter::new();

    finished("quiet", false).submit(&recorder);

    assert_eq!(recorder.submission_count(), 0);
    assert!(recorder.payloads().is_empty());
}

#[test]
fn test_sampled_segment_submitted_once_with_header() -> Result<()> {
    init_logging();
    let recorder = RecordingSubmitter::new();
    let segment = finished("loud", true);

    segment.submit(&recorder);

    assert_eq!(recorder.submission_count(), 1);
    let payloads = recorder.payloads();
    let (header, body) = payloads[0].split_once('\n').context("payload has no newline")?;
    assert_eq!(header, payload::HEADER);
    assert_eq!(serde_json::from_str::<serde_json::Value>(body)?, segment.to_json());
    Ok(())
}

#[test]
fn test_submitter_failure_is_swallowed() {
    init_logging();
    let recorder = RecordingSubmitter::new();
    recorder.set_failure(Error::transport("daemon unreachable"));

    finished("doomed", true).submit(&recorder);
    finished("next", true).submit(&recorder);

    assert_eq!(recorder.submission_count(), 2);
    assert_eq!(recorder.payloads().len(), 1);
}

#[test]
fn test_daemon_receives_whole_tree() -> Result<()> {
    init_logging();
    let daemon = FakeDaemon::start()?;
    let submitter = DaemonSubmitter::new(daemon.config()?)?;

    let mut root = Segment::new();
    root.set_name("root").set_sampled(true).begin();
    let mut child = Segment::new();
    child.set_name("child").begin();
    root.add_subsegment(child);
    root.current_segment_mut().end();
    root.add_annotation("region", "eu-west-1").end();

    root.submit(&submitter);

    let received = daemon.recv_segment()?;
    assert_eq!(received, root.to_json());
    assert_eq!(received["subsegments"][0]["name"], "child");
    assert_eq!(received["annotations"]["region"], "eu-west-1");
    Ok(())
}

#[test]
fn test_daemon_gets_nothing_for_unsampled_trace() -> Result<()> {
    init_logging();
    let daemon = FakeDaemon::start()?;
    let submitter = DaemonSubmitter::new(daemon.config()?)?;

    finished("skipped", false).submit(&submitter);

    assert!(daemon.is_silent_for(Duration::from_millis(150))?);
    Ok(())
}

#[test]
fn test_noop_submitter_accepts_everything() {
    finished("ignored", true).submit(&NoopSubmitter);
}
