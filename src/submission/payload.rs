//! Wire framing for the collector daemon.
//!
//! A payload is two lines joined by `\n`: a fixed header announcing the
//! format, then the segment document.
//!
//! ```text
//! {"format": "json", "version": 1}
//! {"id":"53995c3f42cd8ad8","name":"checkout",...}
//! ```

use crate::{Result, Segment};

/// The header line that precedes every segment document.
pub const HEADER: &str = r#"{"format": "json", "version": 1}"#;

/// Renders the daemon payload for a segment and all its subsegments.
///
/// ```rust
/// use xray_segments::{Segment, payload};
///
/// let mut segment = Segment::new();
/// segment.set_name("job").begin().end();
///
/// let rendered = payload::encode(&segment).unwrap();
/// let (header, body) = rendered.split_once('\n').unwrap();
/// assert_eq!(header, payload::HEADER);
/// assert!(body.contains("\"name\":\"job\""));
/// ```
pub fn encode(segment: &Segment) -> Result<String> {
    let body = serde_json::to_string(segment)?;
    let mut payload = String::with_capacity(HEADER.len() + 1 + body.len());
    payload.push_str(HEADER);
    payload.push('\n');
    payload.push_str(&body);
    Ok(payload)
}

/// Returns the segment document of a payload.
///
/// Returns `None` if the payload does not start with [`HEADER`].
pub fn split(payload: &str) -> Option<&str> {
    payload
        .split_once('\n')
        .filter(|(header, _)| *header == HEADER)
        .map(|(_, body)| body)
}
