//! Trace header propagation between processes.

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// The HTTP header that carries a [`TraceHeader`] between services.
pub const TRACE_HEADER_NAME: &str = "X-Amzn-Trace-Id";

/// Trace correlation received from, or sent to, another process.
///
/// The wire form is a `;`-separated list of `key=value` pairs:
///
/// ```text
/// Root=1-5759e988-bd862e3fe1be46a994272793;Parent=53995c3f42cd8ad8;Sampled=1
/// ```
///
/// ## Example
///
/// ```rust
/// use xray_segments::TraceHeader;
///
/// let header: TraceHeader =
///     "Root=1-5759e988-bd862e3fe1be46a994272793;Parent=53995c3f42cd8ad8;Sampled=1"
///         .parse()
///         .unwrap();
///
/// assert_eq!(header.root(), Some("1-5759e988-bd862e3fe1be46a994272793"));
/// assert_eq!(header.parent(), Some("53995c3f42cd8ad8"));
/// assert_eq!(header.sampled(), Some(true));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceHeader {
    root: Option<String>,
    parent: Option<String>,
    sampled: Option<bool>,
}

impl TraceHeader {
    /// Creates an empty header.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the trace root.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Sets the parent segment id.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Sets the sampling decision.
    #[must_use]
    pub fn with_sampled(mut self, sampled: bool) -> Self {
        self.sampled = Some(sampled);
        self
    }

    /// Returns the trace root, if present.
    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    /// Returns the parent segment id, if present.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Returns the sampling decision, or `None` if it was left to the receiver.
    pub fn sampled(&self) -> Option<bool> {
        self.sampled
    }
}

impl FromStr for TraceHeader {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut header = TraceHeader::new();
        let mut recognized = false;

        for pair in s.split(';') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "Root" => {
                    header.root = Some(value.to_string());
                    recognized = true;
                }
                "Parent" => {
                    header.parent = Some(value.to_string());
                    recognized = true;
                }
                "Sampled" => {
                    header.sampled = match value {
                        "1" => Some(true),
                        "0" => Some(false),
                        "?" => None,
                        other => {
                            return Err(Error::invalid_argument(format!(
                                "invalid Sampled value in trace header: {:?}",
                                other
                            )));
                        }
                    };
                    recognized = true;
                }
                // Self=, Lineage= and vendor keys are not ours to interpret
                _ => {}
            }
        }

        if !recognized {
            return Err(Error::invalid_argument(format!(
                "trace header has no Root, Parent or Sampled field: {:?}",
                s
            )));
        }

        Ok(header)
    }
}

impl fmt::Display for TraceHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(3);
        if let Some(root) = &self.root {
            parts.push(format!("Root={}", root));
        }
        if let Some(parent) = &self.parent {
            parts.push(format!("Parent={}", parent));
        }
        if let Some(sampled) = self.sampled {
            parts.push(format!("Sampled={}", u8::from(sampled)));
        }
        write!(f, "{}", parts.join(";"))
    }
}
