//! # xray-segments
//!
//! Client-side tracing instrumentation: build a tree of segments describing
//! units of work, record timing, outcome flags, annotations, metadata and
//! exception chains, then hand the finished trace to the local collector
//! daemon.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use xray_segments::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let submitter = DaemonSubmitter::from_env()?;
//!
//!     let mut root = Segment::new();
//!     root.set_name("checkout")
//!         .set_trace_id(TraceId::generate())
//!         .set_sampled(true)
//!         .begin();
//!
//!     let mut call = Segment::http(HttpData::new().with_url("https://payments/charge").with_method("POST"));
//!     call.set_name("payments").begin();
//!     root.add_subsegment(call);
//!
//!     // ... work happens, the HTTP call finishes ...
//!     if let Some(http) = root.current_segment_mut().http_mut() {
//!         http.set_response_code(201);
//!     }
//!     root.current_segment_mut().end();
//!
//!     root.add_annotation("customer_tier", "gold").end();
//!     root.submit(&submitter);
//!     Ok(())
//! }
//! ```
//!
//! ## Key Concepts
//!
//! - **Lifecycle**: `Segment::new()` is unstarted, `begin()` opens it, `end()` closes it
//! - **Tree**: children attach only to open parents; a sampled parent forces its children sampled
//! - **Current segment**: always follows the most recently attached child, recursively
//! - **Submission**: gated on `sampled`, best effort, errors are logged and swallowed
//!
//! ## Logging
//!
//! The crate emits [`tracing`](https://docs.rs/tracing) events. Install any
//! subscriber to see dropped children, skipped submissions and delivery
//! failures.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod segment;
pub mod submission;
pub mod types;

// Testing utilities
pub mod testing;

// Prelude for convenient imports
pub mod prelude;

pub use config::{
    DAEMON_ADDRESS_ENV, DEFAULT_DAEMON_ADDRESS, DaemonConfig, MAX_DATAGRAM_SIZE,
};
pub use error::{Error, ErrorKind, Result};
pub use segment::{
    Exception, ExceptionChain, HttpData, REMOTE_NAMESPACE, Segment, SegmentKind, SqlData,
    StackFrame,
};
pub use submission::{DaemonSubmitter, NoopSubmitter, SegmentSubmitter, payload};
pub use types::{AnnotationValue, ExceptionId, SegmentId, TRACE_HEADER_NAME, TraceHeader, TraceId};
