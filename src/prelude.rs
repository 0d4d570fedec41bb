//! Prelude module for convenient imports.
//!
//! ```rust
//! use xray_segments::prelude::*;
//! ```
//!
//! This provides access to:
//! - Segment types and their variants
//! - Submitters
//! - Error types
//! - Identifiers and trace propagation

pub use crate::{
    config::DaemonConfig,
    error::{Error, ErrorKind, Result},
    segment::{Exception, HttpData, Segment, SegmentKind, SqlData},
    submission::{DaemonSubmitter, NoopSubmitter, SegmentSubmitter},
    types::{AnnotationValue, SegmentId, TraceHeader, TraceId},
};
