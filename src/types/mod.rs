//! Core value types shared by segments and submitters.
//!
//! - [`SegmentId`], [`ExceptionId`], [`TraceId`]: identifiers
//! - [`AnnotationValue`]: scalar annotation values
//! - [`TraceHeader`]: cross-process trace propagation

mod id;
mod trace_header;
mod value;

pub use id::{ExceptionId, SegmentId, TraceId};
pub use trace_header::{TRACE_HEADER_NAME, TraceHeader};
pub use value::AnnotationValue;
