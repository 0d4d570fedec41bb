//! Segments: the recorded units of work that make up a trace.
//!
//! A segment moves through three states:
//!
//! ```text
//! UNSTARTED ──begin()──▶ OPEN ──end()──▶ CLOSED
//!                         │
//!                         └── add_subsegment(child)
//! ```
//!
//! Children can only be attached while the parent is open. Attaching to a
//! closed segment is silently ignored so that instrumentation racing with
//! segment closure never fails the caller.
//!
//! Attributes, flags, annotations, metadata and exceptions can be changed in
//! any state. They are often filled in before `begin()` or after `end()`
//! but before submission.
//!
//! A segment tree is meant to be built by a single flow of control. There
//! is no internal locking; share a tree across threads only behind your own
//! synchronization.

mod exception;
mod variant;

use std::collections::BTreeMap;
use std::error::Error as StdError;

use serde::{Serialize, Serializer};

use crate::submission::SegmentSubmitter;
use crate::types::{AnnotationValue, SegmentId, TraceHeader};

pub use exception::{Exception, ExceptionChain, StackFrame};
pub use variant::{HttpData, REMOTE_NAMESPACE, SegmentKind, SqlData};

use variant::VariantFields;

/// A unit of work with timing, outcome flags and child segments.
///
/// Mutators return `&mut Self` so calls can be chained. Children are moved
/// into their parent; reach them again through [`subsegments()`] or
/// [`current_segment_mut()`].
///
/// ## Example
///
/// ```rust
/// use xray_segments::Segment;
///
/// let mut root = Segment::new();
/// root.set_name("checkout").set_sampled(true).begin();
///
/// let mut query = Segment::new();
/// query.set_name("load-cart").begin();
/// root.add_subsegment(query);
///
/// // ... do the work ...
/// root.current_segment_mut().end();
///
/// root.add_annotation("customer_tier", "gold").end();
///
/// let json = root.to_json();
/// assert_eq!(json["name"], "checkout");
/// assert_eq!(json["subsegments"][0]["name"], "load-cart");
/// ```
///
/// [`subsegments()`]: Segment::subsegments
/// [`current_segment_mut()`]: Segment::current_segment_mut
#[derive(Debug, Clone)]
pub struct Segment {
    id: SegmentId,
    trace_id: Option<String>,
    parent_id: Option<String>,
    name: String,
    start_time: Option<f64>,
    end_time: Option<f64>,
    sampled: bool,
    independent: bool,
    error: bool,
    fault: bool,
    throttle: bool,
    annotations: BTreeMap<String, AnnotationValue>,
    metadata: BTreeMap<String, serde_json::Value>,
    exceptions: ExceptionChain,
    subsegments: Vec<Segment>,
    kind: SegmentKind,
}

impl Default for Segment {
    fn default() -> Self {
        Self::new()
    }
}

impl Segment {
    /// Creates an unstarted generic segment with a fresh id.
    pub fn new() -> Self {
        Self::with_kind(SegmentKind::Generic)
    }

    /// Creates an unstarted segment of the given kind.
    pub fn with_kind(kind: SegmentKind) -> Self {
        Self {
            id: SegmentId::random(),
            trace_id: None,
            parent_id: None,
            name: String::new(),
            start_time: None,
            end_time: None,
            sampled: false,
            independent: false,
            error: false,
            fault: false,
            throttle: false,
            annotations: BTreeMap::new(),
            metadata: BTreeMap::new(),
            exceptions: ExceptionChain::new(),
            subsegments: Vec::new(),
            kind,
        }
    }

    /// Creates an unstarted segment describing an outgoing HTTP call.
    pub fn http(data: HttpData) -> Self {
        Self::with_kind(SegmentKind::Http(data))
    }

    /// Creates an unstarted segment describing a database query.
    pub fn sql(data: SqlData) -> Self {
        Self::with_kind(SegmentKind::Sql(data))
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Marks the segment as started now.
    ///
    /// Calling it again overwrites the start time; avoiding that is up to
    /// the caller.
    pub fn begin(&mut self) -> &mut Self {
        self.start_time = Some(epoch_seconds());
        self
    }

    /// Marks the segment as finished now.
    ///
    /// The end time is recorded once. Later calls leave it untouched.
    pub fn end(&mut self) -> &mut Self {
        if self.end_time.is_none() {
            self.end_time = Some(epoch_seconds());
        }
        self
    }

    /// Returns `true` until [`end()`](Segment::end) is called, whether or not
    /// the segment was started.
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Attaches a child segment.
    ///
    /// If this segment is closed the child is dropped without error. If this
    /// segment is sampled the child becomes sampled too; the propagation is
    /// not re-evaluated later.
    pub fn add_subsegment(&mut self, mut subsegment: Segment) -> &mut Self {
        if !self.is_open() {
            tracing::debug!(
                parent = %self.id,
                child = %subsegment.id,
                "dropping subsegment attached to closed segment"
            );
            return self;
        }
        if self.sampled {
            subsegment.sampled = true;
        }
        self.subsegments.push(subsegment);
        self
    }

    /// Returns the segment where new work should be recorded.
    ///
    /// Starting here, follows the most recently attached child until a
    /// segment without children is reached. The walk does not consider
    /// whether the children it passes through are still open, and never
    /// looks back at earlier siblings.
    pub fn current_segment(&self) -> &Segment {
        match self.subsegments.last() {
            Some(last) => last.current_segment(),
            None => self,
        }
    }

    /// Mutable counterpart of [`current_segment()`](Segment::current_segment).
    pub fn current_segment_mut(&mut self) -> &mut Segment {
        if self.subsegments.is_empty() {
            return self;
        }
        let last = self.subsegments.len() - 1;
        self.subsegments[last].current_segment_mut()
    }

    // ------------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------------

    /// Sets the human-readable name.
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    /// Sets the id of the segment this one continues from.
    pub fn set_parent_id(&mut self, parent_id: impl Into<String>) -> &mut Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Sets the trace this segment belongs to.
    pub fn set_trace_id(&mut self, trace_id: impl Into<String>) -> &mut Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Sets whether the trace is kept and submitted.
    pub fn set_sampled(&mut self, sampled: bool) -> &mut Self {
        self.sampled = sampled;
        self
    }

    /// Marks the segment as an independently reported subsegment, linked to
    /// its parent through `parent_id` and `trace_id` rather than by nesting.
    pub fn set_independent(&mut self, independent: bool) -> &mut Self {
        self.independent = independent;
        self
    }

    /// Flags a client error (4xx-like outcome).
    pub fn set_error(&mut self, error: bool) -> &mut Self {
        self.error = error;
        self
    }

    /// Flags a server fault (5xx-like outcome).
    pub fn set_fault(&mut self, fault: bool) -> &mut Self {
        self.fault = fault;
        self
    }

    /// Flags that the work was throttled.
    pub fn set_throttle(&mut self, throttle: bool) -> &mut Self {
        self.throttle = throttle;
        self
    }

    /// Records an indexed annotation. An existing key is overwritten.
    pub fn add_annotation(
        &mut self,
        key: impl Into<String>,
        value: impl Into<AnnotationValue>,
    ) -> &mut Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Records arbitrary metadata. An existing key is overwritten.
    pub fn add_metadata(
        &mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> &mut Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Attaches an error and its `source()` chain.
    ///
    /// The stack is captured here and starts at the calling function.
    #[track_caller]
    pub fn add_exception<E>(&mut self, error: &E) -> &mut Self
    where
        E: StdError + 'static,
    {
        let exception = Exception::from_error(error).with_stack(StackFrame::capture());
        self.add_exception_record(exception)
    }

    /// Attaches a type-erased error and its `source()` chain.
    #[track_caller]
    pub fn add_dyn_exception(&mut self, error: &(dyn StdError + 'static)) -> &mut Self {
        let exception = Exception::from_dyn_error(error).with_stack(StackFrame::capture());
        self.add_exception_record(exception)
    }

    /// Attaches an already built exception record.
    pub fn add_exception_record(&mut self, exception: Exception) -> &mut Self {
        self.exceptions.push(exception);
        self
    }

    /// Copies correlation from an incoming trace header.
    ///
    /// Only the fields present in the header are applied.
    pub fn apply_trace_header(&mut self, header: &TraceHeader) -> &mut Self {
        if let Some(root) = header.root() {
            self.trace_id = Some(root.to_string());
        }
        if let Some(parent) = header.parent() {
            self.parent_id = Some(parent.to_string());
        }
        if let Some(sampled) = header.sampled() {
            self.sampled = sampled;
        }
        self
    }

    /// Returns the header a downstream call made from this segment should carry.
    pub fn trace_header(&self) -> TraceHeader {
        let header = TraceHeader::new()
            .with_parent(self.id.to_string())
            .with_sampled(self.sampled);
        match self.trace_id.as_deref().filter(|id| !id.is_empty()) {
            Some(root) => header.with_root(root),
            None => header,
        }
    }

    /// Returns the variant payload for an HTTP segment.
    pub fn http_mut(&mut self) -> Option<&mut HttpData> {
        match &mut self.kind {
            SegmentKind::Http(http) => Some(http),
            _ => None,
        }
    }

    /// Returns the variant payload for a SQL segment.
    pub fn sql_mut(&mut self) -> Option<&mut SqlData> {
        match &mut self.kind {
            SegmentKind::Sql(sql) => Some(sql),
            _ => None,
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Returns the segment id.
    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// Returns the name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the trace id, if set.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Returns the parent id, if set.
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    /// Returns the start time in fractional seconds since the Unix epoch.
    pub fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    /// Returns the end time in fractional seconds since the Unix epoch.
    pub fn end_time(&self) -> Option<f64> {
        self.end_time
    }

    /// Returns whether the trace is sampled.
    pub fn is_sampled(&self) -> bool {
        self.sampled
    }

    /// Returns whether the segment reports as an independent subsegment.
    pub fn is_independent(&self) -> bool {
        self.independent
    }

    /// Returns the error flag.
    pub fn is_error(&self) -> bool {
        self.error
    }

    /// Returns the fault flag.
    pub fn is_fault(&self) -> bool {
        self.fault
    }

    /// Returns the throttle flag.
    pub fn is_throttle(&self) -> bool {
        self.throttle
    }

    /// Returns the annotations.
    pub fn annotations(&self) -> &BTreeMap<String, AnnotationValue> {
        &self.annotations
    }

    /// Returns the metadata.
    pub fn metadata(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.metadata
    }

    /// Returns the attached exceptions.
    pub fn exceptions(&self) -> &ExceptionChain {
        &self.exceptions
    }

    /// Returns the children in attachment order.
    pub fn subsegments(&self) -> &[Segment] {
        &self.subsegments
    }

    /// Returns the variant.
    pub fn kind(&self) -> &SegmentKind {
        &self.kind
    }

    // ------------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------------

    /// Returns the collector document for this segment and all descendants.
    ///
    /// Pure: repeated calls on an unchanged segment return equal values.
    pub fn to_json(&self) -> serde_json::Value {
        // Every map key is a string and every number is finite or maps to
        // null, so conversion cannot fail.
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Hands the segment to a submitter if it is sampled.
    ///
    /// Submitter failures are logged and swallowed.
    pub fn submit(&self, submitter: &dyn SegmentSubmitter) {
        if !self.sampled {
            tracing::debug!(segment = %self.id, "segment not sampled, skipping submission");
            return;
        }
        if let Err(err) = submitter.submit_segment(self) {
            tracing::warn!(
                segment = %self.id,
                error = %err,
                delivery = err.kind().is_delivery_failure(),
                "failed to submit segment"
            );
        }
    }
}

fn epoch_seconds() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_empty_map<V>(map: &&BTreeMap<String, V>) -> bool {
    map.is_empty()
}

fn is_empty_slice<T>(slice: &&[T]) -> bool {
    slice.is_empty()
}

#[derive(Serialize)]
struct SegmentDocument<'a> {
    id: SegmentId,
    name: &'a str,
    start_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_time: Option<f64>,
    #[serde(skip_serializing_if = "is_false")]
    in_progress: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    segment_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<&'a str>,
    #[serde(skip_serializing_if = "is_false")]
    error: bool,
    #[serde(skip_serializing_if = "is_false")]
    fault: bool,
    #[serde(skip_serializing_if = "is_false")]
    throttle: bool,
    #[serde(skip_serializing_if = "is_empty_map")]
    annotations: &'a BTreeMap<String, AnnotationValue>,
    #[serde(skip_serializing_if = "is_empty_map")]
    metadata: &'a BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cause: Option<&'a ExceptionChain>,
    #[serde(skip_serializing_if = "is_empty_slice")]
    subsegments: &'a [Segment],
    #[serde(flatten)]
    variant: VariantFields<'a>,
}

impl Serialize for Segment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SegmentDocument {
            id: self.id,
            name: &self.name,
            start_time: self.start_time,
            end_time: self.end_time,
            in_progress: self.is_open(),
            segment_type: self.independent.then_some("subsegment"),
            trace_id: self.trace_id.as_deref().filter(|id| !id.is_empty()),
            parent_id: self.parent_id.as_deref().filter(|id| !id.is_empty()),
            error: self.error,
            fault: self.fault,
            throttle: self.throttle,
            annotations: &self.annotations,
            metadata: &self.metadata,
            cause: (!self.exceptions.is_empty()).then_some(&self.exceptions),
            subsegments: &self.subsegments,
            variant: VariantFields::project(&self.kind),
        }
        .serialize(serializer)
    }
}
