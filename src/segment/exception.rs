//! Exception chains attached to segments.
//!
//! An attached error is snapshotted into an [`Exception`] at the moment it is
//! attached: its message, type, stack and the whole `source()` chain are
//! copied into owned records and each record receives an [`ExceptionId`].
//! Serializing a segment therefore never touches the original error and
//! always reports the same ids.
//!
//! The serialized form lives under the segment's `cause` key:
//!
//! ```text
//! cause
//! ├── working_directory
//! └── exceptions: [outer, cause-of-outer, ..., next attached, ...]
//! ```

use std::error::Error as StdError;
use std::panic::Location;

use backtrace::Backtrace;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::types::ExceptionId;

/// A captured error and, recursively, the error that caused it.
///
/// ## Example
///
/// ```rust
/// use xray_segments::{Exception, StackFrame};
///
/// let root = Exception::new("IoError", "connection reset");
/// let outer = Exception::new("QueryError", "query failed")
///     .with_frame(StackFrame::from_symbol("app::db::Pool::query").with_line(42))
///     .with_cause(root);
///
/// assert_eq!(outer.chain().count(), 2);
/// assert_eq!(outer.cause().unwrap().message(), "connection reset");
/// ```
#[derive(Debug, Clone)]
pub struct Exception {
    id: ExceptionId,
    type_name: String,
    message: String,
    stack: Vec<StackFrame>,
    cause: Option<Box<Exception>>,
}

impl Exception {
    /// Creates a record with a fresh id and no stack or cause.
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: ExceptionId::random(),
            type_name: type_name.into(),
            message: message.into(),
            stack: Vec::new(),
            cause: None,
        }
    }

    /// Captures a concrete error and its `source()` chain.
    ///
    /// The outer record's type is the error's Rust type name. Errors reached
    /// through `source()` are only known as trait objects, so their type is
    /// taken from the leading identifier of their `Debug` output.
    pub fn from_error<E>(error: &E) -> Self
    where
        E: StdError + 'static,
    {
        let type_name = std::any::type_name::<E>();
        let mut exception = Self::new(type_name, error.to_string());
        exception.cause = capture_sources(error.source());
        exception
    }

    /// Captures a type-erased error and its `source()` chain.
    pub fn from_dyn_error(error: &(dyn StdError + 'static)) -> Self {
        let mut exception = Self::new(debug_type_name(error), error.to_string());
        exception.cause = capture_sources(error.source());
        exception
    }

    /// Sets the error that caused this one.
    #[must_use]
    pub fn with_cause(mut self, cause: Exception) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Appends a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: StackFrame) -> Self {
        self.stack.push(frame);
        self
    }

    /// Replaces the stack.
    #[must_use]
    pub fn with_stack(mut self, stack: Vec<StackFrame>) -> Self {
        self.stack = stack;
        self
    }

    /// Replaces the stack with the resolved frames of a backtrace.
    #[must_use]
    pub fn with_backtrace(self, backtrace: &Backtrace) -> Self {
        self.with_stack(StackFrame::from_backtrace(backtrace))
    }

    /// Returns the record id.
    pub fn id(&self) -> ExceptionId {
        self.id
    }

    /// Returns the error type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the stack frames.
    pub fn stack(&self) -> &[StackFrame] {
        &self.stack
    }

    /// Returns the error that caused this one, if any.
    pub fn cause(&self) -> Option<&Exception> {
        self.cause.as_deref()
    }

    /// Iterates over this record followed by its causes, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &Exception> {
        std::iter::successors(Some(self), |exception| exception.cause())
    }
}

fn capture_sources(mut next: Option<&(dyn StdError + 'static)>) -> Option<Box<Exception>> {
    let mut links = Vec::new();
    while let Some(error) = next {
        links.push(Exception::new(debug_type_name(error), error.to_string()));
        next = error.source();
    }
    links.into_iter().rev().fold(None, |cause, mut link| {
        link.cause = cause;
        Some(Box::new(link))
    })
}

fn debug_type_name(error: &(dyn StdError + 'static)) -> String {
    let debug = format!("{:?}", error);
    let name: String = debug
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == ':')
        .collect();
    if name.is_empty() {
        "Error".to_string()
    } else {
        name
    }
}

/// One frame of an exception's stack.
///
/// Serialized as `{path, line, label}` where `label` is the type qualifier,
/// call operator and function name concatenated. Missing parts serialize as
/// empty strings rather than being omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackFrame {
    path: Option<String>,
    line: Option<u32>,
    type_qualifier: Option<String>,
    call_operator: Option<String>,
    function: Option<String>,
}

impl StackFrame {
    /// Creates a frame with no location or label information.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frame from a demangled symbol such as
    /// `app::db::Pool::query`, splitting off the final path segment as the
    /// function name.
    ///
    /// ```rust
    /// use xray_segments::StackFrame;
    ///
    /// let frame = StackFrame::from_symbol("app::db::Pool::query");
    /// assert_eq!(frame.type_qualifier(), Some("app::db::Pool"));
    /// assert_eq!(frame.function(), Some("query"));
    /// assert_eq!(frame.label(), "app::db::Pool::query");
    /// ```
    pub fn from_symbol(symbol: &str) -> Self {
        let symbol = symbol.trim();
        match split_symbol(symbol) {
            Some((qualifier, function)) => Self::new()
                .with_type_qualifier(qualifier)
                .with_call_operator("::")
                .with_function(function),
            None => Self::new().with_function(symbol),
        }
    }

    /// Converts a backtrace into frames.
    ///
    /// Frames without a resolved file and line, and frames inside the
    /// standard library sources (`/rustc/...`), are left out.
    pub fn from_backtrace(backtrace: &Backtrace) -> Vec<StackFrame> {
        backtrace
            .frames()
            .iter()
            .filter_map(|frame| {
                let symbol = frame.symbols().first()?;
                let (path, line) = (symbol.filename()?, symbol.lineno()?);
                let path = path.to_string_lossy();
                if path.starts_with("/rustc/") {
                    return None;
                }
                let frame = match symbol.name() {
                    // {:#} drops the trailing ::h<hash>
                    Some(name) => StackFrame::from_symbol(&format!("{:#}", name)),
                    None => StackFrame::new(),
                };
                Some(frame.with_path(path).with_line(line))
            })
            .collect()
    }

    /// Captures the stack starting at the caller.
    ///
    /// Frames above the caller (this crate's own capture machinery) are
    /// dropped. If the caller's frame cannot be found in the resolved
    /// backtrace, a single frame holding the caller's location is returned.
    #[track_caller]
    pub fn capture() -> Vec<StackFrame> {
        let caller = Location::caller();
        let frames: Vec<StackFrame> = Self::from_backtrace(&Backtrace::new())
            .into_iter()
            .skip_while(|frame| !frame.is_at(caller))
            .collect();

        if frames.is_empty() {
            vec![
                StackFrame::new()
                    .with_path(caller.file())
                    .with_line(caller.line()),
            ]
        } else {
            frames
        }
    }

    fn is_at(&self, location: &Location<'_>) -> bool {
        self.line == Some(location.line())
            && self
                .path
                .as_deref()
                .is_some_and(|path| path.ends_with(location.file()))
    }

    /// Sets the source file path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the source line.
    #[must_use]
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Sets the type (or module path) the function belongs to.
    #[must_use]
    pub fn with_type_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.type_qualifier = Some(qualifier.into());
        self
    }

    /// Sets the operator joining qualifier and function (`::`, `.`, `->`).
    #[must_use]
    pub fn with_call_operator(mut self, operator: impl Into<String>) -> Self {
        self.call_operator = Some(operator.into());
        self
    }

    /// Sets the function name.
    #[must_use]
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    /// Returns the source file path.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Returns the source line.
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// Returns the type qualifier.
    pub fn type_qualifier(&self) -> Option<&str> {
        self.type_qualifier.as_deref()
    }

    /// Returns the call operator.
    pub fn call_operator(&self) -> Option<&str> {
        self.call_operator.as_deref()
    }

    /// Returns the function name.
    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    /// Returns qualifier, operator and function joined, each part defaulting
    /// to the empty string.
    pub fn label(&self) -> String {
        [&self.type_qualifier, &self.call_operator, &self.function]
            .into_iter()
            .map(|part| part.as_deref().unwrap_or(""))
            .collect()
    }
}

impl Serialize for StackFrame {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("path", self.path.as_deref().unwrap_or(""))?;
        match self.line {
            Some(line) => map.serialize_entry("line", &line)?,
            None => map.serialize_entry("line", "")?,
        }
        map.serialize_entry("label", &self.label())?;
        map.end()
    }
}

/// Splits at the last `::` outside of angle brackets.
fn split_symbol(symbol: &str) -> Option<(&str, &str)> {
    let bytes = symbol.as_bytes();
    let mut depth = 0i32;
    let mut split = None;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => depth += 1,
            // the '>' of a "->" return arrow closes nothing
            b'>' if i > 0 && bytes[i - 1] == b'-' => {}
            b'>' => depth -= 1,
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                split = Some(i);
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    let at = split?;
    let (qualifier, function) = (&symbol[..at], &symbol[at + 2..]);
    if qualifier.is_empty() || function.is_empty() {
        return None;
    }
    Some((qualifier, function))
}

/// The ordered list of exceptions attached to one segment.
#[derive(Debug, Clone, Default)]
pub struct ExceptionChain {
    working_directory: Option<String>,
    exceptions: Vec<Exception>,
}

impl ExceptionChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches an exception, recording the working directory on first use.
    pub fn push(&mut self, exception: Exception) {
        if self.exceptions.is_empty() && self.working_directory.is_none() {
            self.working_directory = std::env::current_dir()
                .ok()
                .map(|dir| dir.display().to_string());
        }
        self.exceptions.push(exception);
    }

    /// Returns `true` if nothing was attached.
    pub fn is_empty(&self) -> bool {
        self.exceptions.is_empty()
    }

    /// Returns the attached exceptions in attachment order, causes not expanded.
    pub fn exceptions(&self) -> &[Exception] {
        &self.exceptions
    }

    /// Returns the working directory recorded with the first attachment.
    pub fn working_directory(&self) -> Option<&str> {
        self.working_directory.as_deref()
    }

    /// Iterates over every record in serialization order: each attached
    /// exception followed by its causes, attached exceptions in order.
    pub fn records(&self) -> impl Iterator<Item = &Exception> {
        self.exceptions.iter().flat_map(Exception::chain)
    }
}

#[derive(Serialize)]
struct ExceptionRecord<'a> {
    id: ExceptionId,
    message: &'a str,
    #[serde(rename = "type")]
    type_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cause: Option<ExceptionId>,
    stack: &'a [StackFrame],
}

impl<'a> From<&'a Exception> for ExceptionRecord<'a> {
    fn from(exception: &'a Exception) -> Self {
        Self {
            id: exception.id,
            message: &exception.message,
            type_name: &exception.type_name,
            cause: exception.cause().map(Exception::id),
            stack: &exception.stack,
        }
    }
}

impl Serialize for ExceptionChain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let records: Vec<ExceptionRecord<'_>> = self.records().map(ExceptionRecord::from).collect();

        let mut map = serializer.serialize_map(None)?;
        if let Some(dir) = &self.working_directory {
            map.serialize_entry("working_directory", dir)?;
        }
        map.serialize_entry("exceptions", &records)?;
        map.end()
    }
}
