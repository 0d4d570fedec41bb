//! Scalar values accepted as segment annotations.

use serde::Serialize;

/// A value that can be recorded as an annotation.
///
/// Annotations are indexed by the collector, so only scalars are allowed.
/// Arbitrary JSON belongs in metadata instead.
///
/// ```rust
/// use xray_segments::AnnotationValue;
///
/// assert_eq!(AnnotationValue::from("eu-west-1").as_str(), Some("eu-west-1"));
/// assert_eq!(AnnotationValue::from(3i64).as_int(), Some(3));
/// assert_eq!(AnnotationValue::from(true).as_bool(), Some(true));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    /// A string value.
    String(String),
    /// An integer value.
    Int(i64),
    /// A float value.
    Float(f64),
    /// A boolean value.
    Bool(bool),
}

impl AnnotationValue {
    /// Returns the value as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AnnotationValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float, if it is one.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AnnotationValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnnotationValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl std::fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnnotationValue::String(s) => write!(f, "{}", s),
            AnnotationValue::Int(i) => write!(f, "{}", i),
            AnnotationValue::Float(fl) => write!(f, "{}", fl),
            AnnotationValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for AnnotationValue {
    fn from(s: &str) -> Self {
        AnnotationValue::String(s.to_string())
    }
}

impl From<String> for AnnotationValue {
    fn from(s: String) -> Self {
        AnnotationValue::String(s)
    }
}

impl From<i64> for AnnotationValue {
    fn from(i: i64) -> Self {
        AnnotationValue::Int(i)
    }
}

impl From<i32> for AnnotationValue {
    fn from(i: i32) -> Self {
        AnnotationValue::Int(i as i64)
    }
}

impl From<u32> for AnnotationValue {
    fn from(i: u32) -> Self {
        AnnotationValue::Int(i as i64)
    }
}

impl From<f64> for AnnotationValue {
    fn from(f: f64) -> Self {
        AnnotationValue::Float(f)
    }
}

impl From<bool> for AnnotationValue {
    fn from(b: bool) -> Self {
        AnnotationValue::Bool(b)
    }
}
