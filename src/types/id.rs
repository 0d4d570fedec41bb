//! Identifiers carried by segments and exception records.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::Error;

/// A 64-bit segment identifier, rendered as 16 lowercase hex characters.
///
/// Generated once when a [`Segment`](crate::Segment) is constructed and
/// stable for the segment's lifetime.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentId([u8; 8]);

impl SegmentId {
    /// Creates a new random segment ID.
    pub fn random() -> Self {
        Self(nonzero_random())
    }

    /// Creates a segment ID from bytes.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Creates a segment ID from a 16 character hex string.
    ///
    /// ```rust
    /// use xray_segments::SegmentId;
    ///
    /// let id = SegmentId::from_hex("53995c3f42cd8ad8").unwrap();
    /// assert_eq!(id.to_string(), "53995c3f42cd8ad8");
    /// ```
    pub fn from_hex(value: &str) -> Result<Self, Error> {
        decode_id(value).map(Self)
    }

    /// Returns the segment ID as bytes.
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl fmt::Debug for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SegmentId({})", self)
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl Serialize for SegmentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Identity of an attached exception record.
///
/// Assigned when the error is captured for attachment, so every
/// serialization of the same record reports the same id and a `cause`
/// reference always matches the id of the record it points at.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExceptionId([u8; 8]);

impl ExceptionId {
    /// Creates a new random exception ID.
    pub fn random() -> Self {
        Self(nonzero_random())
    }

    /// Returns the exception ID as bytes.
    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl fmt::Debug for ExceptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExceptionId({})", self)
    }
}

impl fmt::Display for ExceptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl Serialize for ExceptionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A trace identifier in the collector's format:
/// `1-<8 hex digits of epoch seconds>-<24 hex digits of randomness>`.
///
/// Segments store their trace id as a plain string so that ids received from
/// other processes are accepted as-is; this type exists to mint new ones and
/// to validate incoming ones when a caller wants to.
///
/// ```rust
/// use xray_segments::TraceId;
///
/// let id: TraceId = "1-5759e988-bd862e3fe1be46a994272793".parse().unwrap();
/// assert_eq!(id.epoch_seconds(), 0x5759e988);
/// assert_eq!(id.to_string(), "1-5759e988-bd862e3fe1be46a994272793");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId {
    epoch_seconds: u32,
    random: [u8; 12],
}

impl TraceId {
    const VERSION: &'static str = "1";

    /// Creates a new trace ID stamped with the current time.
    pub fn generate() -> Self {
        // Truncation to 32 bits matches the collector's format; it wraps in 2106.
        let epoch_seconds = chrono::Utc::now().timestamp() as u32;
        let mut random = [0u8; 12];
        fastrand::fill(&mut random);
        Self {
            epoch_seconds,
            random,
        }
    }

    /// Returns the embedded creation time in seconds since the Unix epoch.
    pub fn epoch_seconds(&self) -> u32 {
        self.epoch_seconds
    }
}

impl FromStr for TraceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::invalid_argument(format!("invalid trace ID: {:?}", s));

        let mut parts = s.split('-');
        let (Some(version), Some(epoch), Some(random), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        if version != Self::VERSION || epoch.len() != 8 || random.len() != 24 {
            return Err(invalid());
        }

        let epoch_seconds = u32::from_str_radix(epoch, 16).map_err(|_| invalid())?;
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(random, &mut bytes).map_err(|_| invalid())?;

        Ok(Self {
            epoch_seconds,
            random: bytes,
        })
    }
}

impl fmt::Debug for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TraceId({})", self)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:08x}-{}",
            Self::VERSION,
            self.epoch_seconds,
            hex::encode(self.random)
        )
    }
}

impl From<TraceId> for String {
    fn from(id: TraceId) -> Self {
        id.to_string()
    }
}

// All-zero ids are rejected by the collector.
fn nonzero_random() -> [u8; 8] {
    fastrand::u64(1..).to_be_bytes()
}

fn decode_id(value: &str) -> Result<[u8; 8], Error> {
    if value.len() != 16 {
        return Err(Error::invalid_argument(format!(
            "expected 16 hex characters, got {:?}",
            value
        )));
    }
    let mut bytes = [0u8; 8];
    hex::decode_to_slice(value, &mut bytes).map_err(|err| {
        Error::invalid_argument(format!("invalid hex id {:?}", value)).with_source(err)
    })?;
    Ok(bytes)
}
