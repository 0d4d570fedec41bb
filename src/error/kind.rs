//! Error kind enumeration for categorizing library errors.

/// Categorization of library errors.
///
/// | ErrorKind         | Raised by                                   |
/// |-------------------|---------------------------------------------|
/// | `InvalidArgument` | Trace header parsing, daemon address parsing |
/// | `Configuration`   | Daemon configuration that cannot be used     |
/// | `Connection`      | Opening the local UDP socket                 |
/// | `Transport`       | Sending a datagram to the daemon             |
/// | `Serialization`   | Rendering a segment payload                  |
/// | `Unknown`         | Anything else                                |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An input could not be interpreted (malformed header or address).
    #[error("invalid argument")]
    InvalidArgument,

    /// Configuration is present but unusable.
    #[error("configuration error")]
    Configuration,

    /// The local socket could not be created or bound.
    #[error("connection error")]
    Connection,

    /// The payload could not be handed to the daemon.
    #[error("transport error")]
    Transport,

    /// The segment could not be rendered to JSON.
    #[error("serialization error")]
    Serialization,

    /// Unknown or unexpected error.
    #[error("unknown error")]
    Unknown,
}

impl ErrorKind {
    /// Returns `true` if the failure happened while delivering a payload.
    ///
    /// Delivery failures are expected in environments without a running
    /// daemon and are reported at `warn` level rather than treated as bugs.
    ///
    /// ```rust
    /// use xray_segments::ErrorKind;
    ///
    /// assert!(ErrorKind::Transport.is_delivery_failure());
    /// assert!(!ErrorKind::InvalidArgument.is_delivery_failure());
    /// ```
    #[inline]
    pub fn is_delivery_failure(&self) -> bool {
        matches!(self, ErrorKind::Connection | ErrorKind::Transport)
    }
}
