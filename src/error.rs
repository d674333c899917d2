//! Error types for the IEC 60870-5-104 connection engine.
//!
//! Every error is `Clone` so that a single close cause can be handed to the
//! event listener and to every caller blocked on the connection.

use std::borrow::Cow;
use std::fmt;

use thiserror::Error;

/// Result type alias for IEC 104 operations.
pub type Result<T> = std::result::Result<T, Iec104Error>;

/// Which supervision or handshake deadline elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutKind {
    /// No acknowledgment of a sent I-frame or U-frame within t1.
    T1,
    /// No STARTDT exchange completed within the handshake timeout.
    StartDt,
}

impl fmt::Display for TimeoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::T1 => write!(f, "t1"),
            Self::StartDt => write!(f, "STARTDT"),
        }
    }
}

/// Transport failure classification.
///
/// End-of-stream and I/O failures share one taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The peer closed the stream between two frames.
    EndOfStream,
    /// The underlying socket reported an error.
    Io(std::io::ErrorKind),
}

/// IEC 60870-5-104 error types.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Iec104Error {
    /// Malformed or oversized APDU.
    #[error("Framing error: {0}")]
    Framing(Cow<'static, str>),

    /// Out-of-order I-frame or acknowledgment of unsent frames.
    #[error("Sequence error: expected {expected}, got {actual}")]
    Sequence { expected: u16, actual: u16 },

    /// Frame not legal in the current link state.
    #[error("Protocol state error: {0}")]
    ProtocolState(Cow<'static, str>),

    /// A link supervision deadline elapsed.
    #[error("{0} timeout")]
    Timeout(TimeoutKind),

    /// The byte stream ended or failed.
    #[error("Transport error ({kind:?}): {message}")]
    Transport {
        kind: TransportErrorKind,
        message: Cow<'static, str>,
    },

    /// Invalid ASDU contents.
    #[error("Invalid ASDU: {0}")]
    InvalidAsdu(Cow<'static, str>),

    /// Type identification without a known element layout.
    #[error("Unknown type ID: {0}")]
    UnknownTypeId(u8),

    /// Cause of transmission code outside the defined set.
    #[error("Unknown COT: {0}")]
    UnknownCot(u8),

    /// Data transfer has not been started on this connection.
    #[error("Data transfer not started")]
    NotStarted,

    /// No application confirmation arrived in time; the link stays open.
    #[error("Response timeout")]
    ResponseTimeout,

    /// The connection was closed locally.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Invalid connection settings.
    #[error("Configuration error: {0}")]
    Config(Cow<'static, str>),
}

impl Iec104Error {
    /// Create a framing error from a static message.
    #[inline]
    pub const fn framing_static(msg: &'static str) -> Self {
        Self::Framing(Cow::Borrowed(msg))
    }

    /// Create a framing error.
    pub fn framing(msg: impl Into<String>) -> Self {
        Self::Framing(Cow::Owned(msg.into()))
    }

    /// Create a protocol state error from a static message.
    #[inline]
    pub const fn protocol_static(msg: &'static str) -> Self {
        Self::ProtocolState(Cow::Borrowed(msg))
    }

    /// Create an invalid ASDU error from a static message.
    #[inline]
    pub const fn invalid_asdu_static(msg: &'static str) -> Self {
        Self::InvalidAsdu(Cow::Borrowed(msg))
    }

    /// Create an invalid ASDU error.
    pub fn invalid_asdu(msg: impl Into<String>) -> Self {
        Self::InvalidAsdu(Cow::Owned(msg.into()))
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(Cow::Owned(msg.into()))
    }

    /// Stream closed by the peer.
    #[inline]
    pub const fn end_of_stream() -> Self {
        Self::Transport {
            kind: TransportErrorKind::EndOfStream,
            message: Cow::Borrowed("stream closed by peer"),
        }
    }

    /// Check if this error tears down the connection it occurred on.
    pub fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Check if the connection stays usable after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotStarted | Self::ResponseTimeout | Self::Config(_)
        )
    }
}

impl From<std::io::Error> for Iec104Error {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::UnexpectedEof => TransportErrorKind::EndOfStream,
            other => TransportErrorKind::Io(other),
        };
        Self::Transport {
            kind,
            message: Cow::Owned(err.to_string()),
        }
    }
}
