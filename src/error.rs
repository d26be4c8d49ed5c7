//! Error types for the WebSocket engine.
//!
//! Every failure is local to one connection. [`Error::kind`] groups the
//! variants into the handful of outcomes the connection lifecycle acts on.

use thiserror::Error;

/// Result type alias for WebSocket operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error returned by an application handler callback.
///
/// Callback errors are logged where the callback was invoked and never
/// close the connection.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Result type returned by [`WebSocketHandler`](crate::WebSocketHandler) methods.
pub type CallbackResult = std::result::Result<(), CallbackError>;

/// Resource that could not be acquired for a new connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// The fixed-capacity message buffer.
    MessageBuffer {
        /// Requested capacity in bytes.
        size: usize,
    },
    /// The per-connection worker task.
    Worker,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::MessageBuffer { size } => write!(f, "message buffer of {} bytes", size),
            Resource::Worker => write!(f, "connection worker"),
        }
    }
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The upgrade request could not be accepted.
    Handshake,
    /// The peer violated the framing rules.
    Protocol,
    /// The underlying stream failed, ended or timed out.
    Transport,
    /// Buffers or a worker could not be acquired.
    Resource,
    /// The local caller asked for something the engine does not support.
    Usage,
}

/// Errors that can occur during WebSocket operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Invalid or incomplete upgrade request.
    #[error("Invalid handshake: {0}")]
    InvalidHandshake(String),

    /// Response header value would break the HTTP framing.
    #[error("Invalid value for header {header}: {reason}")]
    InvalidHeaderValue {
        /// Header name.
        header: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Frame ordering violation (continuation handling).
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// Reserved opcode used.
    #[error("Reserved opcode: {0:#x}")]
    ReservedOpcode(u8),

    /// 64-bit extended payload length marker received.
    #[error("64-bit payload lengths are not supported")]
    UnsupportedPayloadLength,

    /// Control frame fragmented (RFC violation).
    #[error("Control frames cannot be fragmented")]
    FragmentedControlFrame,

    /// Control frame payload too large (>125 bytes).
    #[error("Control frame payload too large: {0} bytes (max: 125)")]
    ControlFrameTooLarge(usize),

    /// Reserved bits set without extension.
    #[error("Reserved bits set without negotiated extension")]
    ReservedBitsSet,

    /// Unmasked client frame while masking is enforced.
    #[error("Client frame must be masked")]
    UnmaskedClientFrame,

    /// Incoming message would overrun the message buffer.
    #[error("Message too large: {size} bytes (max: {max})")]
    MessageTooLarge {
        /// Size the message would reach.
        size: usize,
        /// Message buffer capacity.
        max: usize,
    },

    /// Outgoing payload cannot be encoded with a 16-bit length.
    #[error("Frame too large: {size} bytes (max: {max})")]
    FrameTooLarge {
        /// Payload size.
        size: usize,
        /// Largest encodable payload.
        max: usize,
    },

    /// Invalid UTF-8 in a text message.
    #[error("Invalid UTF-8 in text message")]
    InvalidUtf8,

    /// Connection is not open.
    #[error("Connection closed")]
    ConnectionClosed,

    /// The socket idle or write timeout expired.
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),

    /// Buffer or worker acquisition failed.
    #[error("Resource exhausted: {0}")]
    ResourceExhaustion(Resource),
}

impl Error {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidHandshake(_) | Error::InvalidHeaderValue { .. } => ErrorKind::Handshake,
            Error::ProtocolViolation(_)
            | Error::ReservedOpcode(_)
            | Error::UnsupportedPayloadLength
            | Error::FragmentedControlFrame
            | Error::ControlFrameTooLarge(_)
            | Error::ReservedBitsSet
            | Error::UnmaskedClientFrame
            | Error::MessageTooLarge { .. } => ErrorKind::Protocol,
            Error::ConnectionClosed | Error::Timeout(_) | Error::Io(_) => ErrorKind::Transport,
            Error::ResourceExhaustion(_) => ErrorKind::Resource,
            Error::FrameTooLarge { .. } | Error::InvalidUtf8 => ErrorKind::Usage,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(_: std::string::FromUtf8Error) -> Self {
        Error::InvalidUtf8
    }
}
