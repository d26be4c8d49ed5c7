//! Message reassembly into a fixed-capacity buffer.
//!
//! The buffer is allocated once per connection. Each data frame reserves a
//! slice at the current offset, the reader fills and unmasks it in place,
//! and the frame is then committed. Nothing is delivered until the final
//! fragment arrives, so a capacity overrun never yields a partial message.

use crate::error::{Error, Result, Resource};
use crate::protocol::OpCode;
use crate::protocol::frame::FrameHeader;

/// Type of the message currently being assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// UTF-8 text.
    Text,
    /// Arbitrary bytes.
    Binary,
}

/// Reassembles fragmented WebSocket messages into a fixed buffer.
#[derive(Debug)]
pub struct MessageAssembler {
    buffer: Vec<u8>,
    len: usize,
    pending: usize,
    kind: Option<MessageKind>,
}

impl MessageAssembler {
    /// Allocate the message buffer.
    ///
    /// # Errors
    ///
    /// Returns `Error::ResourceExhaustion` if `capacity` bytes cannot be
    /// allocated.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(capacity)
            .map_err(|_| Error::ResourceExhaustion(Resource::MessageBuffer { size: capacity }))?;
        buffer.resize(capacity, 0);

        Ok(Self {
            buffer,
            len: 0,
            pending: 0,
            kind: None,
        })
    }

    /// Capacity of the message buffer in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    #[cfg(test)]
    fn buffered(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    fn is_assembling(&self) -> bool {
        self.kind.is_some()
    }

    /// Reserve room for the payload of a data frame.
    ///
    /// Returns the slice the payload must be read into.
    ///
    /// # Errors
    ///
    /// - `Error::ProtocolViolation` for a continuation with no message in
    ///   progress, or a new text/binary frame while one is in progress
    /// - `Error::MessageTooLarge` if the payload does not fit the remaining space
    pub fn reserve(&mut self, header: &FrameHeader) -> Result<&mut [u8]> {
        let kind = match (header.opcode, self.kind) {
            (OpCode::Continuation, Some(kind)) => kind,
            (OpCode::Continuation, None) => {
                return Err(Error::ProtocolViolation(
                    "Unexpected continuation frame".into(),
                ));
            }
            (OpCode::Text | OpCode::Binary, Some(_)) => {
                return Err(Error::ProtocolViolation(
                    "Expected continuation frame".into(),
                ));
            }
            (OpCode::Text, None) => MessageKind::Text,
            (OpCode::Binary, None) => MessageKind::Binary,
            (opcode, _) => {
                return Err(Error::ProtocolViolation(format!(
                    "{} is not a data frame",
                    opcode
                )));
            }
        };

        let remaining = self.capacity() - self.len;
        if header.payload_len > remaining {
            return Err(Error::MessageTooLarge {
                size: self.len + header.payload_len,
                max: self.capacity(),
            });
        }

        self.kind = Some(kind);
        self.pending = header.payload_len;
        Ok(&mut self.buffer[self.len..self.len + header.payload_len])
    }

    /// Commit the slice handed out by the last [`reserve`](Self::reserve).
    ///
    /// Returns the complete message when `fin` is set and resets to the
    /// empty state.
    pub fn commit(&mut self, fin: bool) -> Option<AssembledMessage> {
        self.len += self.pending;
        self.pending = 0;

        if !fin {
            return None;
        }

        let kind = self.kind.take()?;
        let payload = self.buffer[..self.len].to_vec();
        self.len = 0;
        Some(AssembledMessage { kind, payload })
    }
}

/// A fully assembled WebSocket message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledMessage {
    /// Message type, taken from the first fragment.
    pub kind: MessageKind,
    /// Concatenated payload of all fragments.
    pub payload: Vec<u8>,
}

impl AssembledMessage {
    /// Decode the payload as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUtf8` if the payload is not valid UTF-8.
    pub fn into_text(self) -> Result<String> {
        Ok(String::from_utf8(self.payload)?)
    }

    /// Take the raw payload.
    #[must_use]
    pub fn into_binary(self) -> Vec<u8> {
        self.payload
    }
}
