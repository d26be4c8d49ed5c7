//! Control frame handling: ping, pong and close.

use crate::error::{Error, Result};
use crate::protocol::OpCode;
use crate::protocol::frame::MAX_CONTROL_FRAME_PAYLOAD;

/// Fixed buffer holding the payload of one control frame.
#[derive(Debug, Clone)]
pub struct ControlBuffer {
    data: [u8; MAX_CONTROL_FRAME_PAYLOAD],
}

impl Default for ControlBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlBuffer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            data: [0; MAX_CONTROL_FRAME_PAYLOAD],
        }
    }

    /// Slice to read a control payload of `len` bytes into.
    ///
    /// # Errors
    ///
    /// Returns `Error::ControlFrameTooLarge` if `len` exceeds 125.
    pub fn slot(&mut self, len: usize) -> Result<&mut [u8]> {
        self.data
            .get_mut(..len)
            .ok_or(Error::ControlFrameTooLarge(len))
    }
}

/// What the connection must do after reading a control frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction<'a> {
    /// Write a pong carrying this payload before reading anything else.
    Pong(&'a [u8]),
    /// Reply with a close frame carrying this payload, then tear down.
    Close(&'a [u8]),
    /// Nothing to do.
    Ignore,
}

/// Decide how to answer a control frame whose payload has been read.
///
/// A close reply echoes the peer's status code, but not its reason.
#[must_use]
pub fn respond(opcode: OpCode, payload: &[u8]) -> ControlAction<'_> {
    match opcode {
        OpCode::Ping => ControlAction::Pong(payload),
        OpCode::Close => ControlAction::Close(payload.get(..2).unwrap_or_default()),
        _ => ControlAction::Ignore,
    }
}
