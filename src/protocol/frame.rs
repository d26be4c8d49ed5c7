//! WebSocket frame header decoding and encoding (RFC 6455 section 5.2).
//!
//! Only the header is modelled here. Payload bytes never pass through this
//! module: the reader streams them straight into the connection's message
//! or control buffer, and the writer copies them behind an encoded header.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-------+-+-------------+-------------------------------+
//! |F|R|R|R| opcode|M| Payload len |    Extended payload length    |
//! |I|S|S|S|  (4)  |A|     (7)     |        (16, if len==126)      |
//! |N|V|V|V|       |S|             |                               |
//! +-+-+-+-+-------+-+-------------+-------------------------------+
//! |                Masking key (if MASK is set)                   |
//! +---------------------------------------------------------------+
//! ```
//!
//! Length code 127 (64-bit extended length) is not supported and is rejected
//! before any extended-length byte is read.

use bytes::{BufMut, BytesMut};

use crate::error::{Error, Result};
use crate::protocol::OpCode;

/// Maximum payload size for control frames (RFC 6455).
pub const MAX_CONTROL_FRAME_PAYLOAD: usize = 125;

/// Largest payload that fits the 16-bit extended length.
pub const MAX_FRAME_PAYLOAD: usize = u16::MAX as usize;

const LEN_EXTENDED_16: u8 = 126;
const LEN_EXTENDED_64: u8 = 127;

/// Payload length as announced by the second header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LengthCode {
    Short(u8),
    Extended16,
}

/// The fixed two-byte part of a frame header.
///
/// Tells the reader how many more header bytes to fetch before the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderPrefix {
    fin: bool,
    rsv: u8,
    opcode: OpCode,
    masked: bool,
    length: LengthCode,
}

impl HeaderPrefix {
    /// Decode the first two header bytes.
    ///
    /// # Errors
    ///
    /// - `Error::ReservedOpcode` if the opcode is not one the engine knows
    /// - `Error::UnsupportedPayloadLength` for length code 127
    pub fn parse(bytes: [u8; 2]) -> Result<Self> {
        let [byte0, byte1] = bytes;

        let opcode = OpCode::from_u8(byte0 & 0x0F)?;
        let length = match byte1 & 0x7F {
            LEN_EXTENDED_64 => return Err(Error::UnsupportedPayloadLength),
            LEN_EXTENDED_16 => LengthCode::Extended16,
            short => LengthCode::Short(short),
        };

        Ok(Self {
            fin: (byte0 & 0x80) != 0,
            rsv: (byte0 >> 4) & 0x07,
            opcode,
            masked: (byte1 & 0x80) != 0,
            length,
        })
    }

    /// Whether a masking key follows.
    #[must_use]
    pub const fn is_masked(&self) -> bool {
        self.masked
    }

    /// Number of header bytes still to read: extended length plus mask key.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        let ext = match self.length {
            LengthCode::Short(_) => 0,
            LengthCode::Extended16 => 2,
        };
        if self.masked { ext + 4 } else { ext }
    }

    /// Finish the header with the bytes announced by [`remaining`](Self::remaining).
    ///
    /// # Errors
    ///
    /// Returns `Error::ProtocolViolation` if `rest` has the wrong length.
    pub fn complete(self, rest: &[u8]) -> Result<FrameHeader> {
        if rest.len() != self.remaining() {
            return Err(Error::ProtocolViolation(format!(
                "Expected {} header bytes, got {}",
                self.remaining(),
                rest.len()
            )));
        }

        let (payload_len, rest) = match self.length {
            LengthCode::Short(len) => (len as usize, rest),
            LengthCode::Extended16 => (u16::from_be_bytes([rest[0], rest[1]]) as usize, &rest[2..]),
        };

        let mask = if self.masked {
            Some([rest[0], rest[1], rest[2], rest[3]])
        } else {
            None
        };

        Ok(FrameHeader {
            fin: self.fin,
            rsv: self.rsv,
            opcode: self.opcode,
            mask,
            payload_len,
        })
    }
}

/// A decoded frame header.
///
/// The payload it describes is read separately into a caller-provided slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Final fragment flag.
    pub fin: bool,
    /// RSV1..RSV3 as the low three bits.
    pub rsv: u8,
    /// Frame opcode.
    pub opcode: OpCode,
    /// Masking key, present when the MASK bit was set.
    pub mask: Option<[u8; 4]>,
    /// Declared payload length.
    pub payload_len: usize,
}

impl FrameHeader {
    /// Decode a complete header from the front of `buf`.
    ///
    /// Returns the header and the number of bytes it occupied. Mainly useful
    /// when the whole frame is already in memory.
    ///
    /// # Errors
    ///
    /// Same as [`HeaderPrefix::parse`], plus `Error::ProtocolViolation` if
    /// `buf` ends inside the header.
    pub fn parse(buf: &[u8]) -> Result<(Self, usize)> {
        if buf.len() < 2 {
            return Err(Error::ProtocolViolation("Truncated frame header".into()));
        }
        let prefix = HeaderPrefix::parse([buf[0], buf[1]])?;
        let header_len = 2 + prefix.remaining();
        if buf.len() < header_len {
            return Err(Error::ProtocolViolation("Truncated frame header".into()));
        }
        let header = prefix.complete(&buf[2..header_len])?;
        Ok((header, header_len))
    }

    /// Check the rules every incoming frame must satisfy.
    ///
    /// # Errors
    ///
    /// - `Error::ReservedBitsSet` if any RSV bit is set (no extensions are negotiated)
    /// - `Error::FragmentedControlFrame` if a control frame has FIN=0
    /// - `Error::ControlFrameTooLarge` if a control payload exceeds 125 bytes
    pub fn validate(&self) -> Result<()> {
        if self.rsv != 0 {
            return Err(Error::ReservedBitsSet);
        }

        if self.opcode.is_control() {
            if !self.fin {
                return Err(Error::FragmentedControlFrame);
            }
            if self.payload_len > MAX_CONTROL_FRAME_PAYLOAD {
                return Err(Error::ControlFrameTooLarge(self.payload_len));
            }
        }

        Ok(())
    }

    /// Encode an unmasked server header for a payload of `payload_len` bytes.
    ///
    /// # Errors
    ///
    /// Returns `Error::FrameTooLarge` if `payload_len` exceeds 65535; nothing
    /// is written to `dst` in that case.
    pub fn encode(fin: bool, opcode: OpCode, payload_len: usize, dst: &mut BytesMut) -> Result<()> {
        if payload_len > MAX_FRAME_PAYLOAD {
            return Err(Error::FrameTooLarge {
                size: payload_len,
                max: MAX_FRAME_PAYLOAD,
            });
        }

        let byte0 = if fin {
            0x80 | opcode.as_u8()
        } else {
            opcode.as_u8()
        };
        dst.reserve(Self::encoded_len(payload_len));
        dst.put_u8(byte0);

        if payload_len < LEN_EXTENDED_16 as usize {
            dst.put_u8(payload_len as u8);
        } else {
            dst.put_u8(LEN_EXTENDED_16);
            dst.put_u16(payload_len as u16);
        }

        Ok(())
    }

    /// Size of an unmasked header for a payload of `payload_len` bytes.
    #[must_use]
    pub const fn encoded_len(payload_len: usize) -> usize {
        if payload_len < LEN_EXTENDED_16 as usize {
            2
        } else {
            4
        }
    }
}
