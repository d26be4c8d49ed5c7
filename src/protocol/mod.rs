//! WebSocket protocol core (RFC 6455 subset).

pub mod assembler;
pub mod control;
pub mod frame;
pub mod handshake;
pub mod mask;
pub mod opcode;

pub use assembler::{AssembledMessage, MessageAssembler, MessageKind};
pub use control::{ControlAction, ControlBuffer};
pub use frame::{FrameHeader, HeaderPrefix, MAX_CONTROL_FRAME_PAYLOAD, MAX_FRAME_PAYLOAD};
pub use handshake::{HandshakeResponse, HttpRequest, WS_GUID, compute_accept_key, negotiate};
pub use mask::{apply_mask, apply_mask_fast};
pub use opcode::OpCode;
