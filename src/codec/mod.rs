//! Frame-level reading and writing over async streams.
//!
//! The reader never buffers past the frame it is decoding: header bytes are
//! fetched in the exact amounts the header announces and payloads land in
//! buffers owned by the connection.

mod framed;

pub use framed::WebSocketCodec;
