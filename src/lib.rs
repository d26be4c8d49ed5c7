//! # microws - Small-footprint WebSocket server engine
//!
//! `microws` turns an accepted HTTP connection into a WebSocket (RFC 6455
//! subset) and drives it with a fixed memory budget: one message buffer
//! sized from configuration and one 125-byte control buffer per connection.
//!
//! ## Features
//!
//! - **Handshake negotiation** from an already parsed HTTP request
//! - **Streaming frame reader** that never buffers beyond the current frame
//! - **Fragmented message reassembly** with no partial delivery
//! - **Automatic ping/pong and close replies**
//! - **Inline or task-per-connection execution**
//!
//! Frames longer than 65535 bytes (64-bit length) and extensions are not
//! supported.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use microws::{accept, async_trait, CallbackResult, Config, ExecutionMode, HttpRequest, WebSocket, WebSocketHandler};
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl WebSocketHandler for Echo {
//!     async fn on_text(&mut self, ws: &mut WebSocket, text: String) -> CallbackResult {
//!         ws.send_text(&text).await?;
//!         Ok(())
//!     }
//! }
//!
//! let request = HttpRequest::parse(&head)?;
//! let config = Config::new().with_execution_mode(ExecutionMode::Concurrent);
//! accept(stream, &request, config, |_| Echo).await?;
//! ```

pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod protocol;

pub use async_trait::async_trait;
pub use codec::WebSocketCodec;
pub use config::{Config, ExecutionMode, Limits, Timeouts};
pub use connection::{
    ByteStream, ConnectionState, Upgrade, WebSocket, WebSocketHandler, accept,
};
pub use error::{CallbackError, CallbackResult, Error, ErrorKind, Resource, Result};
pub use protocol::{
    HandshakeResponse, HttpRequest, OpCode, WS_GUID, compute_accept_key, negotiate,
};
