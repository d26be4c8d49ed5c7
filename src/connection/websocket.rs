use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use crate::codec::WebSocketCodec;
use crate::config::Config;
use crate::connection::ConnectionState;
use crate::error::{Error, Result};
use crate::protocol::OpCode;

/// A byte stream a WebSocket can run over.
///
/// Implemented for every tokio stream that can be moved to another task,
/// such as `TcpStream` or `DuplexStream`.
pub trait ByteStream: AsyncRead + AsyncWrite + Unpin + Send + 'static {}

impl<T> ByteStream for T where T: AsyncRead + AsyncWrite + Unpin + Send + 'static {}

/// Handle to an upgraded connection, passed to every handler callback.
///
/// Sends are unmasked single frames. Closing is idempotent: the first call
/// sends a close frame and shuts the socket down, later calls do nothing.
pub struct WebSocket {
    codec: WebSocketCodec<Box<dyn ByteStream>>,
    state: ConnectionState,
}

impl WebSocket {
    pub(crate) fn new(stream: Box<dyn ByteStream>, config: &Config) -> Self {
        Self {
            codec: WebSocketCodec::new(stream, config),
            state: ConnectionState::Connecting,
        }
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// True once the socket has been shut down.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state == ConnectionState::Closed
    }

    /// Send a text message as one frame.
    ///
    /// # Errors
    ///
    /// - `Error::ConnectionClosed` if the connection is not open
    /// - `Error::FrameTooLarge` if `text` is longer than 65535 bytes
    /// - Transport errors if the write fails or times out
    pub async fn send_text(&mut self, text: &str) -> Result<()> {
        self.send_frame(OpCode::Text, text.as_bytes()).await
    }

    /// Send a binary message as one frame.
    ///
    /// # Errors
    ///
    /// Same as [`send_text`](Self::send_text).
    pub async fn send_binary(&mut self, data: &[u8]) -> Result<()> {
        self.send_frame(OpCode::Binary, data).await
    }

    /// Force-close the connection with an empty close frame.
    ///
    /// Write and shutdown failures are ignored; the connection ends up
    /// `Closed` either way.
    pub async fn close(&mut self) {
        self.close_with(&[]).await;
    }

    pub(crate) async fn send_frame(&mut self, opcode: OpCode, payload: &[u8]) -> Result<()> {
        if !self.state.can_send() {
            return Err(Error::ConnectionClosed);
        }
        self.codec.write_frame(opcode, payload).await
    }

    /// Tear down with `payload` as the close frame body.
    ///
    /// A connection that never opened is only shut down.
    pub(crate) async fn close_with(&mut self, payload: &[u8]) {
        if self.state.is_closing() {
            return;
        }

        let was_open = self.state == ConnectionState::Open;
        self.transition(ConnectionState::Closing);

        if was_open {
            if let Err(e) = self.codec.write_frame(OpCode::Close, payload).await {
                debug!("Failed to send close frame: {}", e);
            }
        }
        if let Err(e) = self.codec.shutdown().await {
            debug!("Failed to shut down socket: {}", e);
        }

        self.transition(ConnectionState::Closed);
    }

    pub(crate) fn transition(&mut self, next: ConnectionState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        debug!("WebSocket state {} -> {}", self.state, next);
        self.state = next;
    }

    pub(crate) fn codec_mut(&mut self) -> &mut WebSocketCodec<Box<dyn ByteStream>> {
        &mut self.codec
    }
}

impl std::fmt::Debug for WebSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocket")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
