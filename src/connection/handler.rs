use async_trait::async_trait;

use crate::connection::WebSocket;
use crate::error::CallbackResult;

/// Application callbacks for one WebSocket connection.
///
/// One handler is created per connection by the accept callback and owned by
/// that connection's receive loop. Callbacks run to completion before the
/// next frame is read, so a handler never sees two messages at once.
///
/// Errors returned from any callback are logged and otherwise ignored; they
/// never close the connection. Call [`WebSocket::close`] to do that.
///
/// ## Example
///
/// ```rust,ignore
/// struct Echo;
///
/// #[async_trait]
/// impl WebSocketHandler for Echo {
///     async fn on_text(&mut self, ws: &mut WebSocket, text: String) -> CallbackResult {
///         ws.send_text(&text).await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait WebSocketHandler: Send {
    /// Called once when the connection enters `Open`, before any frame is read.
    async fn on_open(&mut self, _ws: &mut WebSocket) -> CallbackResult {
        Ok(())
    }

    /// Called with every complete text message that decoded as UTF-8.
    async fn on_text(&mut self, _ws: &mut WebSocket, _text: String) -> CallbackResult {
        Ok(())
    }

    /// Called with every complete binary message.
    async fn on_binary(&mut self, _ws: &mut WebSocket, _data: Vec<u8>) -> CallbackResult {
        Ok(())
    }

    /// Called exactly once after the connection has closed.
    async fn on_close(&mut self) -> CallbackResult {
        Ok(())
    }
}
