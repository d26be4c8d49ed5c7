//! Connection lifecycle: upgrade, receive loop and the application-facing
//! handle.
//!
//! ## Connection Lifecycle
//!
//! 1. **Connecting** - handshake checked, 101 written, buffers allocated
//! 2. **Open** - receive loop running, handler callbacks invoked
//! 3. **Closing** - close frame being sent, socket being shut down
//! 4. **Closed** - terminal; `on_close` has run or is about to
//!
//! ## Example
//!
//! ```rust,ignore
//! use microws::{accept, Config, HttpRequest};
//!
//! let request = HttpRequest::parse(&head)?;
//! let upgrade = accept(stream, &request, Config::new(), |_| Echo).await?;
//! upgrade.join().await;
//! ```

mod handler;
mod state;
mod websocket;

#[allow(clippy::module_inception)]
mod connection;

pub use connection::{Upgrade, accept};
pub use handler::WebSocketHandler;
pub use state::ConnectionState;
pub use websocket::{ByteStream, WebSocket};
