use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, debug_span, trace, warn};

use crate::config::{Config, ExecutionMode};
use crate::connection::{ByteStream, ConnectionState, WebSocket, WebSocketHandler};
use crate::error::{Error, ErrorKind, Resource, Result};
use crate::protocol::control::{self, ControlAction, ControlBuffer};
use crate::protocol::{
    AssembledMessage, HttpRequest, MessageAssembler, MessageKind, OpCode, negotiate,
};

/// How an accepted connection was run.
#[derive(Debug)]
pub enum Upgrade {
    /// The connection ran inline and has already closed.
    Completed,
    /// The connection runs on its own task.
    Spawned(JoinHandle<()>),
}

impl Upgrade {
    /// Wait for a spawned connection to finish. Returns immediately for
    /// [`Upgrade::Completed`].
    pub async fn join(self) {
        if let Upgrade::Spawned(handle) = self {
            if let Err(e) = handle.await {
                warn!("WebSocket connection task failed: {}", e);
            }
        }
    }
}

/// Upgrade an accepted socket to a WebSocket connection.
///
/// `request` is the HTTP request the socket delivered, already read off the
/// stream. On a valid handshake the 101 response is written and the message
/// buffer allocated. The receive loop then runs inline or on its own task
/// according to `config.execution_mode`, and calls `on_accept` to build the
/// connection's handler once the connection is open.
///
/// On any error the socket is shut down before returning. A rejected
/// handshake never gets a 101 response, and a connection rejected before it
/// opens never gets a close frame, an `on_accept` call or an `on_close` call.
///
/// In inline mode a panicking handler is caught and logged; only its
/// connection is dropped.
///
/// # Errors
///
/// - `Error::InvalidHandshake` / `Error::InvalidHeaderValue` for a bad upgrade request
/// - `Error::ResourceExhaustion` if the message buffer cannot be allocated, or
///   in concurrent mode when no tokio runtime is available to spawn on
/// - Transport errors if the 101 response cannot be written
pub async fn accept<S, F, H>(
    stream: S,
    request: &HttpRequest,
    config: Config,
    on_accept: F,
) -> Result<Upgrade>
where
    S: ByteStream,
    F: FnOnce(&HttpRequest) -> H + Send + 'static,
    H: WebSocketHandler + 'static,
{
    let mut ws = WebSocket::new(Box::new(stream), &config);

    let response = match negotiate(request) {
        Ok(response) => response,
        Err(e) => return Err(reject(ws, e).await),
    };

    let mut head = Vec::new();
    let written = match response.write(&mut head) {
        Ok(()) => ws.codec_mut().write_raw(&head).await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        return Err(reject(ws, e).await);
    }

    let assembler = match MessageAssembler::with_capacity(config.limits.max_message_size) {
        Ok(assembler) => assembler,
        Err(e) => return Err(reject(ws, e).await),
    };

    let mode = config.execution_mode;
    let span = debug_span!("websocket", path = %request.path);
    let pending = Pending {
        ws,
        assembler,
        request: request.clone(),
        on_accept,
        config,
    };

    match mode {
        ExecutionMode::Inline => {
            if let Err(panic) = AssertUnwindSafe(pending.open().instrument(span))
                .catch_unwind()
                .await
            {
                warn!("WebSocket handler panicked: {}", panic_message(&*panic));
            }
            Ok(Upgrade::Completed)
        }
        ExecutionMode::Concurrent => match Handle::try_current() {
            Ok(runtime) => Ok(Upgrade::Spawned(
                runtime.spawn(pending.open().instrument(span)),
            )),
            Err(_) => Err(reject(pending.ws, Error::ResourceExhaustion(Resource::Worker)).await),
        },
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Shut down a connection that never opened and hand back the cause.
async fn reject(mut ws: WebSocket, err: Error) -> Error {
    warn!("Rejecting WebSocket connection: {}", err);
    ws.close().await;
    err
}

/// A handshaken connection waiting for its worker.
struct Pending<F> {
    ws: WebSocket,
    assembler: MessageAssembler,
    request: HttpRequest,
    on_accept: F,
    config: Config,
}

impl<F> Pending<F> {
    /// Open the connection, build its handler and run it to completion.
    async fn open<H>(self)
    where
        F: FnOnce(&HttpRequest) -> H,
        H: WebSocketHandler,
    {
        let Pending {
            mut ws,
            assembler,
            request,
            on_accept,
            config,
        } = self;

        ws.transition(ConnectionState::Open);
        ws.codec_mut()
            .set_timeouts(config.idle_timeout(), config.write_timeout());
        debug!("WebSocket connection open");

        let handler = on_accept(&request);
        Connection {
            ws,
            assembler,
            control: ControlBuffer::new(),
            handler,
        }
        .run()
        .await;
    }
}

/// An open connection: the socket handle, its two buffers and its handler.
struct Connection<H> {
    ws: WebSocket,
    assembler: MessageAssembler,
    control: ControlBuffer,
    handler: H,
}

impl<H: WebSocketHandler> Connection<H> {
    /// Receive loop. Returns once the connection is closed and `on_close` ran.
    async fn run(mut self) {
        if let Err(e) = self.handler.on_open(&mut self.ws).await {
            warn!("on_open handler failed: {}", e);
        }

        while !self.ws.is_closed() {
            if let Err(e) = self.step().await {
                match e.kind() {
                    ErrorKind::Transport => debug!("WebSocket transport ended: {}", e),
                    kind => warn!("Closing WebSocket on {:?} error: {}", kind, e),
                }
                self.ws.close().await;
            }
        }

        if let Err(e) = self.handler.on_close().await {
            warn!("on_close handler failed: {}", e);
        }
        debug!("WebSocket connection closed");
    }

    /// Read one frame and act on it.
    async fn step(&mut self) -> Result<()> {
        let header = self.ws.codec_mut().read_header().await?;
        trace!(
            "Frame {} fin={} len={}",
            header.opcode, header.fin, header.payload_len
        );

        if header.opcode.is_control() {
            let payload = self.control.slot(header.payload_len)?;
            self.ws.codec_mut().read_payload(&header, payload).await?;

            match control::respond(header.opcode, payload) {
                ControlAction::Pong(data) => self.ws.send_frame(OpCode::Pong, data).await?,
                ControlAction::Close(code) => self.ws.close_with(code).await,
                ControlAction::Ignore => {}
            }
            return Ok(());
        }

        let slot = self.assembler.reserve(&header)?;
        self.ws.codec_mut().read_payload(&header, slot).await?;

        if let Some(message) = self.assembler.commit(header.fin) {
            self.deliver(message).await;
        }
        Ok(())
    }

    async fn deliver(&mut self, message: AssembledMessage) {
        let result = match message.kind {
            MessageKind::Text => match message.into_text() {
                Ok(text) => self.handler.on_text(&mut self.ws, text).await,
                Err(e) => {
                    warn!("Dropping text message: {}", e);
                    return;
                }
            },
            MessageKind::Binary => {
                self.handler
                    .on_binary(&mut self.ws, message.into_binary())
                    .await
            }
        };

        if let Err(e) = result {
            warn!("Message handler failed: {}", e);
        }
    }
}
