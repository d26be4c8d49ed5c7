//! Simple WebSocket reply server example.
//!
//! Run with: RUST_LOG=debug cargo run --example echo_server
//! Then connect any WebSocket client to ws://127.0.0.1:9001/

use microws::{
    CallbackResult, Config, ExecutionMode, HttpRequest, WebSocket, WebSocketHandler, accept,
    async_trait,
};
use std::error::Error;
use std::net::SocketAddr;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const ADDR: &str = "127.0.0.1:9001";

struct ReplyHandler {
    peer: SocketAddr,
}

#[async_trait]
impl WebSocketHandler for ReplyHandler {
    async fn on_open(&mut self, _ws: &mut WebSocket) -> CallbackResult {
        info!("WS ACCEPT {}", self.peer);
        Ok(())
    }

    async fn on_text(&mut self, ws: &mut WebSocket, text: String) -> CallbackResult {
        info!("WS RECV TEXT from {}: {}", self.peer, text);
        ws.send_text(&format!("Reply for {}", text)).await?;
        Ok(())
    }

    async fn on_binary(&mut self, _ws: &mut WebSocket, data: Vec<u8>) -> CallbackResult {
        info!("WS RECV DATA from {}: {} bytes", self.peer, data.len());
        Ok(())
    }

    async fn on_close(&mut self) -> CallbackResult {
        info!("WS CLOSED {}", self.peer);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let listener = TcpListener::bind(ADDR).await?;
    info!("WebSocket server listening on {}", ADDR);

    let config = Config::embedded().with_execution_mode(ExecutionMode::Concurrent);

    loop {
        let (stream, peer) = listener.accept().await?;
        if let Err(e) = handle_connection(stream, peer, config.clone()).await {
            warn!("Connection from {} rejected: {}", peer, e);
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    config: Config,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    // The buffered reader is handed to the connection so no byte read past
    // the request head is lost.
    let mut reader = BufReader::new(stream);
    let mut request_bytes = Vec::new();

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            return Err("connection closed during request".into());
        }
        request_bytes.extend_from_slice(line.as_bytes());
        if line == "\r\n" {
            break;
        }
    }

    let request = HttpRequest::parse(&request_bytes)?;
    info!("Upgrade request from {} for {}", peer, request.path);

    accept(reader, &request, config, move |_| ReplyHandler { peer }).await?;
    Ok(())
}
