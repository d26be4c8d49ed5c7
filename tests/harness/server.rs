//! Echo server on a random local port.

use std::net::SocketAddr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use microws::{Config, ExecutionMode, HttpRequest, accept};

use super::Recorder;

/// Read an HTTP request head up to and including the blank line.
pub async fn read_request_head<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<Vec<u8>> {
    let mut head = Vec::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        head.extend_from_slice(line.as_bytes());
        if line == "\r\n" {
            break;
        }
    }
    Ok(head)
}

pub struct TestServer {
    task: JoinHandle<()>,
    recorder: Recorder,
}

impl TestServer {
    /// Spawn an echo server running every connection on its own task.
    pub async fn spawn() -> (Self, SocketAddr) {
        Self::spawn_with(Config::new().with_execution_mode(ExecutionMode::Concurrent)).await
    }

    pub async fn spawn_with(config: Config) -> (Self, SocketAddr) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let recorder = Recorder::echoing();
        let handler = recorder.clone();

        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let mut reader = BufReader::new(stream);
                let Ok(head) = read_request_head(&mut reader).await else {
                    continue;
                };
                let Ok(request) = HttpRequest::parse(&head) else {
                    continue;
                };
                let handler = handler.clone();
                let _ = accept(reader, &request, config.clone(), move |_| handler).await;
            }
        });

        (Self { task, recorder }, addr)
    }

    /// Events recorded across all connections.
    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub async fn shutdown(self) {
        self.task.abort();
        let _ = self.task.await;
    }
}
