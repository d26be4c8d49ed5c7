//! WebSocket test client.
//!
//! Speaks the client side of the protocol by hand: sends the upgrade
//! request, checks the 101 response and exchanges masked frames.

use std::io;
use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use microws::compute_accept_key;

use super::SAMPLE_KEY;

/// A frame received from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub fin: bool,
    pub opcode: u8,
    pub masked: bool,
    pub payload: Vec<u8>,
}

pub struct TestClient<S = TcpStream> {
    stream: S,
    mask: [u8; 4],
}

impl TestClient<TcpStream> {
    pub async fn connect(addr: SocketAddr) -> io::Result<Self> {
        Self::connect_with_id(addr, 0).await
    }

    /// Connect and handshake; `id` picks the masking key.
    pub async fn connect_with_id(addr: SocketAddr, id: usize) -> io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let mut client = Self::new(stream, id);
        client.handshake().await?;
        Ok(client)
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> TestClient<S> {
    /// Wrap a stream without handshaking.
    pub fn new(stream: S, id: usize) -> Self {
        let id = id as u32;
        Self {
            stream,
            mask: (0x37fa_213d_u32 ^ id.wrapping_mul(0x9e37_79b9)).to_be_bytes(),
        }
    }

    /// Send the upgrade request and validate the 101 response.
    pub async fn handshake(&mut self) -> io::Result<()> {
        self.send_request(SAMPLE_KEY).await?;
        let head = self.read_response_head().await?;

        if !head.starts_with("HTTP/1.1 101 Switching Protocols\r\n") {
            return Err(io::Error::other(format!("unexpected response: {head}")));
        }
        let accept = format!("Sec-WebSocket-Accept: {}\r\n", compute_accept_key(SAMPLE_KEY));
        if !head.contains(&accept) {
            return Err(io::Error::other(format!("missing accept key: {head}")));
        }
        Ok(())
    }

    pub async fn send_request(&mut self, key: &str) -> io::Result<()> {
        let request = format!(
            "GET /ws HTTP/1.1\r\n\
             Host: localhost\r\n\
             Upgrade: websocket\r\n\
             Connection: Upgrade\r\n\
             Sec-WebSocket-Key: {key}\r\n\
             Sec-WebSocket-Version: 13\r\n\
             \r\n"
        );
        self.stream.write_all(request.as_bytes()).await
    }

    /// Read up to and including the blank line ending the response head.
    pub async fn read_response_head(&mut self) -> io::Result<String> {
        let mut head = Vec::new();
        let mut byte = [0u8; 1];
        while !head.ends_with(b"\r\n\r\n") {
            self.stream.read_exact(&mut byte).await?;
            head.push(byte[0]);
        }
        String::from_utf8(head).map_err(io::Error::other)
    }

    /// Encode a masked frame without sending it.
    pub fn encode(&self, fin: bool, opcode: u8, payload: &[u8]) -> Vec<u8> {
        let mut frame = Vec::with_capacity(payload.len() + 8);
        frame.push((if fin { 0x80 } else { 0 }) | opcode);

        match payload.len() {
            len if len < 126 => frame.push(0x80 | len as u8),
            len => {
                frame.push(0x80 | 126);
                frame.extend_from_slice(&(len as u16).to_be_bytes());
            }
        }

        frame.extend_from_slice(&self.mask);
        frame.extend(
            payload
                .iter()
                .enumerate()
                .map(|(i, b)| b ^ self.mask[i % 4]),
        );
        frame
    }

    pub async fn send_frame(&mut self, fin: bool, opcode: u8, payload: &[u8]) -> io::Result<()> {
        let frame = self.encode(fin, opcode, payload);
        self.send_raw(&frame).await
    }

    pub async fn send_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stream.write_all(bytes).await?;
        self.stream.flush().await
    }

    pub async fn send_text(&mut self, text: &str) -> io::Result<()> {
        self.send_frame(true, 0x1, text.as_bytes()).await
    }

    pub async fn send_binary(&mut self, data: &[u8]) -> io::Result<()> {
        self.send_frame(true, 0x2, data).await
    }

    pub async fn send_ping(&mut self, payload: &[u8]) -> io::Result<()> {
        self.send_frame(true, 0x9, payload).await
    }

    /// Read one frame; `None` once the server has closed the stream.
    pub async fn recv_frame(&mut self) -> io::Result<Option<Frame>> {
        let mut head = [0u8; 2];
        match self.stream.read_exact(&mut head).await {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e),
        }

        let masked = head[1] & 0x80 != 0;
        let len = match head[1] & 0x7F {
            126 => {
                let mut ext = [0u8; 2];
                self.stream.read_exact(&mut ext).await?;
                u16::from_be_bytes(ext) as usize
            }
            127 => return Err(io::Error::other("64-bit length from server")),
            len => len as usize,
        };

        let mut payload = vec![0u8; len];
        self.stream.read_exact(&mut payload).await?;

        Ok(Some(Frame {
            fin: head[0] & 0x80 != 0,
            opcode: head[0] & 0x0F,
            masked,
            payload,
        }))
    }

    /// Read the next frame, which must be a text frame.
    pub async fn recv_text(&mut self) -> io::Result<Option<String>> {
        match self.recv_frame().await? {
            Some(frame) if frame.opcode == 0x1 => {
                String::from_utf8(frame.payload).map(Some).map_err(io::Error::other)
            }
            Some(frame) => Err(io::Error::other(format!(
                "expected text frame, got opcode {:#x}",
                frame.opcode
            ))),
            None => Ok(None),
        }
    }

    /// Send a normal-closure close frame and wait for the reply.
    pub async fn close(&mut self) -> io::Result<()> {
        self.send_frame(true, 0x8, &1000u16.to_be_bytes()).await?;
        match self.recv_frame().await? {
            Some(frame) if frame.opcode == 0x8 => Ok(()),
            other => Err(io::Error::other(format!("expected close reply, got {other:?}"))),
        }
    }

    /// Drain the stream until the server closes it.
    pub async fn read_to_end(&mut self) -> io::Result<Vec<u8>> {
        let mut rest = Vec::new();
        self.stream.read_to_end(&mut rest).await?;
        Ok(rest)
    }

    /// Shut down the client's write half.
    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.stream.shutdown().await
    }
}
