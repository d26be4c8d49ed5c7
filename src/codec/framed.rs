use std::future::Future;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::protocol::OpCode;
use crate::protocol::frame::{FrameHeader, HeaderPrefix};
use crate::protocol::mask::apply_mask_fast;

/// Largest header: 2 fixed bytes, 2 extended-length bytes, 4 mask bytes.
const MAX_HEADER_LEN: usize = 8;

/// Run an I/O future, bounded by `limit` when one is set.
async fn bounded<F, T>(limit: Option<Duration>, fut: F) -> Result<T>
where
    F: Future<Output = std::io::Result<T>>,
{
    let result = match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| Error::Timeout(limit))?,
        None => fut.await,
    };

    result.map_err(|err| match err.kind() {
        std::io::ErrorKind::UnexpectedEof => Error::ConnectionClosed,
        _ => Error::from(err),
    })
}

/// Frame-level reader and writer over a byte stream.
///
/// The reader pulls exactly the bytes each header field needs and streams
/// payloads into caller-provided buffers; the writer emits unmasked server
/// frames.
pub struct WebSocketCodec<T> {
    io: T,
    write_buf: BytesMut,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
    accept_unmasked: bool,
}

impl<T> WebSocketCodec<T> {
    /// Wrap a stream. Timeouts start unset; see [`set_timeouts`](Self::set_timeouts).
    #[must_use]
    pub fn new(io: T, config: &Config) -> Self {
        Self {
            io,
            write_buf: BytesMut::with_capacity(MAX_HEADER_LEN),
            read_timeout: None,
            write_timeout: None,
            accept_unmasked: config.accept_unmasked_frames,
        }
    }

    /// Bound every subsequent read and write.
    pub fn set_timeouts(&mut self, read: Option<Duration>, write: Option<Duration>) {
        self.read_timeout = read;
        self.write_timeout = write;
    }
}

impl<T: AsyncRead + AsyncWrite + Unpin> WebSocketCodec<T> {
    /// Read and validate the next frame header.
    ///
    /// # Errors
    ///
    /// Protocol errors from [`HeaderPrefix::parse`] and
    /// [`FrameHeader::validate`], `Error::UnmaskedClientFrame` when masking is
    /// enforced, and transport errors for short reads or timeouts.
    pub async fn read_header(&mut self) -> Result<FrameHeader> {
        let mut head = [0u8; 2];
        bounded(self.read_timeout, self.io.read_exact(&mut head)).await?;

        let prefix = HeaderPrefix::parse(head)?;
        if !prefix.is_masked() && !self.accept_unmasked {
            return Err(Error::UnmaskedClientFrame);
        }

        let mut rest = [0u8; MAX_HEADER_LEN - 2];
        let rest = &mut rest[..prefix.remaining()];
        if !rest.is_empty() {
            bounded(self.read_timeout, self.io.read_exact(rest)).await?;
        }

        let header = prefix.complete(rest)?;
        header.validate()?;
        Ok(header)
    }

    /// Read the payload described by `header` into `dst` and unmask it.
    ///
    /// `dst` must be exactly `header.payload_len` bytes long.
    ///
    /// # Errors
    ///
    /// Transport errors for short reads or timeouts.
    pub async fn read_payload(&mut self, header: &FrameHeader, dst: &mut [u8]) -> Result<()> {
        debug_assert_eq!(dst.len(), header.payload_len);
        if dst.is_empty() {
            return Ok(());
        }

        bounded(self.read_timeout, self.io.read_exact(dst)).await?;

        if let Some(mask) = header.mask {
            apply_mask_fast(dst, mask);
        }
        Ok(())
    }

    /// Write one final, unmasked frame and flush it.
    ///
    /// # Errors
    ///
    /// - `Error::FrameTooLarge` if `payload` exceeds 65535 bytes (nothing is written)
    /// - Transport errors if the write fails or times out
    pub async fn write_frame(&mut self, opcode: OpCode, payload: &[u8]) -> Result<()> {
        self.write_buf.clear();
        FrameHeader::encode(true, opcode, payload.len(), &mut self.write_buf)?;

        let limit = self.write_timeout;
        let Self { io, write_buf, .. } = self;
        bounded(limit, async {
            io.write_all(&write_buf[..]).await?;
            io.write_all(payload).await?;
            io.flush().await
        })
        .await
    }

    /// Write already encoded bytes, such as a handshake response, and flush.
    pub async fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        let limit = self.write_timeout;
        let io = &mut self.io;
        bounded(limit, async {
            io.write_all(bytes).await?;
            io.flush().await
        })
        .await
    }

    /// Shut down the write half of the stream.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.io.shutdown().await?;
        Ok(())
    }
}
