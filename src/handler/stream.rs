//! Chunked body streaming
//!
//! Copies a byte window from a file into a sink in fixed-size chunks. Each
//! chunk is handed over before the next read, so memory stays at one chunk
//! regardless of the window size.

use std::future::Future;
use std::io::SeekFrom;
use std::time::Duration;

use hyper::body::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

use crate::error::StreamError;
use crate::http::body::ChunkSender;

/// Destination for streamed chunks
pub trait ByteSink {
    /// Write one chunk. An error ends the stream.
    fn write_chunk(&mut self, chunk: Bytes) -> impl Future<Output = Result<(), StreamError>> + Send;
}

/// Sink feeding a response body, with an optional per-chunk deadline
#[derive(Debug)]
pub struct BodySink {
    sender: ChunkSender,
    write_timeout: Option<Duration>,
    sent: u64,
}

impl BodySink {
    pub const fn new(sender: ChunkSender, write_timeout: Option<Duration>) -> Self {
        Self {
            sender,
            write_timeout,
            sent: 0,
        }
    }

    /// Bytes accepted by the body so far
    pub const fn sent(&self) -> u64 {
        self.sent
    }

    /// Tear the body down after a failed read.
    ///
    /// Bounded by the write timeout like any chunk; if it expires the sender
    /// is simply dropped and the body ends short.
    pub async fn abort(&self, err: std::io::Error) -> Result<(), StreamError> {
        let abort = self.sender.abort(err);
        match self.write_timeout {
            Some(limit) => tokio::time::timeout(limit, abort)
                .await
                .map_err(|_| StreamError::WriteTimeout(limit)),
            None => {
                abort.await;
                Ok(())
            }
        }
    }
}

impl ByteSink for BodySink {
    async fn write_chunk(&mut self, chunk: Bytes) -> Result<(), StreamError> {
        let len = chunk.len() as u64;
        let send = self.sender.send(chunk);
        let sent = match self.write_timeout {
            Some(limit) => tokio::time::timeout(limit, send)
                .await
                .map_err(|_| StreamError::WriteTimeout(limit))?,
            None => send.await,
        };
        sent.map_err(|_| StreamError::ClientDisconnected)?;
        self.sent += len;
        Ok(())
    }
}

impl ByteSink for Vec<u8> {
    async fn write_chunk(&mut self, chunk: Bytes) -> Result<(), StreamError> {
        self.extend_from_slice(&chunk);
        Ok(())
    }
}

/// Stream `length` bytes of `file` starting at `start` into `sink`.
///
/// Returns the number of bytes written. A read that returns zero bytes before
/// `length` is reached ends the stream early without an error. The file is
/// consumed and dropped on every exit path.
pub async fn stream<R, S>(
    mut file: R,
    start: u64,
    length: u64,
    sink: &mut S,
    chunk_size: usize,
) -> Result<u64, StreamError>
where
    R: AsyncRead + AsyncSeek + Unpin,
    S: ByteSink,
{
    if length == 0 {
        return Ok(0);
    }
    file.seek(SeekFrom::Start(start)).await?;

    let chunk_size = chunk_size.max(1);
    let mut buf = vec![0u8; chunk_size];
    let mut sent: u64 = 0;

    while sent < length {
        let want = usize::try_from(length - sent).map_or(chunk_size, |r| r.min(chunk_size));
        let n = file.read(&mut buf[..want]).await?;
        if n == 0 {
            break;
        }
        sink.write_chunk(Bytes::copy_from_slice(&buf[..n])).await?;
        sent += n as u64;
    }

    Ok(sent)
}
