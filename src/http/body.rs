//! Response body types
//!
//! Small fixed bodies use `Full`. File bodies are produced by a separate task
//! and handed to hyper through a bounded channel, so at most a couple of
//! chunks are buffered no matter how large the file is.

use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::{Body, Bytes, Frame};
use tokio::sync::mpsc;

/// Body type of every response the server produces
pub type ResponseBody = BoxBody<Bytes, io::Error>;

/// Chunks in flight between the streaming task and hyper
pub const CHANNEL_DEPTH: usize = 2;

pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into()).map_err(|never| match never {}).boxed()
}

pub fn empty() -> ResponseBody {
    Empty::<Bytes>::new().map_err(|never| match never {}).boxed()
}

/// Receiving half: a hyper body fed chunk by chunk
#[derive(Debug)]
pub struct ChunkBody {
    rx: mpsc::Receiver<io::Result<Bytes>>,
}

/// Sending half, owned by the streaming task
#[derive(Debug)]
pub struct ChunkSender {
    tx: mpsc::Sender<io::Result<Bytes>>,
}

/// Create a connected sender/body pair.
pub fn chunk_channel() -> (ChunkSender, ChunkBody) {
    let (tx, rx) = mpsc::channel(CHANNEL_DEPTH);
    (ChunkSender { tx }, ChunkBody { rx })
}

impl ChunkSender {
    /// Queue one chunk. Fails once the body has been dropped.
    pub async fn send(&self, chunk: Bytes) -> Result<(), Bytes> {
        self.tx.send(Ok(chunk)).await.map_err(|e| match e.0 {
            Ok(chunk) => chunk,
            Err(_) => Bytes::new(),
        })
    }

    /// Make the body yield an error so hyper tears the connection down
    /// instead of ending the message.
    pub async fn abort(&self, err: io::Error) {
        // Nothing to do if the body is already gone
        let _ = self.tx.send(Err(err)).await;
    }
}

impl Body for ChunkBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let item = ready!(self.get_mut().rx.poll_recv(cx));
        Poll::Ready(item.map(|res| res.map(Frame::data)))
    }
}
