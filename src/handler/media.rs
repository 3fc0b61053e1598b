//! Media file serving
//!
//! Ties the resolver, the range responder and the streamer together for one
//! request. Errors come back as `ServeError`; turning them into responses is
//! the router's job.

use std::time::Duration;

use http_body_util::BodyExt;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncSeek};

use super::resolve::ServeRoot;
use super::stream::{self, BodySink};
use crate::error::{ServeError, StreamError};
use crate::http::body::{self, ResponseBody};
use crate::http::response::{build_response, ResponseDescriptor};
use crate::logger;

/// An opened file and the response decided for it
#[derive(Debug)]
pub struct Prepared {
    pub descriptor: ResponseDescriptor,
    pub file: File,
}

/// Resolve `path` under `root`, open it, and decide the response.
///
/// The size used for range checks comes from the opened handle, so a file
/// replaced between stat and open is measured as it will be read. A file that
/// vanished in between is `NotFound`.
pub async fn prepare(
    root: &ServeRoot,
    path: &str,
    range_header: Option<&str>,
) -> Result<Prepared, ServeError> {
    let target = root.resolve(path).await?;
    if !target.is_file() {
        return Err(ServeError::NotFound);
    }

    let file = File::open(target.path())
        .await
        .map_err(ServeError::from_io)?;
    let size = file.metadata().await.map_err(ServeError::from_io)?.len();
    let target = target.with_size(size);

    let descriptor = build_response(&target, range_header)?;
    Ok(Prepared { descriptor, file })
}

/// Body streaming still to be done after the headers go out
#[derive(Debug)]
pub struct StreamJob<R = File> {
    file: R,
    start: u64,
    length: u64,
    sink: BodySink,
    chunk_size: usize,
    /// For log messages only
    path: String,
}

impl Prepared {
    /// Split into the response to send and the job that fills its body.
    pub fn into_streaming(
        self,
        path: &str,
        chunk_size: usize,
        write_timeout: Option<Duration>,
    ) -> (hyper::Response<ResponseBody>, StreamJob) {
        let (sender, chunk_body) = body::chunk_channel();
        let job = StreamJob {
            file: self.file,
            start: self.descriptor.start,
            length: self.descriptor.content_length,
            sink: BodySink::new(sender, write_timeout),
            chunk_size,
            path: path.to_string(),
        };
        let response = self
            .descriptor
            .into_response(chunk_body.boxed());
        (response, job)
    }
}

impl<R> StreamJob<R>
where
    R: AsyncRead + AsyncSeek + Unpin + Send,
{
    /// Stream the window and return how many bytes reached the body.
    ///
    /// Failures end this request only. A read error is pushed into the body
    /// so hyper drops the connection instead of ending the message cleanly.
    pub async fn run(mut self) -> u64 {
        let result = stream::stream(
            self.file,
            self.start,
            self.length,
            &mut self.sink,
            self.chunk_size,
        )
        .await;
        let sent = self.sink.sent();

        match result {
            Ok(n) if n < self.length => {
                logger::log_warning(&format!(
                    "File {} ended after {n} of {} bytes",
                    self.path, self.length
                ));
            }
            Ok(_) => {}
            Err(StreamError::Read(e)) => {
                logger::log_stream_aborted(&self.path, sent, self.length, &e);
                if let Err(e) = self.sink.abort(e).await {
                    logger::log_warning(&format!("Abort of {} not delivered: {e}", self.path));
                }
            }
            Err(e) => logger::log_stream_aborted(&self.path, sent, self.length, &e),
        }
        sent
    }
}
