// Connection handling module
// Serves one accepted TCP connection over HTTP/1.1

use std::net::SocketAddr;
use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Handle a single connection in a spawned task.
///
/// This function:
/// 1. Wraps the TCP stream in `TokioIo`
/// 2. Configures HTTP/1.1 keep-alive and the header read timeout
/// 3. Serves every request on the connection with the request handler
///
/// A failure here ends this connection only.
pub fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let mut builder = http1::Builder::new();
        builder
            .keep_alive(state.config.performance.keep_alive)
            .timer(TokioTimer::new());
        if let Some(timeout) = state.config.read_timeout() {
            builder.header_read_timeout(timeout);
        }

        let conn = builder.serve_connection(
            io,
            service_fn(move |req| handler::handle_request(req, Arc::clone(&state), peer_addr)),
        );

        if let Err(err) = conn.await {
            // Clients closing mid-body are routine for media players seeking
            if !err.is_incomplete_message() {
                logger::log_connection_error(&err);
            }
        }
    });
}
