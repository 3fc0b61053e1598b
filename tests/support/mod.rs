#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::client::conn::http1;
use hyper::header::{HOST, RANGE};
use hyper::{HeaderMap, Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use rangeserve::config::{AppState, Config};
use rangeserve::server;
use tempfile::TempDir;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub const CLIP_SIZE: usize = 1_000_000;

/// Deterministic, non-repeating-per-chunk content so misplaced windows show up
pub fn gen_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 31 + i / 251) % 256) as u8).collect()
}

/// A running server over a temporary media root
pub struct TestServer {
    pub addr: SocketAddr,
    pub root: TempDir,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestServer {
    /// Start a server whose root holds `clip.mp4` (1,000,000 bytes) and an
    /// empty `season1/` directory.
    pub async fn start() -> Self {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("clip.mp4"), gen_bytes(CLIP_SIZE)).unwrap();
        std::fs::create_dir(root.path().join("season1")).unwrap();
        Self::start_in(root).await
    }

    pub async fn start_in(root: TempDir) -> Self {
        let cfg = test_config(root.path());
        let state = Arc::new(AppState::new(&cfg).unwrap());
        let listener =
            server::create_reusable_listener(cfg.get_socket_addr().unwrap(), cfg.server.backlog)
                .unwrap();
        let addr = listener.local_addr().unwrap();

        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(server::start_server_loop(listener, state, async move {
            let _ = rx.await;
        }));

        Self {
            addr,
            root,
            shutdown: Some(tx),
            task,
        }
    }

    pub fn clip(&self) -> Vec<u8> {
        std::fs::read(self.root.path().join("clip.mp4")).unwrap()
    }

    pub async fn get(&self, path: &str, range: Option<&str>) -> TestResponse {
        self.request(Method::GET, path, range).await
    }

    /// One request on a fresh connection
    pub async fn request(&self, method: Method, path: &str, range: Option<&str>) -> TestResponse {
        let mut sender = self.connect().await;
        send(&mut sender, method, &self.addr, path, range).await
    }

    pub async fn connect(&self) -> http1::SendRequest<Empty<Bytes>> {
        let stream = TcpStream::connect(self.addr).await.unwrap();
        let (sender, conn) = http1::handshake(TokioIo::new(stream)).await.unwrap();
        tokio::spawn(async move {
            let _ = conn.await;
        });
        sender
    }

    /// Stop accepting and wait for the accept loop to exit
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.task.await.unwrap();
    }
}

pub async fn send(
    sender: &mut http1::SendRequest<Empty<Bytes>>,
    method: Method,
    addr: &SocketAddr,
    path: &str,
    range: Option<&str>,
) -> TestResponse {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(HOST, addr.to_string());
    if let Some(range) = range {
        builder = builder.header(RANGE, range);
    }

    let resp = sender
        .send_request(builder.body(Empty::new()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = resp.into_body().collect().await.unwrap().to_bytes().to_vec();
    TestResponse {
        status,
        headers,
        body,
    }
}

fn test_config(root: &Path) -> Config {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("server.toml");
    std::fs::write(
        &path,
        format!(
            r#"
[server]
host = "127.0.0.1"
port = 0
backlog = 64

[serve]
root = "{}"
chunk_size = 8192

[logging]
access_log = false

[performance]
read_timeout = 5
write_timeout = 5
"#,
            root.display().to_string().replace('\\', "\\\\")
        ),
    )
    .unwrap();
    Config::load_from(path.to_str().unwrap()).unwrap()
}
