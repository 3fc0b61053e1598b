//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, serving, and
//! request/response logging around the core.

use crate::config::AppState;
use crate::error::ServeError;
use crate::handler::media::{self, StreamJob};
use crate::http::body::{self, ResponseBody};
use crate::http::response::{build_405_response, build_error_response, build_options_response};
use crate::http::snapshot::{RequestSnapshot, ResponseSnapshot};
use crate::logger::{self, AccessLogEntry};
use hyper::body::Body;
use hyper::header::{HeaderName, RANGE, REFERER, USER_AGENT};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub range_header: Option<&'a str>,
}

/// Main entry point for HTTP request handling
///
/// Never fails: every error becomes its status response. The request body is
/// ignored.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let logging = &state.config.logging;

    if logging.show_headers {
        logger::log_request(&RequestSnapshot::from_request(&req));
    }
    let access = logging
        .access_log
        .then(|| access_entry(&req, remote_addr));

    let (response, job) = match check_http_method(req.method()) {
        Some(resp) => (resp, None),
        None => match range_header(&req) {
            Ok(range) => {
                let path = req.uri().path().to_string();
                let ctx = RequestContext {
                    path: &path,
                    is_head: *req.method() == Method::HEAD,
                    range_header: range.as_deref(),
                };
                serve(&ctx, &state).await
            }
            Err(err) => (build_error_response(&err), None),
        },
    };

    if logging.show_headers {
        logger::log_response(&ResponseSnapshot::from_response(&response));
    }

    let status = response.status().as_u16();
    match job {
        Some(job) => {
            // The body is produced after this function returns; log when it ends
            tokio::spawn(async move {
                let sent = job.run().await;
                if let Some(entry) = access {
                    finish_access(entry, &state, status, sent, started);
                }
            });
        }
        None => {
            if let Some(entry) = access {
                let sent = response.body().size_hint().exact().unwrap_or(0);
                finish_access(entry, &state, status, sent, started);
            }
        }
    }

    Ok(response)
}

/// Check HTTP method: OPTIONS is answered here, anything but GET/HEAD is 405
fn check_http_method(method: &Method) -> Option<Response<ResponseBody>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(build_405_response())
        }
    }
}

/// The request's single `Range` value.
///
/// A value that isn't visible ASCII, or more than one `Range` header, is
/// malformed rather than ignored.
fn range_header<B>(req: &Request<B>) -> Result<Option<String>, ServeError> {
    let mut values = req.headers().get_all(RANGE).iter();
    let Some(value) = values.next() else {
        return Ok(None);
    };
    if values.next().is_some() {
        return Err(ServeError::MalformedRange);
    }
    value
        .to_str()
        .map(|v| Some(v.to_string()))
        .map_err(|_| ServeError::MalformedRange)
}

/// Serve a media file, or the error response explaining why not
async fn serve(
    ctx: &RequestContext<'_>,
    state: &AppState,
) -> (Response<ResponseBody>, Option<StreamJob>) {
    match media::prepare(&state.root, ctx.path, ctx.range_header).await {
        Ok(prepared) if ctx.is_head => (prepared.descriptor.into_response(body::empty()), None),
        Ok(prepared) => {
            let (response, job) =
                prepared.into_streaming(ctx.path, state.chunk_size, state.write_timeout);
            (response, Some(job))
        }
        Err(err) => {
            match &err {
                ServeError::PathEscape => logger::log_warning(&format!(
                    "Path traversal attempt blocked: {}",
                    ctx.path
                )),
                ServeError::Io(e) => {
                    logger::log_error(&format!("Failed to serve '{}': {e}", ctx.path));
                }
                _ => {}
            }
            (build_error_response(&err), None)
        }
    }
}

fn access_entry<B>(req: &Request<B>, remote_addr: SocketAddr) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.referer = header_value(req, REFERER);
    entry.user_agent = header_value(req, USER_AGENT);
    entry
}

fn header_value<B>(req: &Request<B>, name: HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn finish_access(
    mut entry: AccessLogEntry,
    state: &AppState,
    status: u16,
    body_bytes: u64,
    started: Instant,
) {
    entry.status = status;
    entry.body_bytes = body_bytes;
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    logger::log_access(&entry, &state.config.logging.access_log_format);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, LoggingConfig, PerformanceConfig, ServeConfig, ServerConfig};
    use http_body_util::BodyExt;
    use hyper::header::HeaderValue;
    use hyper::StatusCode;

    fn test_state(root: &std::path::Path) -> Arc<AppState> {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                workers: None,
                backlog: 16,
            },
            serve: ServeConfig {
                root: root.to_str().unwrap().to_string(),
                chunk_size: 1000,
            },
            logging: LoggingConfig {
                access_log: false,
                show_headers: false,
                access_log_format: "combined".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
            performance: PerformanceConfig {
                keep_alive: true,
                read_timeout: 5,
                write_timeout: 5,
            },
        };
        Arc::new(AppState::new(&config).unwrap())
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    async fn send(state: &Arc<AppState>, req: Request<()>) -> (StatusCode, hyper::HeaderMap, Vec<u8>) {
        let resp = handle_request(req, Arc::clone(state), peer()).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.into_body().collect().await.unwrap().to_bytes().to_vec();
        (status, headers, body)
    }

    #[tokio::test]
    async fn test_get_and_head() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("clip.mp4"), b"0123456789").unwrap();
        let state = test_state(dir.path());

        let (status, headers, body) =
            send(&state, Request::get("/clip.mp4").body(()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-length"], "10");
        assert_eq!(body, b"0123456789");

        let (status, headers, body) =
            send(&state, Request::head("/clip.mp4").body(()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-length"], "10");
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_ranged_get() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("clip.mp4"), b"0123456789").unwrap();
        let state = test_state(dir.path());

        let req = Request::get("/clip.mp4")
            .header("range", "bytes=2-5")
            .body(())
            .unwrap();
        let (status, headers, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(headers["content-range"], "bytes 2-5/10");
        assert_eq!(body, b"2345");
    }

    #[tokio::test]
    async fn test_other_methods_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let req = Request::post("/clip.mp4").body(()).unwrap();
        let (status, headers, _) = send(&state, req).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(headers["allow"], "GET, HEAD, OPTIONS");
    }

    #[tokio::test]
    async fn test_options_lists_methods() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let req = Request::options("/clip.mp4").body(()).unwrap();
        let (status, headers, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(headers["allow"], "GET, HEAD, OPTIONS");
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_range_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("clip.mp4"), b"0123456789").unwrap();
        let state = test_state(dir.path());

        let req = Request::get("/clip.mp4")
            .header(RANGE, HeaderValue::from_bytes(b"bytes=0-1\xff").unwrap())
            .body(())
            .unwrap();
        let (status, _, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.starts_with(b"0123"));
    }

    #[tokio::test]
    async fn test_repeated_range_headers_are_malformed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("clip.mp4"), b"0123456789").unwrap();
        let state = test_state(dir.path());

        let req = Request::get("/clip.mp4")
            .header(RANGE, "bytes=0-1")
            .header(RANGE, "bytes=2-3")
            .body(())
            .unwrap();
        assert_eq!(send(&state, req).await.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_errors_map_to_status() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("clip.mp4"), b"0123456789").unwrap();
        let state = test_state(dir.path());

        let (status, _, _) = send(&state, Request::get("/missing.mp4").body(()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, _) = send(&state, Request::get("/").body(()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let req = Request::get("/clip.mp4").header("range", "bytes=x-").body(()).unwrap();
        assert_eq!(send(&state, req).await.0, StatusCode::BAD_REQUEST);

        let req = Request::get("/clip.mp4").header("range", "bytes=10-").body(()).unwrap();
        let (status, headers, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(headers["content-range"], "bytes */10");
        assert!(body.is_empty());
    }
}
