//! HTTP response building module
//!
//! `build_response` decides status, headers and the byte window for a file;
//! the error builders turn a `ServeError` into its fixed response.

use hyper::header::{ACCEPT_RANGES, ALLOW, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE};
use hyper::{Response, StatusCode};

use super::body::{self, ResponseBody};
use super::mime;
use super::range::parse_range_header;
use crate::error::ServeError;
use crate::handler::resolve::ResolvedTarget;

/// Status, headers and body window for one file response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseDescriptor {
    /// 200 or 206
    pub status: StatusCode,
    pub content_type: &'static str,
    pub content_length: u64,
    pub content_range: Option<String>,
    pub accept_ranges: bool,
    /// First byte of the body within the file
    pub start: u64,
}

impl ResponseDescriptor {
    /// Headers in the order they are sent
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            (CONTENT_TYPE.as_str(), self.content_type.to_string()),
            (CONTENT_LENGTH.as_str(), self.content_length.to_string()),
        ];
        if let Some(range) = &self.content_range {
            headers.push((CONTENT_RANGE.as_str(), range.clone()));
        }
        if self.accept_ranges {
            headers.push((ACCEPT_RANGES.as_str(), "bytes".to_string()));
        }
        headers
    }

    /// Attach a body. The body must deliver exactly `content_length` bytes
    /// (or none, for HEAD).
    pub fn into_response(self, body: ResponseBody) -> Response<ResponseBody> {
        let mut builder = Response::builder().status(self.status);
        for (name, value) in self.headers() {
            builder = builder.header(name, value);
        }
        builder.body(body).unwrap_or_else(|e| {
            log_build_error(self.status.as_str(), &e);
            build_error_response(&ServeError::Io(std::io::Error::other(e)))
        })
    }
}

/// Decide the response for a resolved target and an optional Range header.
///
/// - no header: 200 with the whole file
/// - valid header: 206 with `Content-Range`
/// - malformed header: `MalformedRange`
/// - out-of-bounds header: `RangeNotSatisfiable`
pub fn build_response(
    target: &ResolvedTarget,
    range_header: Option<&str>,
) -> Result<ResponseDescriptor, ServeError> {
    let Some(size) = target.size() else {
        return Err(ServeError::NotFound);
    };
    let content_type = mime::get_content_type(target.path());

    let Some(header) = range_header else {
        return Ok(ResponseDescriptor {
            status: StatusCode::OK,
            content_type,
            content_length: size,
            content_range: None,
            accept_ranges: true,
            start: 0,
        });
    };

    let window = parse_range_header(header)?.resolve(size)?;
    Ok(ResponseDescriptor {
        status: StatusCode::PARTIAL_CONTENT,
        content_type,
        content_length: window.len(),
        content_range: Some(window.content_range(size)),
        accept_ranges: true,
        start: window.start,
    })
}

/// Build the fixed response for a failed request
///
/// Bodies are short plain-text messages (416 has none); nothing from the
/// error's source (paths, OS messages) reaches the client.
pub fn build_error_response(err: &ServeError) -> Response<ResponseBody> {
    let status = err.status();
    let message = match err {
        ServeError::PathEscape | ServeError::NotFound => "404 Not Found",
        ServeError::MalformedRange => "400 Invalid Range header",
        // No body bytes at all for an unsatisfiable range
        ServeError::RangeNotSatisfiable { .. } => "",
        ServeError::Io(_) => "500 Error serving file",
    };

    let mut builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain")
        .header(CONTENT_LENGTH, message.len());
    if let ServeError::RangeNotSatisfiable { size } = err {
        builder = builder.header(CONTENT_RANGE, format!("bytes */{size}"));
    }

    builder.body(body::full(message)).unwrap_or_else(|e| {
        log_build_error(status.as_str(), &e);
        fallback(status, message)
    })
}

/// Methods the server answers
pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Build OPTIONS response (204 with `Allow`)
pub fn build_options_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, ALLOWED_METHODS)
        .body(body::empty())
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            let mut resp = Response::new(body::empty());
            *resp.status_mut() = StatusCode::NO_CONTENT;
            resp
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    const MESSAGE: &str = "405 Method Not Allowed";
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(CONTENT_TYPE, "text/plain")
        .header(ALLOW, ALLOWED_METHODS)
        .body(body::full(MESSAGE))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            fallback(StatusCode::METHOD_NOT_ALLOWED, MESSAGE)
        })
}

fn fallback(status: StatusCode, message: &'static str) -> Response<ResponseBody> {
    let mut resp = Response::new(body::full(message));
    *resp.status_mut() = status;
    resp
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
