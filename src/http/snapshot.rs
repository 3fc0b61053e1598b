//! Request/response snapshots
//!
//! Plain copies of what was received and what was sent, for whoever wants to
//! log them. Nothing here knows about output formats.

use hyper::header::HeaderMap;
use hyper::{Request, Response};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestSnapshot {
    pub method: String,
    /// Path and query as received
    pub path: String,
    /// Sorted by name
    pub headers: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseSnapshot {
    pub status: u16,
    /// In the order they were set
    pub headers: Vec<(String, String)>,
}

impl RequestSnapshot {
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let path = req
            .uri()
            .path_and_query()
            .map_or_else(|| req.uri().path().to_string(), ToString::to_string);
        let mut headers = header_pairs(req.headers());
        headers.sort();
        Self {
            method: req.method().to_string(),
            path,
            headers,
        }
    }
}

impl ResponseSnapshot {
    pub fn from_response<B>(resp: &Response<B>) -> Self {
        Self {
            status: resp.status().as_u16(),
            headers: header_pairs(resp.headers()),
        }
    }
}

fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}
