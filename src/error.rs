//! Error types for the serving path
//!
//! Every `ServeError` maps to exactly one HTTP status and ends only the request
//! that produced it. `StreamError` happens after headers are flushed, so it can
//! only abort the body.

use hyper::StatusCode;
use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::http::range::RangeError;

/// Failure while resolving a target or building its response
#[derive(Debug, Error)]
pub enum ServeError {
    /// Request path resolves outside the serve root
    #[error("request path escapes the serve root")]
    PathEscape,
    /// Missing file, directory target, or anything else that is not a regular file
    #[error("not found")]
    NotFound,
    /// Range header does not match `bytes=<digits?>-<digits?>`
    #[error("malformed Range header")]
    MalformedRange,
    /// Range parsed but lies outside the file
    #[error("range not satisfiable for resource of {size} bytes")]
    RangeNotSatisfiable { size: u64 },
    /// stat/open/read failure not otherwise classified
    #[error("I/O failure: {0}")]
    Io(#[source] io::Error),
}

impl ServeError {
    /// Classify an I/O error, folding "file vanished" into `NotFound`.
    pub fn from_io(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            _ => Self::Io(err),
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::PathEscape | Self::NotFound => StatusCode::NOT_FOUND,
            Self::MalformedRange => StatusCode::BAD_REQUEST,
            Self::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RangeError> for ServeError {
    fn from(err: RangeError) -> Self {
        match err {
            RangeError::Malformed => Self::MalformedRange,
            RangeError::NotSatisfiable { size } => Self::RangeNotSatisfiable { size },
        }
    }
}

/// Failure while streaming a body that already has its headers on the wire
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("client disconnected")]
    ClientDisconnected,
    #[error("write stalled for more than {0:?}")]
    WriteTimeout(Duration),
    #[error("read failed: {0}")]
    Read(#[from] io::Error),
}
