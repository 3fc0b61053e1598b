//! Static media server with HTTP byte-range support
//!
//! Serves files under one root directory over HTTP/1.1, honoring single
//! `Range: bytes=` requests so media players can seek.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
