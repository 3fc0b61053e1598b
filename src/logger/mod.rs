//! Logger module
//!
//! Provides logging utilities for the media server including:
//! - Server lifecycle logging
//! - Request/response snapshot blocks
//! - Access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support

pub mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use crate::http::snapshot::{RequestSnapshot, ResponseSnapshot};
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Media server started successfully");
    write_info(&format!("Serving files from: {}", config.serve.root));
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Chunk size: {} bytes", config.serve.chunk_size));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_shutdown() {
    write_info("[Shutdown] Stopped accepting connections");
}

pub fn log_request(snapshot: &RequestSnapshot) {
    write_info(&format::render_request(snapshot));
}

pub fn log_response(snapshot: &ResponseSnapshot) {
    write_info(&format::render_response(snapshot));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    write_error(&format!("[ERROR] Failed to serve connection: {err}"));
}

pub fn log_stream_aborted(path: &str, sent: u64, expected: u64, reason: &impl std::fmt::Display) {
    write_error(&format!(
        "[WARN] Stream aborted for {path} after {sent}/{expected} bytes: {reason}"
    ));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}
