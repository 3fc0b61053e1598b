// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub serve: ServeConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Listener configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tokio worker threads, CPU count when unset
    #[serde(default)]
    pub workers: Option<usize>,
    /// Listen backlog
    pub backlog: u32,
}

/// What to serve and how
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServeConfig {
    /// Directory every served path is confined to
    pub root: String,
    /// Bytes per read while streaming a body
    pub chunk_size: usize,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// Print a REQUEST/RESPONSE block with all headers for every request
    pub show_headers: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Connection-level timeouts
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds to wait for request headers, 0 disables
    pub read_timeout: u64,
    /// Seconds a single body chunk may wait on the client, 0 disables
    pub write_timeout: u64,
}
