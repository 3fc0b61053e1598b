// Configuration module entry point
// Loads settings from file, environment and defaults, and builds runtime state

mod state;
mod types;

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

pub use state::AppState;
pub use types::{Config, LoggingConfig, PerformanceConfig, ServeConfig, ServerConfig};

/// Environment prefix, e.g. `RANGESERVE__SERVE__ROOT=/videos`
pub const ENV_PREFIX: &str = "RANGESERVE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional; environment variables override it, and built-in
    /// defaults fill the rest. `serve.root` has no default.
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.backlog", 128)?
            .set_default("serve.chunk_size", 8192)?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.serve.root.trim().is_empty() {
            return Err(ConfigError::Invalid("serve.root must not be empty".into()));
        }
        if self.serve.chunk_size == 0 {
            return Err(ConfigError::Invalid("serve.chunk_size must be > 0".into()));
        }
        if self.server.workers == Some(0) {
            return Err(ConfigError::Invalid("server.workers must be > 0".into()));
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("Invalid address: {e}")))
    }

    pub const fn read_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.performance.read_timeout)
    }

    pub const fn write_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.performance.write_timeout)
    }
}

const fn non_zero_secs(secs: u64) -> Option<Duration> {
    if secs == 0 {
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}
