// Application state module
// Immutable per-process state handed to every request

use std::io;
use std::time::Duration;

use super::types::Config;
use crate::handler::resolve::ServeRoot;

/// Application state
///
/// Built once at startup and shared read-only; requests never mutate it.
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    pub root: ServeRoot,
    pub chunk_size: usize,
    pub write_timeout: Option<Duration>,
}

impl AppState {
    /// Resolve the configured serve root. Fails if it is missing or not a
    /// directory.
    pub fn new(config: &Config) -> io::Result<Self> {
        let root = ServeRoot::new(&config.serve.root)?;

        Ok(Self {
            config: config.clone(),
            root,
            chunk_size: config.serve.chunk_size,
            write_timeout: config.write_timeout(),
        })
    }
}
