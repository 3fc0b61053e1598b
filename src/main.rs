use std::sync::Arc;

use rangeserve::config::{AppState, Config};
use rangeserve::{logger, server};

/// Config file used when no path is given, resolved without extension
const DEFAULT_CONFIG: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Create the Tokio runtime, sizing worker threads from config
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let state = Arc::new(AppState::new(&cfg)?);
    let listener = server::create_reusable_listener(addr, cfg.server.backlog)?;

    logger::log_server_start(&listener.local_addr()?, &cfg);
    server::start_server_loop(listener, state, server::shutdown_signal()).await;
    Ok(())
}
