use std::sync::Arc;
use std::time::Duration;

mod config;
mod error;
mod handler;
mod http;
mod logger;
mod processor;
mod server;

/// How long open connections get to finish after a shutdown signal
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Config file path without extension, default "config"
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let listener = server::create_listener(addr)?;

    let state = Arc::new(config::AppState::new(cfg));
    logger::log_server_start(&addr, &state.config);

    server::start_signal_handler(Arc::clone(&state));
    server::start_server_loop(listener, Arc::clone(&state)).await;

    let remaining = server::drain_connections(&state, SHUTDOWN_GRACE).await;
    logger::log_server_stop(remaining);
    Ok(())
}
