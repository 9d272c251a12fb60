use clap::Parser;
use spa_serve::config::{AppState, Cli, Config};
use spa_serve::error::StartupError;
use spa_serve::{logger, server};
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), StartupError> {
    let cli = Cli::parse();
    let cfg = Config::load(&cli)?;

    // Validate the root before anything is bound
    let state = AppState::new(cfg)?;
    let addr = state
        .config
        .socket_addr()
        .map_err(StartupError::InvalidAddress)?;
    logger::init(&state.config.logging).map_err(StartupError::Logger)?;

    // Multi-threaded runtime, sized by the workers setting when present
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = state.config.server.workers.filter(|&n| n > 0) {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build().map_err(StartupError::Runtime)?;

    runtime.block_on(async_main(addr, state))
}

async fn async_main(addr: SocketAddr, state: AppState) -> Result<(), StartupError> {
    let listener =
        server::create_listener(addr).map_err(|source| StartupError::Bind { addr, source })?;
    let local_addr = listener.local_addr().unwrap_or(addr);

    logger::log_server_start(&local_addr, &state.root, state.config.server.workers);

    server::start_server_loop(listener, Arc::new(state), server::shutdown_signal()).await;
    Ok(())
}
