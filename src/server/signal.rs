// Signal handling module
//
// SIGINT (Ctrl+C) and SIGTERM request a graceful shutdown.
// On non-Unix platforms only Ctrl+C is supported.

use crate::logger;

/// Resolves once the process has been asked to stop
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => Some(s),
        Err(e) => {
            logger::log_warning(&format!("Failed to register SIGTERM handler: {e}"));
            None
        }
    };

    let terminate = async {
        match sigterm.as_mut() {
            Some(s) => {
                s.recv().await;
            }
            None => std::future::pending::<()>().await,
        }
    };

    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            logger::log_warning(&format!("Failed to listen for Ctrl+C: {e}"));
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = interrupt => {
            logger::log_info("[SIGNAL] SIGINT received, shutting down");
        }
        () = terminate => {
            logger::log_info("[SIGNAL] SIGTERM received, shutting down");
        }
    }
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => logger::log_info("[SIGNAL] Ctrl+C received, shutting down"),
        Err(e) => {
            logger::log_warning(&format!("Failed to listen for Ctrl+C: {e}"));
            std::future::pending::<()>().await;
        }
    }
}
