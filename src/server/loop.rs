// Server loop module
// Accepts connections until the shutdown future resolves, then drains

use std::future::Future;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Accept connections on `listener` until `shutdown` completes.
///
/// After shutdown the listener is closed, in-flight requests are allowed to
/// finish and idle keep-alive connections are closed. Connections still
/// open after `performance.shutdown_grace` seconds are abandoned.
pub async fn start_server_loop<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &graceful);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => break,
        }
    }

    drop(listener);
    logger::log_shutdown_started(state.active_connections.load(Ordering::SeqCst));

    let grace = Duration::from_secs(state.config.performance.shutdown_grace);
    tokio::select! {
        () = graceful.shutdown() => {
            logger::log_info("All connections closed");
        }
        () = tokio::time::sleep(grace) => {
            logger::log_warning(&format!(
                "Shutdown grace period of {}s elapsed, dropping remaining connections",
                grace.as_secs()
            ));
        }
    }

    logger::log_shutdown_complete();
}
