// Server loop module
// Accepts connections until shutdown is requested, then drains

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the accept loop on `listener`.
///
/// Must run inside a `LocalSet`, since connections are served with
/// `spawn_local`. Returns once `state.shutdown` is notified and active
/// connections have finished or the connection timeout has elapsed.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = state.shutdown.notified() => {
                logger::log_info("Shutdown requested, no longer accepting connections");
                break;
            }
        }
    }

    drop(listener);

    let remaining =
        drain_connections(&state.active_connections, state.config.connection_timeout()).await;
    if remaining == 0 {
        logger::log_info("All connections closed, server stopped");
    } else {
        logger::log_warning(&format!(
            "Stopping with {remaining} connection(s) still open"
        ));
    }

    Ok(())
}

/// Wait for the active connection count to reach zero, up to `deadline`.
///
/// Returns the number of connections still open when waiting stopped.
async fn drain_connections(counter: &AtomicUsize, deadline: Duration) -> usize {
    let until = tokio::time::Instant::now() + deadline;

    loop {
        let active = counter.load(Ordering::SeqCst);
        if active == 0 || tokio::time::Instant::now() >= until {
            return active;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}
