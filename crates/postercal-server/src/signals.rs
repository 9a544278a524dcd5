//! Signal handling for the proxy.
//!
//! - SIGINT / SIGTERM (Ctrl+C elsewhere): graceful shutdown
//! - SIGHUP: drop the cached feed

use tracing::{debug, info, warn};

use crate::state::AppState;

/// Completes when the process is asked to stop.
///
/// If a Unix handler cannot be installed the function falls back to Ctrl+C
/// alone.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                    _ = tokio::signal::ctrl_c() => info!("Received SIGINT, shutting down"),
                }
                return;
            }
            Err(e) => warn!(error = %e, "Failed to install SIGTERM handler"),
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            // No handler: serve until killed.
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

/// Spawns a task that clears the feed cache on every SIGHUP.
#[cfg(unix)]
pub(crate) fn spawn_reload_listener(state: AppState) {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sighup = match signal(SignalKind::hangup()) {
        Ok(sighup) => sighup,
        Err(e) => {
            warn!(error = %e, "Failed to install SIGHUP handler");
            return;
        }
    };

    tokio::spawn(async move {
        while sighup.recv().await.is_some() {
            info!("Received SIGHUP, dropping cached feed");
            state.invalidate().await;
        }
        debug!("Reload listener stopped");
    });
}

/// Non-Unix implementation (no-op).
#[cfg(not(unix))]
pub(crate) fn spawn_reload_listener(_state: AppState) {}
