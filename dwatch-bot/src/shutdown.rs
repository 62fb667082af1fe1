//! Signal handling for graceful shutdown.

use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::watch;

/// Spawns a task that listens for SIGTERM and SIGINT (Ctrl+C).
///
/// Returns a receiver that flips to `true` once either arrives.
pub fn spawn_shutdown_handler() -> std::io::Result<watch::Receiver<bool>> {
    // Install both handlers before spawning so failures surface at startup.
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, initiating graceful shutdown");
            }
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT, initiating graceful shutdown");
            }
        }
        let _ = shutdown_tx.send(true);
    });

    Ok(shutdown_rx)
}
