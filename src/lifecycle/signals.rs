//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGTERM/SIGINT (Ctrl+C elsewhere)
//! - Translate the signal into the host's stop event
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - A failed handler installation is returned, not ignored

/// Wait for the first termination signal.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result?,
        _ = terminate.recv() => {}
    }
    tracing::info!("Shutdown signal received");
    Ok(())
}

/// Wait for the first termination signal.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    Ok(())
}
