//! Proxy registrar host.
//!
//! Runs the registrar the way an embedding host would: register on start,
//! unregister on SIGTERM/SIGINT.
//!
//! ```text
//!   host start ──▶ on_start ──▶ validate env ──▶ POST /api/register[-fallback]
//!                                                     (2 attempts, 5s each)
//!   SIGTERM    ──▶ on_stop  ──▶ POST /api/unregister  (1 attempt, 3s)
//!              ──▶ wait up to host.stop_deadline_secs
//!              ──▶ trigger shutdown ──▶ exit
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::runtime::Handle;

use proxy_registrar::lifecycle::signals::wait_for_shutdown_signal;
use proxy_registrar::lifecycle::startup::{init_observability, resolve_settings};
use proxy_registrar::{LifecycleController, TracingSink};

#[derive(Parser)]
#[command(name = "proxy-registrar")]
#[command(about = "Registers this server with a registry proxy for its lifetime")]
#[command(long_about = None)]
struct Cli {
    /// Optional TOML settings file (retry budgets, observability).
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let settings = resolve_settings(cli.settings.as_deref())?;
    init_observability(&settings, cli.log_level.as_deref())?;

    tracing::info!(
        register_attempts = settings.register.max_attempts,
        unregister_attempts = settings.unregister.max_attempts,
        retry_delay_ms = settings.retry_delay_ms,
        "proxy-registrar v0.1.0 starting"
    );

    let stop_deadline = Duration::from_secs(settings.host.stop_deadline_secs);
    let controller =
        LifecycleController::from_env(settings, Arc::new(TracingSink), Handle::current());

    // Registration runs in the background; the host does not wait for it.
    let _registration = controller.on_start();

    wait_for_shutdown_signal().await?;

    // Cancels a register that is still retrying before unregistering.
    if let Some(unregister) = controller.on_stop() {
        if unregister.wait(stop_deadline).await.is_none() {
            tracing::warn!(
                deadline_secs = stop_deadline.as_secs(),
                "Unregister did not finish before the stop deadline"
            );
        }
    }
    controller.shutdown().trigger();

    tracing::info!("Shutdown complete");
    Ok(())
}
