//! Service wiring: run loop, optional reverse-proxy listener, signals

pub mod args;
pub mod http;
pub mod run_loop;

pub use args::ServiceArgs;
pub use run_loop::{RunState, ServiceRunLoop};

use crate::common::{Result, ServiceVariant, SupervisorConfig};
use crate::process::TokioLauncher;
use crate::topology::ConfiguredDirectory;
use std::time::Duration;

/// Timeout for each node directory request
pub const DIRECTORY_TIMEOUT: Duration = Duration::from_secs(10);

/// Run one activation with the real launcher, stopping on SIGINT/SIGTERM
pub async fn run_service(config: SupervisorConfig) -> Result<RunState> {
    config.validate()?;
    let directory = ConfiguredDirectory::from_source(config.directory.as_ref(), DIRECTORY_TIMEOUT)?;

    let (stop_tx, _) = tokio::sync::watch::channel(false);
    let listener = match (config.variant, config.http_bind) {
        (ServiceVariant::Store, Some(addr)) => {
            let mut stop_rx = stop_tx.subscribe();
            let state = http::ListenerState {
                variant: config.variant,
            };
            Some(tokio::spawn(http::serve(addr, state, async move {
                let _ = stop_rx.changed().await;
            })))
        }
        (variant, Some(addr)) => {
            tracing::warn!(%variant, %addr, "http_bind is only used by the store variant");
            None
        }
        (_, None) => None,
    };

    let run_loop = ServiceRunLoop::new(config, directory, TokioLauncher);
    let result = run_loop
        .run(async {
            let reason = wait_for_shutdown_signal().await;
            tracing::info!("{} - deactivating", reason);
        })
        .await;

    let _ = stop_tx.send(true);
    if let Some(handle) = listener {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "reverse-proxy listener failed"),
            Err(e) => tracing::warn!(error = %e, "reverse-proxy listener task aborted"),
        }
    }

    result
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM, returning which one fired
pub async fn wait_for_shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => tokio::select! {
                _ = tokio::signal::ctrl_c() => "SIGINT (Ctrl+C) received",
                _ = sigterm.recv() => "SIGTERM received",
            },
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable, waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
                "SIGINT (Ctrl+C) received"
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        "SIGINT (Ctrl+C) received"
    }
}
