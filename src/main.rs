// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::Parser;
use headnscale::{
    docker::DockerInventory,
    http::{bind, router, serve, HttpState},
    Args, Reconciler, Scheduler,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("headnscale")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    init_logging();

    let config = Args::parse().into_config()?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting headnscale");
    config.log_summary();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let http_task = match config.http {
        Some(http) => {
            let listener = bind(http.listen_addr).await.with_context(|| {
                format!("failed to bind HTTP responder on {}", http.listen_addr)
            })?;
            let app = router(HttpState::new(config.hosts_path.clone()));
            let shutdown = wait_for_shutdown(shutdown_rx.clone());
            Some(tokio::spawn(async move {
                if let Err(e) = serve(listener, app, shutdown).await {
                    error!(listen_addr = %http.listen_addr, error = %e, "HTTP responder failed");
                }
            }))
        }
        None => {
            debug!("HTTP responder disabled");
            None
        }
    };

    let inventory = Arc::new(DockerInventory::new(config.docker.clone()));
    let scheduler = Scheduler::new(config.refresh);
    let reconciler = Reconciler::new(config, inventory);

    let reconciler = &reconciler;
    let cycles = scheduler
        .run(shutdown_signal(), || async move {
            reconciler.reconcile().await;
        })
        .await;

    // Stop the HTTP responder once the last cycle has finished
    let _ = shutdown_tx.send(true);
    if let Some(task) = http_task {
        if let Err(e) = task.await {
            warn!(error = %e, "HTTP responder task did not exit cleanly");
        }
    }

    info!(cycles, "Graceful shutdown completed");
    Ok(())
}

/// Initialize the tracing subscriber.
///
/// Respects `RUST_LOG` (default `info`) and `RUST_LOG_FORMAT` (`json` or text).
fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, initiating graceful shutdown"),
        () = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

/// Resolve once `rx` observes `true` or its sender is dropped.
async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}
