// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP responder for the generated hosts file and metrics.
//!
//! Routes:
//!
//! - `GET /` and `GET /hosts` return the current hosts file as `text/plain`,
//!   read from disk on every request. `404` when the hosts output is disabled
//!   or has not been written yet.
//! - `GET /metrics` returns the Prometheus text exposition.

use crate::constants::{HOSTS_ROUTE, METRICS_ROUTE, ROOT_ROUTE};
use crate::metrics::gather_metrics;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Shared responder state.
#[derive(Debug, Clone, Default)]
pub struct HttpState {
    hosts_path: Option<Arc<PathBuf>>,
}

impl HttpState {
    /// State serving the hosts file at `hosts_path`, if any.
    #[must_use]
    pub fn new(hosts_path: Option<PathBuf>) -> Self {
        Self {
            hosts_path: hosts_path.map(Arc::new),
        }
    }
}

/// Build the responder's router.
pub fn router(state: HttpState) -> Router {
    Router::new()
        .route(ROOT_ROUTE, get(get_hosts))
        .route(HOSTS_ROUTE, get(get_hosts))
        .route(METRICS_ROUTE, get(get_metrics))
        .with_state(state)
}

/// Bind the responder's listener.
///
/// Binding happens before any cycle runs so an unusable address fails startup.
///
/// # Errors
///
/// Returns an error if `listen_addr` cannot be bound.
pub async fn bind(listen_addr: SocketAddr) -> io::Result<TcpListener> {
    let listener = TcpListener::bind(listen_addr).await?;
    info!(listen_addr = %listen_addr, "HTTP responder listening");
    Ok(listener)
}

/// Serve `app` on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve<S>(listener: TcpListener, app: Router, shutdown: S) -> io::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("HTTP responder stopped");
    Ok(())
}

/// GET / and GET /hosts
async fn get_hosts(State(state): State<HttpState>) -> Response {
    let Some(path) = state.hosts_path.as_deref() else {
        return (StatusCode::NOT_FOUND, "hosts output is disabled\n").into_response();
    };

    match tokio::fs::read_to_string(path).await {
        Ok(body) => ([(header::CONTENT_TYPE, TEXT_PLAIN)], body).into_response(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Hosts file not written yet");
            (StatusCode::NOT_FOUND, "hosts file not found\n").into_response()
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to read hosts file");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to read hosts file\n",
            )
                .into_response()
        }
    }
}

/// GET /metrics
async fn get_metrics() -> Response {
    match gather_metrics() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod http_tests;
