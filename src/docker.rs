// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Docker Engine inventory source.
//!
//! Lists containers through the Docker Engine API with [`bollard`], either
//! over the local unix socket (`unix:///var/run/docker.sock`) or a TCP
//! endpoint (`tcp://host:2375`).
//!
//! A client is created per listing, so a daemon that is absent at startup or
//! restarts between cycles only fails the cycles that run while it is down.
//! The whole request is bounded by a timeout; a hung daemon surfaces as
//! [`InventoryError::Timeout`] instead of stalling the scheduler.

use crate::constants::{DOCKER_REQUEST_TIMEOUT_SECS, DOCKER_STATE_RUNNING};
use crate::errors::{ConfigError, InventoryError};
use crate::inventory::{InventorySource, Workload};
use async_trait::async_trait;
use bollard::container::ListContainersOptions;
use bollard::errors::Error as BollardError;
use bollard::models::ContainerSummary;
use bollard::{Docker, API_DEFAULT_VERSION};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Where the Docker Engine API is reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DockerEndpoint {
    /// Unix domain socket path
    Unix(PathBuf),
    /// TCP `host:port`
    Tcp(String),
}

impl DockerEndpoint {
    /// Parse a `DOCKER_HOST`-style URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDockerHost`] for any scheme other than
    /// `unix://` or `tcp://`, or an empty location.
    pub fn parse(host: &str) -> Result<Self, ConfigError> {
        let host = host.trim();
        if let Some(path) = host.strip_prefix("unix://").filter(|p| !p.is_empty()) {
            return Ok(Self::Unix(PathBuf::from(path)));
        }
        if let Some(addr) = host.strip_prefix("tcp://") {
            let addr = addr.trim_end_matches('/');
            if !addr.is_empty() {
                return Ok(Self::Tcp(addr.to_string()));
            }
        }
        Err(ConfigError::InvalidDockerHost(host.to_string()))
    }
}

impl fmt::Display for DockerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix(path) => write!(f, "unix://{}", path.display()),
            Self::Tcp(addr) => write!(f, "tcp://{addr}"),
        }
    }
}

impl From<ContainerSummary> for Workload {
    fn from(summary: ContainerSummary) -> Self {
        let id = summary.id.unwrap_or_default();
        let name = summary
            .names
            .as_deref()
            .and_then(|names| names.first())
            .map_or_else(|| id.clone(), |n| n.trim_start_matches('/').to_string());
        Self {
            id,
            name,
            labels: summary.labels.unwrap_or_default().into_iter().collect(),
        }
    }
}

/// [`InventorySource`] backed by the Docker Engine API.
#[derive(Debug, Clone)]
pub struct DockerInventory {
    endpoint: DockerEndpoint,
    timeout: Duration,
}

impl DockerInventory {
    /// Create an inventory source for `endpoint` with the default timeout.
    #[must_use]
    pub fn new(endpoint: DockerEndpoint) -> Self {
        Self {
            endpoint,
            timeout: Duration::from_secs(DOCKER_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Create an inventory source from a `DOCKER_HOST`-style URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDockerHost`] if `host` cannot be parsed.
    pub fn from_host(host: &str) -> Result<Self, ConfigError> {
        DockerEndpoint::parse(host).map(Self::new)
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a client for the configured endpoint.
    fn client(&self) -> Result<Docker, InventoryError> {
        let docker = match &self.endpoint {
            DockerEndpoint::Unix(socket) => Docker::connect_with_unix(
                &socket.to_string_lossy(),
                DOCKER_REQUEST_TIMEOUT_SECS,
                API_DEFAULT_VERSION,
            ),
            DockerEndpoint::Tcp(addr) => Docker::connect_with_http(
                &format!("http://{addr}"),
                DOCKER_REQUEST_TIMEOUT_SECS,
                API_DEFAULT_VERSION,
            ),
        }
        .map_err(|source| InventoryError::Client {
            endpoint: self.endpoint.to_string(),
            source,
        })?;

        Ok(docker.with_timeout(self.timeout))
    }

    /// List every container, running or not.
    async fn list_all(&self) -> Result<Vec<ContainerSummary>, InventoryError> {
        let docker = self.client()?;
        let options = ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        };

        tokio::time::timeout(self.timeout, docker.list_containers(Some(options)))
            .await
            .map_err(|_| InventoryError::Timeout {
                timeout: self.timeout,
            })?
            .map_err(|e| self.request_error(e))
    }

    fn request_error(&self, source: BollardError) -> InventoryError {
        match source {
            BollardError::DockerResponseServerError {
                status_code,
                message,
            } => InventoryError::Status {
                status: status_code,
                message,
            },
            BollardError::RequestTimeoutError => InventoryError::Timeout {
                timeout: self.timeout,
            },
            source => InventoryError::Request {
                endpoint: self.endpoint.to_string(),
                source,
            },
        }
    }
}

#[async_trait]
impl InventorySource for DockerInventory {
    async fn list_running(&self) -> Result<Vec<Workload>, InventoryError> {
        let containers = self.list_all().await?;
        let total = containers.len();

        let running: Vec<Workload> = containers
            .into_iter()
            .filter(|c| c.state.as_deref() == Some(DOCKER_STATE_RUNNING))
            .map(Workload::from)
            .collect();

        debug!(
            endpoint = %self.endpoint,
            total,
            running = running.len(),
            "Listed containers"
        );
        Ok(running)
    }
}

#[cfg(test)]
#[path = "docker_tests.rs"]
mod docker_tests;
