// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

use headnscale::config::{Config, NodeConfig};
use headnscale::docker::DockerEndpoint;
use headnscale::records::NodeAddress;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;

/// Fake Docker daemon answering `GET /containers/json` on a unix socket.
///
/// The container list can be replaced between requests with [`FakeDocker::set`].
pub struct FakeDocker {
    containers: Arc<Mutex<Value>>,
    task: tokio::task::JoinHandle<()>,
}

impl FakeDocker {
    /// Start serving `containers` on `socket`.
    pub fn start(socket: &Path, containers: Value) -> Self {
        let listener = UnixListener::bind(socket).unwrap();
        let containers = Arc::new(Mutex::new(containers));
        let shared = containers.clone();

        let task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let mut reader = BufReader::new(stream);
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).await.unwrap_or(0) == 0 || line == "\r\n" {
                        break;
                    }
                }

                let body = shared.lock().unwrap().to_string();
                let response = format!(
                    "HTTP/1.0 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
                    body.len()
                );
                let mut stream = reader.into_inner();
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self { containers, task }
    }

    /// Replace the container list served from now on.
    pub fn set(&self, containers: Value) {
        *self.containers.lock().unwrap() = containers;
    }
}

impl Drop for FakeDocker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Docker API container summary as returned by `/containers/json`.
pub fn container(id: &str, state: &str, labels: &[(&str, &str)]) -> Value {
    let labels: serde_json::Map<String, Value> = labels
        .iter()
        .map(|(k, v)| ((*k).to_string(), Value::String((*v).to_string())))
        .collect();
    json!({
        "Id": id,
        "Names": [format!("/{id}")],
        "Image": "nginx:latest",
        "State": state,
        "Labels": labels,
    })
}

/// Configuration writing both outputs into `dir` and reading from `socket`.
pub fn config(dir: &Path, socket: PathBuf, address: NodeAddress) -> Config {
    Config {
        label_key: "headnscale.subdomain".to_string(),
        records_path: dir.join("extra-records.json"),
        hosts_path: Some(dir.join("hosts")),
        no_base_domain: false,
        base_domain: "ts.net".to_string(),
        refresh: Duration::from_secs(60),
        node: NodeConfig {
            hostname: "node1".to_string(),
            address,
        },
        docker: DockerEndpoint::Unix(socket),
        http: None,
    }
}
