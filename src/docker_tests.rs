// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `docker.rs`

use super::*;
use std::path::Path;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;

const CONTAINERS: &str = r#"[
  {
    "Id": "aaa111",
    "Names": ["/grafana"],
    "State": "running",
    "Labels": {"headnscale.subdomain": "grafana|metrics"}
  },
  {
    "Id": "bbb222",
    "Names": ["/old-job"],
    "State": "exited",
    "Labels": {"headnscale.subdomain": "job"}
  },
  {
    "Id": "ccc333",
    "Names": ["/postgres"],
    "State": "running",
    "Labels": null
  }
]"#;

/// Serve one canned HTTP response on a unix socket and return the request line.
fn serve_once(socket: &Path, response: String) -> tokio::task::JoinHandle<String> {
    let listener = UnixListener::bind(socket).unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut reader = BufReader::new(stream);

        let mut request_line = String::new();
        reader.read_line(&mut request_line).await.unwrap();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
        }

        let mut stream = reader.into_inner();
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
        request_line
    })
}

fn ok_response(body: &str) -> String {
    format!(
        "HTTP/1.0 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
}

#[test]
fn test_endpoint_parse_unix() {
    assert_eq!(
        DockerEndpoint::parse("unix:///var/run/docker.sock").unwrap(),
        DockerEndpoint::Unix(PathBuf::from("/var/run/docker.sock"))
    );
}

#[test]
fn test_endpoint_parse_tcp() {
    let endpoint = DockerEndpoint::parse("tcp://10.0.0.2:2375/").unwrap();

    assert_eq!(endpoint, DockerEndpoint::Tcp("10.0.0.2:2375".to_string()));
    assert_eq!(endpoint.to_string(), "tcp://10.0.0.2:2375");
}

#[test]
fn test_endpoint_parse_rejects_other_schemes() {
    assert!(DockerEndpoint::parse("ssh://user@host").is_err());
    assert!(DockerEndpoint::parse("unix://").is_err());
    assert!(DockerEndpoint::parse("").is_err());
}

#[test]
fn test_from_host() {
    let inventory = DockerInventory::from_host("unix:///run/docker.sock").unwrap();
    assert_eq!(
        inventory.endpoint,
        DockerEndpoint::Unix(PathBuf::from("/run/docker.sock"))
    );

    assert!(matches!(
        DockerInventory::from_host("npipe:////./pipe/docker_engine"),
        Err(ConfigError::InvalidDockerHost(_))
    ));
}

#[test]
fn test_container_summary_to_workload() {
    let containers: Vec<ContainerSummary> = serde_json::from_str(CONTAINERS).unwrap();
    let workloads: Vec<Workload> = containers.into_iter().map(Workload::from).collect();

    assert_eq!(workloads[0].name, "grafana");
    assert_eq!(
        workloads[0].labels.get("headnscale.subdomain").map(String::as_str),
        Some("grafana|metrics")
    );
    // null labels decode to an empty map
    assert!(workloads[2].labels.is_empty());
}

#[tokio::test]
async fn test_list_running_filters_stopped_containers() {
    let dir = TempDir::new().unwrap();
    let socket = dir.path().join("docker.sock");
    let server = serve_once(&socket, ok_response(CONTAINERS));

    let inventory = DockerInventory::new(DockerEndpoint::Unix(socket));
    let workloads = inventory.list_running().await.unwrap();

    let ids: Vec<&str> = workloads.iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, vec!["aaa111", "ccc333"]);

    let request_line = server.await.unwrap();
    assert!(request_line.starts_with("GET /"));
    assert!(
        request_line.contains("/containers/json?") && request_line.contains("all=true"),
        "should list all containers, got {request_line:?}"
    );
}

#[tokio::test]
async fn test_list_running_reports_daemon_errors() {
    let dir = TempDir::new().unwrap();
    let socket = dir.path().join("docker.sock");
    let body = r#"{"message":"server error"}"#;
    let response = format!(
        "HTTP/1.0 500 Internal Server Error\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    let _server = serve_once(&socket, response);

    let inventory = DockerInventory::new(DockerEndpoint::Unix(socket));
    let err = inventory.list_running().await.unwrap_err();

    match err {
        InventoryError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "server error");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_list_running_missing_socket_fails_cycle() {
    let dir = TempDir::new().unwrap();
    let socket = dir.path().join("absent.sock");

    let inventory = DockerInventory::new(DockerEndpoint::Unix(socket));
    let err = inventory.list_running().await.unwrap_err();

    assert!(matches!(
        err,
        InventoryError::Client { .. } | InventoryError::Request { .. }
    ));
}

#[tokio::test]
async fn test_list_running_times_out_on_silent_daemon() {
    let dir = TempDir::new().unwrap();
    let socket = dir.path().join("docker.sock");
    let listener = UnixListener::bind(&socket).unwrap();
    let _server = tokio::spawn(async move {
        let (_stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let inventory = DockerInventory::new(DockerEndpoint::Unix(socket))
        .with_timeout(Duration::from_millis(100));
    let err = inventory.list_running().await.unwrap_err();

    match err {
        InventoryError::Timeout { timeout } => assert_eq!(timeout, Duration::from_millis(100)),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_list_running_rejects_malformed_json() {
    let dir = TempDir::new().unwrap();
    let socket = dir.path().join("docker.sock");
    let _server = serve_once(&socket, ok_response("{not json"));

    let inventory = DockerInventory::new(DockerEndpoint::Unix(socket));
    let err = inventory.list_running().await.unwrap_err();

    assert!(matches!(err, InventoryError::Request { .. }));
}
