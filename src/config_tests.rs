// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `config.rs`

use super::*;

fn parse(extra: &[&str]) -> Args {
    let mut argv = vec![
        "headnscale",
        "--json-path",
        "/var/lib/headscale/extra-records.json",
        "--node-hostname",
        "n1",
        "--docker-host",
        "unix:///var/run/docker.sock",
    ];
    argv.extend_from_slice(extra);
    Args::try_parse_from(argv).expect("arguments should parse")
}

#[test]
fn test_defaults_with_ipv4() {
    let config = parse(&["--node-ip", "10.0.0.5"]).into_config().unwrap();

    assert_eq!(config.label_key, "headnscale.subdomain");
    assert_eq!(config.base_domain, "ts.net");
    assert_eq!(config.refresh, Duration::from_secs(60));
    assert_eq!(config.hosts_path, None);
    assert!(!config.no_base_domain);
    assert_eq!(
        config.node.address,
        NodeAddress::new(Some(Ipv4Addr::new(10, 0, 0, 5)), None)
    );
    assert_eq!(
        config.http.map(|h| h.listen_addr),
        Some("10.0.0.5:8080".parse().unwrap())
    );
}

#[test]
fn test_ipv6_only_is_accepted() {
    let config = parse(&["--node-ip6", "fd7a:115c:a1e0::5"])
        .into_config()
        .unwrap();

    assert_eq!(config.node.address.ipv4, None);
    assert!(config.node.address.ipv6.is_some());
    assert_eq!(
        config.http.map(|h| h.listen_addr),
        Some("[fd7a:115c:a1e0::5]:8080".parse().unwrap())
    );
}

#[test]
fn test_missing_addresses_is_rejected() {
    let err = parse(&[]).into_config().unwrap_err();

    assert_eq!(err, ConfigError::NoAddress);
}

#[test]
fn test_empty_address_counts_as_unset() {
    let err = parse(&["--node-ip", "  ", "--node-ip6", ""])
        .into_config()
        .unwrap_err();

    assert_eq!(err, ConfigError::NoAddress);
}

#[test]
fn test_invalid_ipv4_is_rejected() {
    let err = parse(&["--node-ip", "10.0.0.500"]).into_config().unwrap_err();

    assert!(matches!(
        err,
        ConfigError::InvalidAddress {
            field: "HEADNSCALE_NODE_IP",
            ..
        }
    ));
}

#[test]
fn test_ipv6_in_ipv4_field_is_rejected() {
    let err = parse(&["--node-ip", "::1"]).into_config().unwrap_err();

    assert!(matches!(err, ConfigError::InvalidAddress { family: "IPv4", .. }));
}

#[test]
fn test_missing_json_path_is_rejected() {
    let args = Args::try_parse_from([
        "headnscale",
        "--node-hostname",
        "n1",
        "--node-ip",
        "10.0.0.5",
        "--docker-host",
        "unix:///var/run/docker.sock",
    ])
    .unwrap();

    assert_eq!(
        args.into_config().unwrap_err(),
        ConfigError::MissingField {
            field: "HEADNSCALE_JSON_PATH"
        }
    );
}

#[test]
fn test_blank_hostname_is_rejected() {
    let mut args = parse(&["--node-ip", "10.0.0.5"]);
    args.node_hostname = Some("   ".to_string());

    assert_eq!(
        args.into_config().unwrap_err(),
        ConfigError::MissingField {
            field: "HEADNSCALE_NODE_HOSTNAME"
        }
    );
}

#[test]
fn test_zero_refresh_is_rejected() {
    let err = parse(&["--node-ip", "10.0.0.5", "--refresh-seconds", "0"])
        .into_config()
        .unwrap_err();

    assert!(matches!(
        err,
        ConfigError::InvalidValue {
            field: "HEADNSCALE_REFRESH_SECONDS",
            ..
        }
    ));
}

#[test]
fn test_unsupported_docker_host_is_rejected() {
    let mut args = parse(&["--node-ip", "10.0.0.5"]);
    args.docker_host = "ssh://user@remote".to_string();

    assert!(matches!(
        args.into_config().unwrap_err(),
        ConfigError::InvalidDockerHost(_)
    ));
}

#[test]
fn test_empty_hosts_path_disables_hosts_output() {
    let mut args = parse(&["--node-ip", "10.0.0.5"]);
    args.hosts_path = Some(PathBuf::new());

    assert_eq!(args.into_config().unwrap().hosts_path, None);
}

#[test]
fn test_no_serve_disables_http() {
    let config = parse(&["--node-ip", "10.0.0.5", "--no-serve"])
        .into_config()
        .unwrap();

    assert!(config.http.is_none());
}

#[test]
fn test_domains_primary_only() {
    let config = parse(&["--node-ip", "10.0.0.5"]).into_config().unwrap();

    assert_eq!(config.domains(), vec!["n1.ts.net".to_string()]);
}

#[test]
fn test_domains_with_no_base_domain() {
    let config = parse(&[
        "--node-ip",
        "10.0.0.5",
        "--no-base-domain",
        "--base-domain",
        "tail.example",
    ])
    .into_config()
    .unwrap();

    assert_eq!(
        config.domains(),
        vec!["n1.tail.example".to_string(), "n1".to_string()]
    );
}
