// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command-line and environment configuration.
//!
//! Every setting is a command-line flag with a `HEADNSCALE_*` environment
//! variable fallback, so the binary runs unchanged as a container with only
//! environment configuration. [`Args::into_config`] validates the raw values
//! once at startup and produces an immutable [`Config`] that is passed into
//! the reconciler; nothing downstream reads the environment.
//!
//! Empty environment values are treated as unset.

use crate::constants::{
    DEFAULT_BASE_DOMAIN, DEFAULT_DOCKER_HOST, DEFAULT_HTTP_PORT, DEFAULT_LABEL_KEY,
    DEFAULT_REFRESH_SECS,
};
use crate::docker::DockerEndpoint;
use crate::errors::ConfigError;
use crate::records::NodeAddress;
use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Publish labeled Docker containers as Headscale extra DNS records.
#[derive(Parser, Debug, Clone)]
#[command(name = "headnscale")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Container label holding the hostname(s) to publish, `|`-separated
    #[arg(long, env = "HEADNSCALE_LABEL_KEY", default_value = DEFAULT_LABEL_KEY)]
    pub label_key: String,

    /// Output path for the Headscale extra-records JSON file
    #[arg(long, env = "HEADNSCALE_JSON_PATH")]
    pub json_path: Option<PathBuf>,

    /// Output path for the hosts file (disabled when unset)
    #[arg(long, env = "HEADNSCALE_HOSTS_PATH")]
    pub hosts_path: Option<PathBuf>,

    /// Also publish `<subdomain>.<node-hostname>` without the base domain
    #[arg(long, env = "HEADNSCALE_NO_BASE_DOMAIN")]
    pub no_base_domain: bool,

    /// Base domain appended after the node hostname
    #[arg(long, env = "HEADNSCALE_BASE_DOMAIN", default_value = DEFAULT_BASE_DOMAIN)]
    pub base_domain: String,

    /// Seconds between reconciliation cycles
    #[arg(long, env = "HEADNSCALE_REFRESH_SECONDS", default_value_t = DEFAULT_REFRESH_SECS)]
    pub refresh_seconds: u64,

    /// Port for the hosts/metrics HTTP server
    #[arg(long, env = "HEADNSCALE_PORT", default_value_t = DEFAULT_HTTP_PORT)]
    pub port: u16,

    /// Do not start the hosts/metrics HTTP server
    #[arg(long, env = "HEADNSCALE_NO_SERVE")]
    pub no_serve: bool,

    /// Hostname of this node, used to form `<node-hostname>.<base-domain>`
    #[arg(long, env = "HEADNSCALE_NODE_HOSTNAME")]
    pub node_hostname: Option<String>,

    /// IPv4 address published as A records
    #[arg(long, env = "HEADNSCALE_NODE_IP")]
    pub node_ip: Option<String>,

    /// IPv6 address published as AAAA records
    #[arg(long, env = "HEADNSCALE_NODE_IP6")]
    pub node_ip6: Option<String>,

    /// Docker Engine endpoint (`unix:///path` or `tcp://host:port`)
    #[arg(long, env = "DOCKER_HOST", default_value = DEFAULT_DOCKER_HOST)]
    pub docker_host: String,
}

/// Identity of the node whose containers are published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// Node hostname
    pub hostname: String,
    /// Addresses published for every hostname fragment
    pub address: NodeAddress,
}

/// HTTP responder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpConfig {
    /// Socket address the responder binds to
    pub listen_addr: SocketAddr,
}

/// Validated runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Container label identifying published hostnames
    pub label_key: String,
    /// Structured records output path
    pub records_path: PathBuf,
    /// Hosts-file output path; `None` disables hosts output
    pub hosts_path: Option<PathBuf>,
    /// Also publish records under the bare node hostname
    pub no_base_domain: bool,
    /// Suffix appended after the node hostname
    pub base_domain: String,
    /// Reconciliation period
    pub refresh: Duration,
    /// Node identity
    pub node: NodeConfig,
    /// Docker Engine endpoint
    pub docker: DockerEndpoint,
    /// HTTP responder; `None` when serving is disabled
    pub http: Option<HttpConfig>,
}

impl Args {
    /// Validate raw arguments into a [`Config`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for missing required settings, unparsable
    /// addresses, a zero refresh interval or port, or an unsupported Docker host.
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let label_key = required(Some(self.label_key), "HEADNSCALE_LABEL_KEY")?;
        let base_domain = required(Some(self.base_domain), "HEADNSCALE_BASE_DOMAIN")?;
        let hostname = required(self.node_hostname, "HEADNSCALE_NODE_HOSTNAME")?;

        let records_path = self
            .json_path
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigError::MissingField {
                field: "HEADNSCALE_JSON_PATH",
            })?;
        let hosts_path = self.hosts_path.filter(|p| !p.as_os_str().is_empty());

        if self.refresh_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "HEADNSCALE_REFRESH_SECONDS",
                reason: "must be a positive number of seconds".to_string(),
            });
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "HEADNSCALE_PORT",
                reason: "must be between 1 and 65535".to_string(),
            });
        }

        let ipv4 = parse_optional::<Ipv4Addr>(self.node_ip, "HEADNSCALE_NODE_IP", "IPv4")?;
        let ipv6 = parse_optional::<Ipv6Addr>(self.node_ip6, "HEADNSCALE_NODE_IP6", "IPv6")?;
        let address = NodeAddress::new(ipv4, ipv6);
        if address.is_empty() {
            return Err(ConfigError::NoAddress);
        }

        let docker = DockerEndpoint::parse(&self.docker_host)?;

        let http = (!self.no_serve).then(|| {
            let ip = ipv4
                .map(IpAddr::V4)
                .or(ipv6.map(IpAddr::V6))
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
            HttpConfig {
                listen_addr: SocketAddr::new(ip, self.port),
            }
        });

        Ok(Config {
            label_key,
            records_path,
            hosts_path,
            no_base_domain: self.no_base_domain,
            base_domain,
            refresh: Duration::from_secs(self.refresh_seconds),
            node: NodeConfig { hostname, address },
            docker,
            http,
        })
    }
}

impl Config {
    /// Primary domain, `<node-hostname>.<base-domain>`.
    #[must_use]
    pub fn primary_domain(&self) -> String {
        format!("{}.{}", self.node.hostname, self.base_domain)
    }

    /// Domains records are published under, primary first.
    ///
    /// The bare node hostname is appended when `no_base_domain` is set.
    #[must_use]
    pub fn domains(&self) -> Vec<String> {
        let mut domains = vec![self.primary_domain()];
        if self.no_base_domain {
            domains.push(self.node.hostname.clone());
        }
        domains
    }

    /// Log the effective configuration at startup.
    pub fn log_summary(&self) {
        info!(
            label_key = %self.label_key,
            records_path = %self.records_path.display(),
            hosts_path = ?self.hosts_path,
            base_domain = %self.base_domain,
            hostname = %self.node.hostname,
            no_base_domain = self.no_base_domain,
            refresh_secs = self.refresh.as_secs(),
            node_ipv4 = ?self.node.address.ipv4,
            node_ipv6 = ?self.node.address.ipv6,
            docker = %self.docker,
            http = ?self.http.map(|h| h.listen_addr),
            "Using configuration"
        );
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingField { field })
}

fn parse_optional<T: std::str::FromStr>(
    value: Option<String>,
    field: &'static str,
    family: &'static str,
) -> Result<Option<T>, ConfigError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidAddress {
                field,
                family,
                value: raw.to_string(),
            }),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
