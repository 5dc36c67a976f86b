// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS record and hosts-line construction, ordering, and rendering.
//!
//! Records are built per domain from a flat list of hostname fragments and the
//! node's address set. One record is emitted per fragment per address family:
//! IPv4 produces an `A` record, IPv6 an `AAAA` record.
//!
//! Output must be byte-stable for unchanged input. Headscale checksums the
//! extra-records file and only reloads when the checksum moves, so both
//! outputs are sorted into a total order before rendering:
//!
//! - records by `name`, then by `type` (`A` before `AAAA`)
//! - hosts lines by fqdn (the second whitespace-delimited field), then by the
//!   whole line; malformed lines compare whole
//!
//! # Example
//!
//! ```rust
//! use headnscale::records::{build_records, sort_records, NodeAddress};
//!
//! let address = NodeAddress::new(Some("10.0.0.5".parse().unwrap()), None);
//! let records = sort_records(build_records(&["web".to_string()], "n1.ts.net", &address));
//!
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].name, "web.n1.ts.net");
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Addresses published for the local node.
///
/// Either family may be absent; callers guarantee at least one is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeAddress {
    /// IPv4 address, published as `A` records
    pub ipv4: Option<Ipv4Addr>,
    /// IPv6 address, published as `AAAA` records
    pub ipv6: Option<Ipv6Addr>,
}

impl NodeAddress {
    /// Create a node address from optional IPv4 and IPv6 parts.
    #[must_use]
    pub fn new(ipv4: Option<Ipv4Addr>, ipv6: Option<Ipv6Addr>) -> Self {
        Self { ipv4, ipv6 }
    }

    /// Returns `true` when neither address family is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ipv4.is_none() && self.ipv6.is_none()
    }

    /// Present address families in publication order (IPv4 first).
    fn families(&self) -> impl Iterator<Item = (RecordType, String)> + '_ {
        let v4 = self.ipv4.map(|ip| (RecordType::A, ip.to_string()));
        let v6 = self.ipv6.map(|ip| (RecordType::AAAA, ip.to_string()));
        v4.into_iter().chain(v6)
    }
}

/// DNS record type emitted by headnscale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    AAAA,
}

impl RecordType {
    /// Wire name of the record type, as written to the records file.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::AAAA => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the Headscale extra-records file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Fully-qualified name, `<fragment>.<domain>`
    pub name: String,
    /// Record type
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Address the name resolves to
    pub value: String,
}

/// One line of the hosts file, rendered as `<address> <fqdn>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostsLine {
    /// Address the name resolves to
    pub address: String,
    /// Fully-qualified name
    pub fqdn: String,
}

impl fmt::Display for HostsLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.address, self.fqdn)
    }
}

/// Build one record per fragment per address family for `domain`.
///
/// # Arguments
///
/// * `fragments` - Non-empty hostname fragments, in extraction order
/// * `domain` - Domain suffix, e.g. `node1.ts.net` or the bare `node1`
/// * `address` - Node address set
///
/// # Returns
///
/// Records in fragment order, `A` before `AAAA` for each fragment. Empty when
/// no address family is present.
#[must_use]
pub fn build_records(fragments: &[String], domain: &str, address: &NodeAddress) -> Vec<DnsRecord> {
    fragments
        .iter()
        .flat_map(|fragment| {
            let name = format!("{fragment}.{domain}");
            address.families().map(move |(record_type, value)| DnsRecord {
                name: name.clone(),
                record_type,
                value,
            })
        })
        .collect()
}

/// Build one hosts line per fragment per address family for `domain`.
///
/// Mirrors [`build_records`] exactly, so both outputs always describe the
/// same set of names.
#[must_use]
pub fn build_hosts_lines(
    fragments: &[String],
    domain: &str,
    address: &NodeAddress,
) -> Vec<HostsLine> {
    fragments
        .iter()
        .flat_map(|fragment| {
            let fqdn = format!("{fragment}.{domain}");
            address.families().map(move |(_, ip)| HostsLine {
                address: ip,
                fqdn: fqdn.clone(),
            })
        })
        .collect()
}

/// Total order over records: `name`, then `type`.
#[must_use]
pub fn compare_records(a: &DnsRecord, b: &DnsRecord) -> Ordering {
    a.name
        .cmp(&b.name)
        .then_with(|| a.record_type.as_str().cmp(b.record_type.as_str()))
}

/// Order two rendered hosts lines by their fqdn field, then by the whole line.
///
/// Lines with fewer than two whitespace-delimited fields are compared whole.
/// The whole-line tie-break keeps the order total when fqdn fields collide,
/// e.g. for fragments containing spaces.
#[must_use]
pub fn compare_hosts_lines(a: &str, b: &str) -> Ordering {
    let mut fields_a = a.split_whitespace();
    let mut fields_b = b.split_whitespace();

    match (fields_a.nth(1), fields_b.nth(1)) {
        (Some(fqdn_a), Some(fqdn_b)) => fqdn_a.cmp(fqdn_b).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    }
}

/// Sort records into their canonical order.
///
/// The sort is stable, so exact duplicates keep a deterministic position.
#[must_use]
pub fn sort_records(mut records: Vec<DnsRecord>) -> Vec<DnsRecord> {
    records.sort_by(compare_records);
    records
}

/// Sort hosts lines into their canonical order.
#[must_use]
pub fn sort_hosts_lines(lines: Vec<HostsLine>) -> Vec<HostsLine> {
    let mut rendered: Vec<(String, HostsLine)> =
        lines.into_iter().map(|line| (line.to_string(), line)).collect();
    rendered.sort_by(|(a, _), (b, _)| compare_hosts_lines(a, b));
    rendered.into_iter().map(|(_, line)| line).collect()
}

/// Render records as the indented JSON array Headscale reads.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_records(records: &[DnsRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}

/// Render hosts lines, each terminated by a newline.
#[must_use]
pub fn render_hosts(lines: &[HostsLine]) -> String {
    lines.iter().map(|line| format!("{line}\n")).collect()
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod records_tests;
