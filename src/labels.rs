// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Hostname extraction from container labels.
//!
//! A container opts into DNS publication by carrying the configured label key.
//! The label value holds one or more hostname fragments separated by `|`:
//!
//! ```rust
//! use headnscale::labels::extract_fragments;
//! use std::collections::BTreeMap;
//!
//! let labels = BTreeMap::from([(
//!     "headnscale.subdomain".to_string(),
//!     "grafana | metrics".to_string(),
//! )]);
//!
//! let fragments = extract_fragments(&labels, "headnscale.subdomain", '|');
//! assert_eq!(fragments, vec!["grafana", "metrics"]);
//! ```

use std::collections::BTreeMap;

/// Returns `true` if `labels` carries `key`, regardless of its value.
#[must_use]
pub fn has_label(labels: &BTreeMap<String, String>, key: &str) -> bool {
    labels.contains_key(key)
}

/// Extract hostname fragments from the value stored under `key`.
///
/// The value is split on `delimiter`, each piece is trimmed, and pieces that
/// are empty after trimming are dropped. Output keeps split order and is not
/// deduplicated. A missing key yields an empty vector.
#[must_use]
pub fn extract_fragments(
    labels: &BTreeMap<String, String>,
    key: &str,
    delimiter: char,
) -> Vec<String> {
    let Some(value) = labels.get(key) else {
        return Vec::new();
    };

    value
        .split(delimiter)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
#[path = "labels_tests.rs"]
mod labels_tests;
