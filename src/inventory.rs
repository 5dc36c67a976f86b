// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Workload inventory abstraction.
//!
//! The reconciler only needs a point-in-time list of running workloads and
//! their labels. [`InventorySource`] is that capability; the production
//! implementation is [`crate::docker::DockerInventory`].

use crate::errors::InventoryError;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// A running container as seen by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Workload {
    /// Opaque identifier (the container ID)
    pub id: String,
    /// Human-readable name, used only in logs
    pub name: String,
    /// Container labels
    pub labels: BTreeMap<String, String>,
}

impl Workload {
    /// Create a workload with the given ID and labels.
    #[must_use]
    pub fn new(id: impl Into<String>, labels: BTreeMap<String, String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            labels,
        }
    }
}

/// Source of the current workload inventory.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// List running workloads.
    ///
    /// # Errors
    ///
    /// Returns an [`InventoryError`] when the inventory cannot be obtained.
    async fn list_running(&self) -> Result<Vec<Workload>, InventoryError>;
}
