// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Periodic cycle scheduling.
//!
//! [`Scheduler::run`] invokes a cycle callback once immediately and then on
//! every tick of a fixed interval until a shutdown future resolves.
//!
//! - Cycles never overlap: the next tick is only awaited after the previous
//!   cycle's future has completed.
//! - Shutdown is only observed between cycles, so an in-flight cycle always
//!   finishes.
//! - A cycle that outlasts the interval delays the next one rather than
//!   triggering a burst of catch-up cycles.

use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Runs a cycle callback on a fixed period.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    interval: Duration,
}

impl Scheduler {
    /// Create a scheduler with the given period.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero; configuration validation rejects a zero
    /// refresh interval before a scheduler is built.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        assert!(!interval.is_zero(), "scheduler interval must be positive");
        Self { interval }
    }

    /// Period between cycle starts.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run `cycle` immediately and then every interval until `shutdown` resolves.
    ///
    /// # Returns
    ///
    /// The number of cycles that ran.
    pub async fn run<S, F, Fut>(&self, shutdown: S, mut cycle: F) -> u64
    where
        S: Future<Output = ()>,
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut cycles: u64 = 0;
        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    info!(cycles, "Shutdown requested, scheduler stopping");
                    break;
                }
                _ = ticker.tick() => {}
            }

            cycles += 1;
            debug!(cycle = cycles, "Starting reconciliation cycle");
            cycle().await;
        }

        cycles
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod scheduler_tests;
