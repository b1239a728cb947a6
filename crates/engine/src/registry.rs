// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-app worker pool registry
//!
//! An explicit registry object with a register/drain lifecycle, owned by
//! the runtime that composes pipelines. Pools are appended as handlers
//! are attached and removed only by draining; sibling pipelines of the
//! same app share one entry.

use crate::pool::WorkerPool;
use jobflow_core::error::ConfigError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Aggregate outcome of draining one app's pools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShutdownReport {
    /// Pools that received a shutdown call
    pub pools: usize,
    /// Pools whose shutdown errored (logged, not propagated)
    pub failures: usize,
}

/// Registry of worker pools keyed by app
#[derive(Clone, Default)]
pub struct PoolRegistry {
    pools: Arc<Mutex<HashMap<String, Vec<Arc<WorkerPool>>>>>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pool under the given app
    pub fn register(&self, app: &str, pool: Arc<WorkerPool>) {
        let mut pools = self.pools.lock().unwrap_or_else(|e| e.into_inner());
        pools.entry(app.to_string()).or_default().push(pool);
    }

    /// Number of pools currently registered for an app
    pub fn pool_count(&self, app: &str) -> usize {
        let pools = self.pools.lock().unwrap_or_else(|e| e.into_inner());
        pools.get(app).map(Vec::len).unwrap_or(0)
    }

    /// Drain every pool registered for an app.
    ///
    /// Individual pool failures are logged and counted, never returned as
    /// an error; shutdown is best-effort cleanup. An app with no pools is
    /// a logged no-op.
    pub async fn drain(&self, app: &str) -> Result<ShutdownReport, ConfigError> {
        if app.is_empty() {
            return Err(ConfigError::MissingApp);
        }

        let drained: Vec<Arc<WorkerPool>> = {
            let mut pools = self.pools.lock().unwrap_or_else(|e| e.into_inner());
            pools.remove(app).unwrap_or_default()
        };

        if drained.is_empty() {
            tracing::info!(app = %app, "no worker pools to shut down");
            return Ok(ShutdownReport::default());
        }

        let mut report = ShutdownReport {
            pools: drained.len(),
            failures: 0,
        };
        for pool in &drained {
            if let Err(e) = pool.shutdown().await {
                tracing::error!(app = %app, stage = %pool.stage_id(), error = %e, "pool shutdown failed");
                report.failures += 1;
            }
        }
        tracing::info!(
            app = %app,
            pools = report.pools,
            failures = report.failures,
            "worker pools shut down"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
