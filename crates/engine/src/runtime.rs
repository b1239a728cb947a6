// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime: the process-level composition root
//!
//! Owns the store handle and the pool registry and builds workflows
//! against them. Passing the runtime (or clones of it) around replaces
//! any ambient global state: a workflow cannot exist without a runtime,
//! so use-before-initialization is unrepresentable.

use crate::error::WorkflowError;
use crate::events::EventHandlers;
use crate::registry::{PoolRegistry, ShutdownReport};
use crate::workflow::Workflow;
use jobflow_core::config::WorkflowConfig;
use jobflow_store::JobStore;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Composition root for one process's pipelines
#[derive(Clone)]
pub struct Runtime {
    store: Arc<dyn JobStore>,
    registry: PoolRegistry,
    poll_interval: Duration,
}

impl Runtime {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self {
            store,
            registry: PoolRegistry::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override how often idle workers poll for pending jobs
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    pub fn registry(&self) -> &PoolRegistry {
        &self.registry
    }

    /// Build a workflow for one `(app, type)` pipeline
    pub fn workflow(
        &self,
        config: WorkflowConfig,
        handlers: EventHandlers,
    ) -> Result<Workflow, WorkflowError> {
        Workflow::new(
            Arc::clone(&self.store),
            self.registry.clone(),
            config,
            handlers,
            self.poll_interval,
        )
    }

    /// Drain every worker pool registered for an app
    pub async fn shutdown(&self, app: &str) -> Result<ShutdownReport, WorkflowError> {
        Ok(self.registry.drain(app).await?)
    }
}
