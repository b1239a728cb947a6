// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow: the public pipeline façade
//!
//! A workflow is one `(app, type)` pipeline: it validates its
//! configuration, owns the stage graph, creates jobs, attaches stage
//! handlers backed by worker pools, and wires status observers. The
//! orchestrator writes a job only at creation; afterwards the worker
//! pools own every mutation and the orchestrator just observes.

use crate::error::WorkflowError;
use crate::events::EventHandlers;
use crate::handler::StageHandler;
use crate::pool::WorkerPool;
use crate::registry::PoolRegistry;
use crate::watch::StatusWatch;
use jobflow_core::config::WorkflowConfig;
use jobflow_core::job::{validate_payload, JobMeta, JobRecord};
use jobflow_core::keys::{index_key, index_prefix};
use jobflow_core::stage::StageGraph;
use jobflow_core::status::WfStatus;
use jobflow_store::{JobRef, JobStore, TaskFilter, TasksRef};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;

/// Transform deriving the job's `__display__` view from its payload
pub type DisplayFn = Arc<dyn Fn(&Map<String, Value>) -> Value + Send + Sync>;

/// Per-call options for `Workflow::add`
#[derive(Clone, Default)]
pub struct AddOptions {
    pub index_id: Option<String>,
    pub index_field: Option<String>,
    /// Per-call handlers; a status handler here overrides the
    /// workflow-level default
    pub handlers: EventHandlers,
}

impl AddOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index_id(mut self, id: impl Into<String>) -> Self {
        self.index_id = Some(id.into());
        self
    }

    pub fn with_index_field(mut self, field: impl Into<String>) -> Self {
        self.index_field = Some(field.into());
        self
    }

    pub fn with_handlers(mut self, handlers: EventHandlers) -> Self {
        self.handlers = handlers;
        self
    }
}

/// Identifier triple returned once a job's canonical write completes
#[derive(Clone, Debug)]
pub struct JobHandle {
    /// Canonical job key
    pub id: String,
    /// Owner-mirror key
    pub mirror_key: String,
    /// Handle to the canonical record
    pub job: JobRef,
}

/// One `(app, type)` pipeline
pub struct Workflow {
    app: String,
    job_type: String,
    graph: StageGraph,
    store: Arc<dyn JobStore>,
    registry: PoolRegistry,
    handlers: EventHandlers,
    display: Option<DisplayFn>,
    poll_interval: Duration,
}

impl std::fmt::Debug for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("app", &self.app)
            .field("job_type", &self.job_type)
            .finish_non_exhaustive()
    }
}

impl Workflow {
    /// Build a workflow; called through `Runtime::workflow`.
    ///
    /// Validates identifiers, builds the stage graph and, if configured,
    /// schedules `on_init` on a detached task with a reference scoped to
    /// this pipeline so construction never blocks on user code.
    pub(crate) fn new(
        store: Arc<dyn JobStore>,
        registry: PoolRegistry,
        config: WorkflowConfig,
        handlers: EventHandlers,
        poll_interval: Duration,
    ) -> Result<Self, WorkflowError> {
        config.validate()?;
        let graph = StageGraph::build(&config.job_type, &config.stages, &config.defaults)?;

        let workflow = Self {
            app: config.app,
            job_type: config.job_type,
            graph,
            store,
            registry,
            handlers,
            display: None,
            poll_interval,
        };

        if let Some(init) = workflow.handlers.on_init.clone() {
            let tasks = workflow.tasks_ref();
            tokio::spawn(async move { init(tasks) });
        }

        Ok(workflow)
    }

    /// Set the `__display__` input transform
    pub fn with_display(mut self, f: impl Fn(&Map<String, Value>) -> Value + Send + Sync + 'static) -> Self {
        self.display = Some(Arc::new(f));
        self
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    pub fn job_type(&self) -> &str {
        &self.job_type
    }

    pub fn stages(&self) -> &StageGraph {
        &self.graph
    }

    /// Reference to this pipeline's job collection
    pub fn tasks_ref(&self) -> TasksRef {
        TasksRef::new(Arc::clone(&self.store), &self.app, &self.job_type)
    }

    /// Attach processing logic to a stage, spawning its worker pool
    pub fn on(&self, stage_id: &str, handler: Arc<dyn StageHandler>) -> Result<(), WorkflowError> {
        let stage = self
            .graph
            .stage(stage_id)
            .ok_or_else(|| WorkflowError::UnknownStage(stage_id.to_string()))?;

        let pool = WorkerPool::spawn(
            Arc::clone(&self.store),
            &self.app,
            &self.job_type,
            stage.clone(),
            handler,
            self.poll_interval,
        );
        self.registry.register(&self.app, pool);
        Ok(())
    }

    /// Submit a job.
    ///
    /// Resolves once the canonical write completes. The owner-mirror
    /// write and any status-watch registration proceed without the
    /// caller waiting for them; a mirror failure is logged, never rolled
    /// back against the canonical record.
    pub async fn add(&self, payload: Value, options: AddOptions) -> Result<JobHandle, WorkflowError> {
        let mut payload = validate_payload(payload)?;
        let (user, userid) = JobRecord::take_owner(&mut payload);

        let display = match &self.display {
            Some(f) => json!({ "input": f(&payload) }),
            None => json!({}),
        };

        let mut meta = JobMeta {
            user,
            userid,
            job_type: self.job_type.clone(),
            app: self.app.clone(),
            display,
            state: self.graph.entry().start_state.clone(),
            status: WfStatus::Created,
            index: None,
            status_index: None,
            attempts: 0,
        };
        if options.index_id.is_some() || options.index_field.is_some() {
            let id = options.index_id.as_deref();
            let field = options.index_field.as_deref();
            meta.index = Some(index_prefix(id, field));
            meta.status_index = Some(index_key(&meta.user, WfStatus::Created, id, field));
        }
        let record = JobRecord { meta, payload };

        let job = self.tasks_ref().push(&record).await?;

        let mirror = record.to_mirror(job.key());
        let mirror_key = self.store.new_key();
        let store = Arc::clone(&self.store);
        let owner = record.meta.user.clone();
        let key = mirror_key.clone();
        tokio::spawn(async move {
            if let Err(e) = store.put_mirror(&owner, &key, &mirror).await {
                tracing::warn!(user = %owner, key = %key, error = %e, "owner mirror write failed");
            }
        });

        let status_handler = options
            .handlers
            .on_status_change
            .or_else(|| self.handlers.on_status_change.clone());
        if let Some(handler) = status_handler {
            StatusWatch::spawn(job.clone(), handler);
        }

        tracing::info!(
            app = %self.app,
            job_type = %self.job_type,
            key = %job.key(),
            "job created"
        );

        Ok(JobHandle {
            id: job.key().to_string(),
            mirror_key,
            job,
        })
    }

    /// Jobs matching an equality/prefix filter, scoped to this pipeline
    pub async fn filtered_tasks(
        &self,
        mut filter: TaskFilter,
    ) -> Result<Vec<(String, JobRecord)>, WorkflowError> {
        filter.app = self.app.clone();
        filter.job_type = self.job_type.clone();
        Ok(self.store.query(&filter).await?)
    }

    /// Single read of one job's current record
    pub async fn job_data(&self, key: &str) -> Result<Option<JobRecord>, WorkflowError> {
        Ok(self.store.job(&self.app, &self.job_type, key).await?)
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
