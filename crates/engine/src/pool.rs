// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker pool: the dequeue-and-process engine for one stage
//!
//! Each pool runs up to the stage's worker count of concurrent handler
//! invocations. Workers claim pending jobs atomically through the store,
//! so a job claimed by one worker is never delivered to another in the
//! same pool. A handler that neither resolves nor rejects within the
//! stage timeout counts as a failure; failures are retried until the
//! stage's retry budget is exhausted, then the job goes terminal.

use crate::handler::{StageHandler, StageOutcome};
use jobflow_core::stage::Stage;
use jobflow_core::status::WfStatus;
use jobflow_store::{JobStore, JobUpdate};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("worker panicked: {0}")]
    WorkerPanic(String),
}

struct WorkerCtx {
    store: Arc<dyn JobStore>,
    app: String,
    job_type: String,
    stage: Stage,
    handler: Arc<dyn StageHandler>,
    poll_interval: Duration,
}

/// Concurrent processor for one (pipeline, stage) pair
pub struct WorkerPool {
    stage_id: String,
    app: String,
    shutdown_tx: watch::Sender<bool>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Spawn the stage's workers and return the pool handle
    pub fn spawn(
        store: Arc<dyn JobStore>,
        app: &str,
        job_type: &str,
        stage: Stage,
        handler: Arc<dyn StageHandler>,
        poll_interval: Duration,
    ) -> Arc<Self> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let ctx = Arc::new(WorkerCtx {
            store,
            app: app.to_string(),
            job_type: job_type.to_string(),
            stage: stage.clone(),
            handler,
            poll_interval,
        });

        let workers = (0..stage.workers)
            .map(|_| {
                let ctx = Arc::clone(&ctx);
                let rx = shutdown_rx.clone();
                tokio::spawn(worker_loop(ctx, rx))
            })
            .collect();

        tracing::info!(
            app = %app,
            job_type = %job_type,
            stage = %stage.id,
            workers = stage.workers,
            "worker pool started"
        );

        Arc::new(Self {
            stage_id: stage.id,
            app: app.to_string(),
            shutdown_tx,
            workers: Mutex::new(workers),
        })
    }

    pub fn stage_id(&self) -> &str {
        &self.stage_id
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    /// Signal all workers and wait for them to settle. Idempotent.
    pub async fn shutdown(&self) -> Result<(), PoolError> {
        let _ = self.shutdown_tx.send(true);
        let handles: Vec<JoinHandle<()>> = {
            let mut workers = self.workers.lock().unwrap_or_else(|e| e.into_inner());
            workers.drain(..).collect()
        };
        let mut first_panic = None;
        for handle in handles {
            if let Err(e) = handle.await {
                first_panic.get_or_insert_with(|| e.to_string());
            }
        }
        match first_panic {
            Some(msg) => Err(PoolError::WorkerPanic(msg)),
            None => Ok(()),
        }
    }
}

async fn worker_loop(ctx: Arc<WorkerCtx>, mut shutdown_rx: watch::Receiver<bool>) {
    let worker_id = uuid::Uuid::new_v4();
    loop {
        if *shutdown_rx.borrow() {
            break;
        }
        let claimed = ctx
            .store
            .claim_next(
                &ctx.app,
                &ctx.job_type,
                &ctx.stage.start_state,
                &ctx.stage.in_progress_state,
                ctx.stage.progress_status(),
            )
            .await;

        match claimed {
            Ok(Some((key, job))) => {
                tracing::debug!(worker = %worker_id, stage = %ctx.stage.id, key = %key, "job claimed");
                process_one(&ctx, &key, job).await;
            }
            Ok(None) => {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = sleep(ctx.poll_interval) => {}
                }
            }
            Err(e) => {
                tracing::error!(worker = %worker_id, stage = %ctx.stage.id, error = %e, "claim failed");
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = sleep(ctx.poll_interval) => {}
                }
            }
        }
    }
}

async fn process_one(ctx: &WorkerCtx, key: &str, job: jobflow_core::job::JobRecord) {
    let attempts = job.meta.attempts;
    let outcome = match timeout(ctx.stage.timeout, ctx.handler.process(job)).await {
        Ok(outcome) => outcome,
        Err(_) => StageOutcome::Reject(format!(
            "handler timed out after {}s",
            ctx.stage.timeout.as_secs()
        )),
    };

    let update = match outcome {
        StageOutcome::Resolve(patch) => {
            tracing::info!(stage = %ctx.stage.id, key = %key, "stage resolved");
            // fresh retry budget for the next stage
            let mut update = JobUpdate::state(&ctx.stage.finished_state).with_attempts(0);
            if ctx.stage.terminal {
                update = update.with_status(WfStatus::Succeeded);
            }
            if let Some(patch) = patch {
                update = update.with_patch(patch);
            }
            update
        }
        StageOutcome::Reject(reason) => {
            let attempts = attempts + 1;
            if attempts > ctx.stage.retries {
                tracing::error!(
                    stage = %ctx.stage.id,
                    key = %key,
                    attempts,
                    reason = %reason,
                    "stage failed permanently"
                );
                JobUpdate::state(&ctx.stage.error_state)
                    .with_status(WfStatus::Failed)
                    .with_attempts(attempts)
            } else {
                tracing::warn!(
                    stage = %ctx.stage.id,
                    key = %key,
                    attempts,
                    reason = %reason,
                    "stage failed, requeueing"
                );
                JobUpdate::state(&ctx.stage.start_state).with_attempts(attempts)
            }
        }
    };

    if let Err(e) = ctx
        .store
        .update_job(&ctx.app, &ctx.job_type, key, update)
        .await
    {
        tracing::error!(stage = %ctx.stage.id, key = %key, error = %e, "job update failed");
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
