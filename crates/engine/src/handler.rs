// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage processing handlers
//!
//! User code attached to a stage via `Workflow::on`. A handler receives
//! the claimed job record and reports its outcome; advancing state,
//! retrying and failing are the worker pool's business, not the
//! handler's.

use async_trait::async_trait;
use jobflow_core::job::JobRecord;
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;

/// What a handler did with a job
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    /// Stage succeeded; optional payload patch merged into the record
    Resolve(Option<Map<String, Value>>),
    /// Stage failed; retried until the stage's budget runs out
    Reject(String),
}

/// Processing logic for one pipeline stage
#[async_trait]
pub trait StageHandler: Send + Sync {
    async fn process(&self, job: JobRecord) -> StageOutcome;
}

/// Adapter turning an async closure into a [`StageHandler`]
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F, Fut> StageHandler for FnHandler<F>
where
    F: Fn(JobRecord) -> Fut + Send + Sync,
    Fut: Future<Output = StageOutcome> + Send,
{
    async fn process(&self, job: JobRecord) -> StageOutcome {
        (self.0)(job).await
    }
}

/// Wrap an async closure as a shareable stage handler
pub fn stage_fn<F, Fut>(f: F) -> Arc<dyn StageHandler>
where
    F: Fn(JobRecord) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = StageOutcome> + Send + 'static,
{
    Arc::new(FnHandler(f))
}
