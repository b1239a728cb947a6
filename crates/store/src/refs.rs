// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed references into the store
//!
//! Thin scoped handles over a shared [`JobStore`]: a [`TasksRef`] is one
//! pipeline's job collection, a [`JobRef`] one job inside it. These are
//! the handles the orchestrator hands out (to `on_init` callbacks and
//! from `add`).

use crate::traits::{JobStore, JobUpdate, StatusFeed, StoreError};
use jobflow_core::job::JobRecord;
use std::sync::Arc;

/// Reference to one pipeline's job collection
#[derive(Clone)]
pub struct TasksRef {
    store: Arc<dyn JobStore>,
    app: String,
    job_type: String,
}

impl TasksRef {
    pub fn new(store: Arc<dyn JobStore>, app: impl Into<String>, job_type: impl Into<String>) -> Self {
        Self {
            store,
            app: app.into(),
            job_type: job_type.into(),
        }
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    pub fn job_type(&self) -> &str {
        &self.job_type
    }

    /// Write a record under a freshly generated ordered key
    pub async fn push(&self, record: &JobRecord) -> Result<JobRef, StoreError> {
        let key = self.store.new_key();
        self.store
            .put_job(&self.app, &self.job_type, &key, record)
            .await?;
        Ok(self.job_ref(key))
    }

    /// Handle to one job in this collection
    pub fn job_ref(&self, key: impl Into<String>) -> JobRef {
        JobRef {
            store: Arc::clone(&self.store),
            app: self.app.clone(),
            job_type: self.job_type.clone(),
            key: key.into(),
        }
    }

    /// Single read of one job
    pub async fn job(&self, key: &str) -> Result<Option<JobRecord>, StoreError> {
        self.store.job(&self.app, &self.job_type, key).await
    }
}

impl std::fmt::Debug for TasksRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TasksRef")
            .field("app", &self.app)
            .field("job_type", &self.job_type)
            .finish()
    }
}

/// Reference to one canonical job record
#[derive(Clone)]
pub struct JobRef {
    store: Arc<dyn JobStore>,
    app: String,
    job_type: String,
    key: String,
}

impl JobRef {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Single read of the current record
    pub async fn get(&self) -> Result<Option<JobRecord>, StoreError> {
        self.store.job(&self.app, &self.job_type, &self.key).await
    }

    /// Merge a partial update into the record
    pub async fn update(&self, update: JobUpdate) -> Result<(), StoreError> {
        self.store
            .update_job(&self.app, &self.job_type, &self.key, update)
            .await
    }

    /// Subscribe to the job's status field
    pub async fn watch_status(&self) -> StatusFeed {
        self.store
            .watch_status(&self.app, &self.job_type, &self.key)
            .await
    }
}

impl std::fmt::Debug for JobRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRef")
            .field("app", &self.app)
            .field("job_type", &self.job_type)
            .field("key", &self.key)
            .finish()
    }
}

#[cfg(test)]
#[path = "refs_tests.rs"]
mod tests;
