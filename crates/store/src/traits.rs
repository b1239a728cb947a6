// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store collaborator contract
//!
//! The capability surface the orchestrator requires from the backing
//! store, scoped by `(app, type)`. The orchestrator never retries store
//! operations; errors propagate unchanged to the caller.

use async_trait::async_trait;
use jobflow_core::job::{JobRecord, MirrorRecord};
use jobflow_core::keys::index_key;
use jobflow_core::status::WfStatus;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::mpsc;

/// Receiver of status values for one watched job
pub type StatusFeed = mpsc::UnboundedReceiver<WfStatus>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {path}")]
    NotFound { path: String },
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A partial mutation of one canonical job record.
///
/// A `status` write is the only mutation that notifies status watchers;
/// it also recomputes the composite `__wfindex__` value when the record
/// carries an index prefix.
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    pub state: Option<String>,
    pub status: Option<WfStatus>,
    pub attempts: Option<u32>,
    pub patch: Option<Map<String, Value>>,
}

impl JobUpdate {
    pub fn state(state: impl Into<String>) -> Self {
        Self {
            state: Some(state.into()),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: WfStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }

    pub fn with_patch(mut self, patch: Map<String, Value>) -> Self {
        self.patch = Some(patch);
        self
    }

    /// Apply this update to a record in place
    pub fn apply(self, record: &mut JobRecord) {
        if let Some(state) = self.state {
            record.meta.state = state;
        }
        if let Some(attempts) = self.attempts {
            record.meta.attempts = attempts;
        }
        if let Some(patch) = self.patch {
            record.apply_patch(patch);
        }
        if let Some(status) = self.status {
            record.meta.status = status;
            if record.meta.status_index.is_some() {
                record.meta.status_index =
                    Some(index_key(&record.meta.user, status, None, None) + &suffix(record));
            }
        }
    }
}

// The composite index ends with the caller-supplied prefix; status changes
// rewrite only the owner/status head.
fn suffix(record: &JobRecord) -> String {
    match &record.meta.index {
        Some(prefix) if !prefix.is_empty() => format!(":{}", prefix),
        _ => String::new(),
    }
}

/// Equality/prefix query over jobs of one `(app, type)` pipeline
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub app: String,
    pub job_type: String,
    pub user: Option<String>,
    pub status: Option<WfStatus>,
    pub index_id: Option<String>,
    pub index_field: Option<String>,
}

impl TaskFilter {
    pub fn new(app: impl Into<String>, job_type: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            job_type: job_type.into(),
            ..Self::default()
        }
    }

    /// Composite-index prefix for this filter, when one is derivable
    /// (requires at least owner and status).
    pub fn index_prefix(&self) -> Option<String> {
        let user = self.user.as_deref()?;
        let status = self.status?;
        Some(index_key(
            user,
            status,
            self.index_id.as_deref(),
            self.index_field.as_deref(),
        ))
    }
}

/// Store operations consumed by the orchestrator
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Generate a unique ordered child key, usable before any write
    fn new_key(&self) -> String;

    /// Write a canonical job record under `(app, type, key)`
    async fn put_job(
        &self,
        app: &str,
        job_type: &str,
        key: &str,
        record: &JobRecord,
    ) -> Result<(), StoreError>;

    /// Read one canonical job record
    async fn job(
        &self,
        app: &str,
        job_type: &str,
        key: &str,
    ) -> Result<Option<JobRecord>, StoreError>;

    /// Merge a partial update into one canonical record
    async fn update_job(
        &self,
        app: &str,
        job_type: &str,
        key: &str,
        update: JobUpdate,
    ) -> Result<(), StoreError>;

    /// Atomically claim the first job whose `_state` equals `from_state`,
    /// moving it to `to_state` with the given progress status. A job
    /// claimed by one worker is never delivered to another.
    async fn claim_next(
        &self,
        app: &str,
        job_type: &str,
        from_state: &str,
        to_state: &str,
        status: WfStatus,
    ) -> Result<Option<(String, JobRecord)>, StoreError>;

    /// Write an owner-mirror record under the owner's collection
    async fn put_mirror(
        &self,
        user: &str,
        key: &str,
        record: &MirrorRecord,
    ) -> Result<(), StoreError>;

    /// All mirror records for one owner, in key order
    async fn mirrors(&self, user: &str) -> Result<Vec<(String, MirrorRecord)>, StoreError>;

    /// Jobs matching an equality/prefix filter, in key order.
    ///
    /// A filter naming both owner and status is answered from the
    /// composite `__wfindex__` value and therefore only matches jobs
    /// submitted with index options; other filters scan record fields.
    async fn query(&self, filter: &TaskFilter) -> Result<Vec<(String, JobRecord)>, StoreError>;

    /// Subscribe to one job's status field. The current value (if the job
    /// exists) is delivered immediately; every subsequent status write
    /// follows. Dropping the receiver unsubscribes.
    async fn watch_status(&self, app: &str, job_type: &str, key: &str) -> StatusFeed;
}
