// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory store implementation
//!
//! Collections are `BTreeMap`s keyed by ordered push keys, so iteration
//! order is creation order. Claims take the write lock for the whole
//! move, which is what makes them atomic.

use crate::traits::{JobStore, JobUpdate, StatusFeed, StoreError, TaskFilter};
use async_trait::async_trait;
use jobflow_core::job::{JobRecord, MirrorRecord};
use jobflow_core::keygen::{KeyGen, OrderedKeyGen};
use jobflow_core::status::WfStatus;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::mpsc;

type Collection<T> = BTreeMap<String, T>;

struct Inner {
    keygen: Box<dyn KeyGen>,
    jobs: RwLock<HashMap<String, Collection<JobRecord>>>,
    mirrors: RwLock<HashMap<String, Collection<MirrorRecord>>>,
    watchers: Mutex<HashMap<String, Vec<mpsc::UnboundedSender<WfStatus>>>>,
}

/// Shared in-memory job store
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_keygen(Box::new(OrderedKeyGen::new()))
    }

    /// Build with a custom key generator (deterministic keys in tests)
    pub fn with_keygen(keygen: Box<dyn KeyGen>) -> Self {
        Self {
            inner: Arc::new(Inner {
                keygen,
                jobs: RwLock::new(HashMap::new()),
                mirrors: RwLock::new(HashMap::new()),
                watchers: Mutex::new(HashMap::new()),
            }),
        }
    }

    fn collection_path(app: &str, job_type: &str) -> String {
        format!("{}/{}", app, job_type)
    }

    fn job_path(app: &str, job_type: &str, key: &str) -> String {
        format!("{}/{}/{}", app, job_type, key)
    }

    /// Deliver a status value to the job's watchers, pruning closed ones
    fn notify(&self, path: &str, status: WfStatus) {
        let mut watchers = self
            .inner
            .watchers
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if let Some(senders) = watchers.get_mut(path) {
            senders.retain(|tx| tx.send(status).is_ok());
            if senders.is_empty() {
                watchers.remove(path);
            }
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    fn new_key(&self) -> String {
        self.inner.keygen.next()
    }

    async fn put_job(
        &self,
        app: &str,
        job_type: &str,
        key: &str,
        record: &JobRecord,
    ) -> Result<(), StoreError> {
        let mut jobs = self.inner.jobs.write().unwrap_or_else(|e| e.into_inner());
        jobs.entry(Self::collection_path(app, job_type))
            .or_default()
            .insert(key.to_string(), record.clone());
        drop(jobs);
        self.notify(&Self::job_path(app, job_type, key), record.meta.status);
        Ok(())
    }

    async fn job(
        &self,
        app: &str,
        job_type: &str,
        key: &str,
    ) -> Result<Option<JobRecord>, StoreError> {
        let jobs = self.inner.jobs.read().unwrap_or_else(|e| e.into_inner());
        Ok(jobs
            .get(&Self::collection_path(app, job_type))
            .and_then(|c| c.get(key))
            .cloned())
    }

    async fn update_job(
        &self,
        app: &str,
        job_type: &str,
        key: &str,
        update: JobUpdate,
    ) -> Result<(), StoreError> {
        let status = update.status;
        {
            let mut jobs = self.inner.jobs.write().unwrap_or_else(|e| e.into_inner());
            let record = jobs
                .get_mut(&Self::collection_path(app, job_type))
                .and_then(|c| c.get_mut(key))
                .ok_or_else(|| StoreError::NotFound {
                    path: Self::job_path(app, job_type, key),
                })?;
            update.apply(record);
        }
        if let Some(status) = status {
            self.notify(&Self::job_path(app, job_type, key), status);
        }
        Ok(())
    }

    async fn claim_next(
        &self,
        app: &str,
        job_type: &str,
        from_state: &str,
        to_state: &str,
        status: WfStatus,
    ) -> Result<Option<(String, JobRecord)>, StoreError> {
        let claimed = {
            let mut jobs = self.inner.jobs.write().unwrap_or_else(|e| e.into_inner());
            let Some(collection) = jobs.get_mut(&Self::collection_path(app, job_type)) else {
                return Ok(None);
            };
            let Some(key) = collection
                .iter()
                .find(|(_, r)| r.meta.state == from_state)
                .map(|(k, _)| k.clone())
            else {
                return Ok(None);
            };
            // still under the write lock: no other worker can see this job
            let record = collection.get_mut(&key).ok_or_else(|| StoreError::NotFound {
                path: Self::job_path(app, job_type, &key),
            })?;
            record.meta.state = to_state.to_string();
            JobUpdate::default().with_status(status).apply(record);
            (key, record.clone())
        };
        self.notify(&Self::job_path(app, job_type, &claimed.0), status);
        Ok(Some(claimed))
    }

    async fn put_mirror(
        &self,
        user: &str,
        key: &str,
        record: &MirrorRecord,
    ) -> Result<(), StoreError> {
        let mut mirrors = self
            .inner
            .mirrors
            .write()
            .unwrap_or_else(|e| e.into_inner());
        mirrors
            .entry(user.to_string())
            .or_default()
            .insert(key.to_string(), record.clone());
        Ok(())
    }

    async fn mirrors(&self, user: &str) -> Result<Vec<(String, MirrorRecord)>, StoreError> {
        let mirrors = self.inner.mirrors.read().unwrap_or_else(|e| e.into_inner());
        Ok(mirrors
            .get(user)
            .map(|c| c.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    async fn query(&self, filter: &TaskFilter) -> Result<Vec<(String, JobRecord)>, StoreError> {
        let jobs = self.inner.jobs.read().unwrap_or_else(|e| e.into_inner());
        let Some(collection) = jobs.get(&Self::collection_path(&filter.app, &filter.job_type))
        else {
            return Ok(Vec::new());
        };

        // Indexed path: owner + status derive a composite-key prefix and
        // match only jobs that carry a __wfindex__ value.
        if let Some(prefix) = filter.index_prefix() {
            return Ok(collection
                .iter()
                .filter(|(_, r)| {
                    r.meta
                        .status_index
                        .as_deref()
                        .is_some_and(|idx| idx.starts_with(&prefix))
                })
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect());
        }

        Ok(collection
            .iter()
            .filter(|(_, r)| {
                filter.user.as_deref().is_none_or(|u| r.meta.user == u)
                    && filter.status.is_none_or(|s| r.meta.status == s)
                    && filter.index_id.as_deref().is_none_or(|id| {
                        r.meta.index.as_deref().is_some_and(|i| i.starts_with(id))
                    })
                    && filter.index_field.as_deref().is_none_or(|f| {
                        r.meta.index.as_deref().is_some_and(|i| i.ends_with(f))
                    })
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    async fn watch_status(&self, app: &str, job_type: &str, key: &str) -> StatusFeed {
        let (tx, rx) = mpsc::unbounded_channel();
        let current = {
            let jobs = self.inner.jobs.read().unwrap_or_else(|e| e.into_inner());
            jobs.get(&Self::collection_path(app, job_type))
                .and_then(|c| c.get(key))
                .map(|r| r.meta.status)
        };
        if let Some(status) = current {
            let _ = tx.send(status);
        }
        let mut watchers = self
            .inner
            .watchers
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        watchers
            .entry(Self::job_path(app, job_type, key))
            .or_default()
            .push(tx);
        rx
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
