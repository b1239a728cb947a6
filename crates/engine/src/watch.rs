// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status watch
//!
//! Observes one job's status field and invokes a handler with
//! `(status, record)` for every emitted value. Each invocation runs on a
//! detached task so a slow handler cannot block later notifications. The
//! watch unsubscribes itself exactly once, on the first terminal status;
//! a job that never terminates keeps its watch for the process lifetime.

use crate::events::StatusHandler;
use jobflow_store::JobRef;
use tokio::task::JoinHandle;

/// A spawned observer of one job's status
pub struct StatusWatch {
    handle: JoinHandle<()>,
}

impl StatusWatch {
    /// Subscribe to the job's status feed and dispatch to the handler
    pub fn spawn(job: JobRef, handler: StatusHandler) -> Self {
        let handle = tokio::spawn(async move {
            let mut feed = job.watch_status().await;
            while let Some(status) = feed.recv().await {
                match job.get().await {
                    Ok(Some(record)) => {
                        let handler = handler.clone();
                        tokio::spawn(async move { handler(status, record) });
                    }
                    Ok(None) => {
                        tracing::debug!(key = %job.key(), "watched job missing, skipping notification");
                    }
                    Err(e) => {
                        tracing::warn!(key = %job.key(), error = %e, "status watch read failed");
                    }
                }
                if status.is_terminal() {
                    // dropping the feed unsubscribes
                    break;
                }
            }
        });
        Self { handle }
    }

    /// Whether the watch task has finished (reached a terminal status)
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
