// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow event handlers
//!
//! An explicit, enumerated configuration structure instead of ad hoc
//! function-or-absent fields: each slot is an `Option` over a shared
//! callback.

use jobflow_core::job::JobRecord;
use jobflow_core::status::WfStatus;
use jobflow_store::TasksRef;
use std::sync::Arc;

/// Called once, out-of-band, when a workflow is constructed
pub type InitHandler = Arc<dyn Fn(TasksRef) + Send + Sync>;

/// Called with `(status, record)` on every observed status write
pub type StatusHandler = Arc<dyn Fn(WfStatus, JobRecord) + Send + Sync>;

/// Optional workflow-level event handlers
#[derive(Clone, Default)]
pub struct EventHandlers {
    pub on_init: Option<InitHandler>,
    pub on_status_change: Option<StatusHandler>,
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_init(mut self, f: impl Fn(TasksRef) + Send + Sync + 'static) -> Self {
        self.on_init = Some(Arc::new(f));
        self
    }

    pub fn on_status_change(
        mut self,
        f: impl Fn(WfStatus, JobRecord) + Send + Sync + 'static,
    ) -> Self {
        self.on_status_change = Some(Arc::new(f));
        self
    }
}

impl std::fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHandlers")
            .field("on_init", &self.on_init.is_some())
            .field("on_status_change", &self.on_status_change.is_some())
            .finish()
    }
}
