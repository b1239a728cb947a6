// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! jobflow-engine: the pipeline orchestrator
//!
//! A [`Runtime`] composes a store with a pool registry; workflows built
//! through it define stage pipelines, accept jobs, attach stage handlers
//! backed by worker pools, and surface status changes to observers.

pub mod error;
pub mod events;
pub mod handler;
pub mod pool;
pub mod registry;
pub mod runtime;
pub mod watch;
pub mod workflow;

pub use error::WorkflowError;
pub use events::{EventHandlers, InitHandler, StatusHandler};
pub use handler::{stage_fn, FnHandler, StageHandler, StageOutcome};
pub use pool::WorkerPool;
pub use registry::{PoolRegistry, ShutdownReport};
pub use runtime::Runtime;
pub use watch::StatusWatch;
pub use workflow::{AddOptions, JobHandle, Workflow};
