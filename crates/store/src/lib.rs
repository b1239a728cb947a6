// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! jobflow-store: store collaborator interface and in-memory implementation
//!
//! The orchestrator consumes a shared, hierarchical, key-addressable store
//! through the [`JobStore`] trait: unique ordered child keys, scoped reads
//! and writes, and per-job status subscriptions. [`MemoryStore`] is the
//! in-process implementation used in production single-node deployments
//! and in tests; other backends implement the same trait.

mod memory;
mod refs;
mod traits;

pub use memory::MemoryStore;
pub use refs::{JobRef, TasksRef};
pub use traits::{JobStore, JobUpdate, StatusFeed, StoreError, TaskFilter};
