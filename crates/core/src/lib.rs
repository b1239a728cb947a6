// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! jobflow-core: Core library for the jobflow pipeline orchestrator
//!
//! This crate provides:
//! - The job record envelope and lifecycle status codes
//! - Pure key/index derivation utilities
//! - The stage definition graph built from declarative stage specs
//! - Workflow configuration with TOML loading
//! - Ordered key generation

pub mod config;
pub mod error;
pub mod job;
pub mod keygen;
pub mod keys;
pub mod stage;
pub mod status;

// Re-exports
pub use config::{StageDefaults, WorkflowConfig};
pub use error::{ConfigError, ValidationError};
pub use job::{JobMeta, JobRecord, MirrorRecord};
pub use keygen::{KeyGen, OrderedKeyGen, SequentialKeyGen};
pub use stage::{Stage, StageGraph, StageSpec};
pub use status::WfStatus;
