// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the orchestrator

use jobflow_core::error::{ConfigError, ValidationError};
use jobflow_store::StoreError;
use thiserror::Error;

/// Errors surfaced by workflow operations
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("'{0}' is not a registered stage for this pipeline")]
    UnknownStage(String),
}
