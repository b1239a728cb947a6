// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for configuration and payload validation

use thiserror::Error;

/// Configuration errors: synchronous, fatal to the call, never retried
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("please provide a valid app")]
    MissingApp,
    #[error("please provide a job type")]
    MissingJobType,
    #[error("duplicate stage id: {0}")]
    DuplicateStage(String),
    #[error("stage '{0}' must have at least one worker")]
    ZeroWorkers(String),
    #[error("start state override is only valid on the entry stage: {0}")]
    StartStateNotOnEntry(String),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Payload validation errors: fatal to `add`
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("job payload must be a JSON object")]
    NotAnObject,
    #[error("payload field '{0}' collides with a reserved bookkeeping field")]
    ReservedField(String),
}
