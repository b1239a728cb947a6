// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage definition graph
//!
//! Built once when a workflow is configured, from a declarative list of
//! stage descriptors plus shared defaults. Construction is pure; the graph
//! is immutable afterwards. Stages are chained through their derived
//! `_state` values: a stage picks up jobs sitting in its start state and
//! leaves them in its finished state, which is the next stage's start state.

use crate::config::StageDefaults;
use crate::error::ConfigError;
use crate::status::WfStatus;
use serde::Deserialize;
use std::time::Duration;

/// Declarative descriptor for one pipeline stage
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StageSpec {
    pub id: String,
    /// Handler timeout; falls back to the shared default
    #[serde(default, with = "humantime_serde::option")]
    pub timeout: Option<Duration>,
    /// Retry budget; falls back to the shared default
    #[serde(default)]
    pub retries: Option<u32>,
    /// Worker concurrency; falls back to the shared default
    #[serde(default)]
    pub workers: Option<usize>,
    /// Start state override; only valid on the entry stage
    #[serde(default)]
    pub start_state: Option<String>,
}

impl StageSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// One resolved pipeline stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub id: String,
    pub timeout: Duration,
    pub retries: u32,
    pub workers: usize,
    /// Jobs in this `_state` are pending for the stage
    pub start_state: String,
    pub in_progress_state: String,
    pub finished_state: String,
    pub error_state: String,
    /// Status code written while this stage processes a job
    pub progress: i8,
    /// Whether resolving this stage completes the pipeline
    pub terminal: bool,
}

impl Stage {
    /// Status written when a worker claims a job for this stage
    pub fn progress_status(&self) -> WfStatus {
        WfStatus::Progress(self.progress)
    }
}

/// Ordered, keyed set of stages for one `(app, type)` pipeline
#[derive(Debug, Clone)]
pub struct StageGraph {
    stages: Vec<Stage>,
}

impl StageGraph {
    /// Build the graph from stage descriptors and shared defaults.
    ///
    /// An empty descriptor list yields a single implicit stage whose id is
    /// the pipeline's job type. Fails on duplicate stage ids, zero worker
    /// counts, or a start-state override on a non-entry stage.
    pub fn build(
        job_type: &str,
        specs: &[StageSpec],
        defaults: &StageDefaults,
    ) -> Result<Self, ConfigError> {
        let implicit;
        let specs = if specs.is_empty() {
            implicit = [StageSpec::new(job_type)];
            &implicit[..]
        } else {
            specs
        };

        let mut stages: Vec<Stage> = Vec::with_capacity(specs.len());
        for (pos, spec) in specs.iter().enumerate() {
            if stages.iter().any(|s| s.id == spec.id) {
                return Err(ConfigError::DuplicateStage(spec.id.clone()));
            }
            let workers = spec.workers.unwrap_or(defaults.workers);
            if workers == 0 {
                return Err(ConfigError::ZeroWorkers(spec.id.clone()));
            }
            if pos > 0 && spec.start_state.is_some() {
                return Err(ConfigError::StartStateNotOnEntry(spec.id.clone()));
            }

            let start_state = match (pos, &spec.start_state) {
                (0, Some(state)) => state.clone(),
                (0, None) => format!("{}_pending", spec.id),
                // chained: previous stage's finished state
                _ => stages[pos - 1].finished_state.clone(),
            };

            // Progress codes are 1-based and must stay below the success code.
            let progress = (pos + 1).min(9) as i8;

            stages.push(Stage {
                id: spec.id.clone(),
                timeout: spec.timeout.unwrap_or(defaults.timeout),
                retries: spec.retries.unwrap_or(defaults.retries),
                workers,
                start_state,
                in_progress_state: format!("{}_in_progress", spec.id),
                finished_state: format!("{}_finished", spec.id),
                error_state: format!("{}_error", spec.id),
                progress,
                terminal: pos == specs.len() - 1,
            });
        }

        Ok(Self { stages })
    }

    /// The pipeline's entry stage
    pub fn entry(&self) -> &Stage {
        // build() never produces an empty graph
        &self.stages[0]
    }

    /// Look up a stage by id
    pub fn stage(&self, id: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == id)
    }

    /// Stages in definition order
    pub fn iter(&self) -> impl Iterator<Item = &Stage> {
        self.stages.iter()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
