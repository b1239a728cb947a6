// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow configuration

use crate::error::ConfigError;
use crate::stage::StageSpec;
use serde::Deserialize;
use std::time::Duration;

/// Shared per-stage defaults, overridable per stage spec
#[derive(Debug, Clone, Deserialize)]
pub struct StageDefaults {
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_retries() -> u32 {
    3
}

fn default_workers() -> usize {
    1
}

impl Default for StageDefaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            retries: default_retries(),
            workers: default_workers(),
        }
    }
}

/// Declarative configuration for one `(app, type)` pipeline
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    pub app: String,
    #[serde(rename = "type")]
    pub job_type: String,
    #[serde(default)]
    pub stages: Vec<StageSpec>,
    #[serde(default)]
    pub defaults: StageDefaults,
}

impl WorkflowConfig {
    pub fn new(app: impl Into<String>, job_type: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            job_type: job_type.into(),
            stages: Vec::new(),
            defaults: StageDefaults::default(),
        }
    }

    pub fn with_stages(mut self, stages: Vec<StageSpec>) -> Self {
        self.stages = stages;
        self
    }

    pub fn with_defaults(mut self, defaults: StageDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Parse a configuration from TOML
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check identifier validity; called by the orchestrator at construction
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app.is_empty() {
            return Err(ConfigError::MissingApp);
        }
        if self.job_type.is_empty() {
            return Err(ConfigError::MissingJobType);
        }
        Ok(())
    }
}
