// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration, loaded from TOML with every knob defaulted.

use crate::queue::QueueConfig;
use crate::run::{RunConfig, DEFAULT_REQUIRED_PAGES};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// All engine tuning in one document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Worker count — bound this by available browser sessions.
    pub workers: usize,
    pub poll_interval_ms: u64,
    /// Per-strategy settle window while advancing a page.
    pub settle_ms: u64,
    pub settle_poll_ms: u64,
    /// Same-page advance retries before a run stalls.
    pub advance_retries: u32,
    /// Task attempts before escalating to a human.
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
    pub backoff_cap_ms: u64,
    /// Consecutive no-discovery runs before the probe heuristic says
    /// stop. Advisory; do not shrink without coverage data.
    pub probe_threshold: u32,
    /// Root of the discovery catalogue (state file + snapshots).
    pub discovery_dir: PathBuf,
    /// Persisted task table for the surrounding tooling.
    pub queue_table: Option<PathBuf>,
    /// Per-page outcome log (JSON lines).
    pub outcome_log: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            poll_interval_ms: 1_000,
            settle_ms: 1_500,
            settle_poll_ms: 150,
            advance_retries: 2,
            max_attempts: 3,
            backoff_base_ms: 30_000,
            backoff_cap_ms: 30 * 60 * 1_000,
            probe_threshold: 10,
            discovery_dir: PathBuf::from("urs-discovery"),
            queue_table: None,
            outcome_log: None,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Ok(toml::from_str(&fs::read_to_string(path)?)?)
    }

    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig {
            max_attempts: self.max_attempts,
            backoff_base: Duration::from_millis(self.backoff_base_ms),
            backoff_cap: Duration::from_millis(self.backoff_cap_ms),
            persist_path: self.queue_table.clone(),
            jitter_seed: None,
        }
    }

    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            advance_retries: self.advance_retries,
            required_pages: DEFAULT_REQUIRED_PAGES.to_vec(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn settle_poll(&self) -> Duration {
        Duration::from_millis(self.settle_poll_ms)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
