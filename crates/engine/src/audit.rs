// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Incremental sinks for per-page run outcomes.
//!
//! Outcomes are flushed as they happen, never buffered to the end of a
//! run: a stalled run must still leave a usable partial audit trail.

use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use urs_core::RunOutcome;
use urs_discovery::StorageError;

/// Receives each page outcome as soon as it is known.
pub trait OutcomeSink: Send + Sync {
    fn append(&self, outcome: &RunOutcome) -> Result<(), StorageError>;
}

/// In-memory sink for tests and embedding callers.
#[derive(Default)]
pub struct MemoryOutcomeSink {
    outcomes: Mutex<Vec<RunOutcome>>,
}

impl MemoryOutcomeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcomes(&self) -> Vec<RunOutcome> {
        self.outcomes.lock().clone()
    }
}

impl OutcomeSink for MemoryOutcomeSink {
    fn append(&self, outcome: &RunOutcome) -> Result<(), StorageError> {
        self.outcomes.lock().push(outcome.clone());
        Ok(())
    }
}

/// Appends one JSON line per outcome to a log file, flushed per entry.
pub struct JsonlOutcomeSink {
    file: Mutex<File>,
}

impl JsonlOutcomeSink {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file: Mutex::new(file) })
    }
}

impl OutcomeSink for JsonlOutcomeSink {
    fn append(&self, outcome: &RunOutcome) -> Result<(), StorageError> {
        let mut line = serde_json::to_vec(outcome)?;
        line.push(b'\n');
        let mut file = self.file.lock();
        file.write_all(&line)?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
