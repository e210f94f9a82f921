// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dispatch queue: scheduling, retry, and escalation policy for
//! automation tasks.
//!
//! The queue owns the task lifecycle and is the single writer of task
//! status; external tooling reads the persisted table and seeds new
//! rows in `queued` status, but every transition happens here and is
//! mirrored into the append-only execution log.

use indexmap::IndexMap;
use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use urs_core::{
    AutomationTask, Clock, ExecutionLogEntry, Priority, TaskError, TaskErrorKind, TaskId,
    TaskStatus,
};

/// Errors from queue operations.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("unknown task {0}")]
    UnknownTask(TaskId),
    #[error("task {id} is {actual}, expected {expected}")]
    WrongStatus {
        id: TaskId,
        actual: TaskStatus,
        expected: TaskStatus,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Queue tuning knobs.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Attempts before a transiently-failing task escalates.
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub backoff_cap: Duration,
    /// Where to persist the task table for the surrounding tooling
    /// (none = in-memory only).
    pub persist_path: Option<PathBuf>,
    /// Fixed jitter seed for deterministic tests.
    pub jitter_seed: Option<u64>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(30),
            backoff_cap: Duration::from_secs(30 * 60),
            persist_path: None,
            jitter_seed: None,
        }
    }
}

/// On-disk task table consumed by the surrounding CRM tooling.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedTable {
    tasks: Vec<AutomationTask>,
    log: Vec<ExecutionLogEntry>,
}

struct QueueState {
    tasks: IndexMap<TaskId, AutomationTask>,
    log: Vec<ExecutionLogEntry>,
    next_seq: u64,
    rng: SmallRng,
}

/// Prioritized, retryable task queue with human escalation.
pub struct DispatchQueue<C: Clock> {
    config: QueueConfig,
    clock: C,
    state: Mutex<QueueState>,
}

impl<C: Clock> DispatchQueue<C> {
    /// Open the queue, merging any persisted table (externally seeded
    /// rows included).
    pub fn open(config: QueueConfig, clock: C) -> Result<Self, QueueError> {
        let rng = match config.jitter_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let mut state = QueueState { tasks: IndexMap::new(), log: Vec::new(), next_seq: 0, rng };

        if let Some(path) = &config.persist_path {
            if path.exists() {
                let table: PersistedTable = serde_json::from_str(&fs::read_to_string(path)?)?;
                for task in table.tasks {
                    state.next_seq = state.next_seq.max(task.enqueued_seq + 1);
                    state.tasks.insert(task.id.clone(), task);
                }
                state.log = table.log;
                tracing::info!(count = state.tasks.len(), "loaded persisted task table");
            }
        }

        Ok(Self { config, clock, state: Mutex::new(state) })
    }

    /// Add a task. Created `queued` and immediately eligible.
    pub fn enqueue(
        &self,
        payload: serde_json::Value,
        priority: Priority,
    ) -> Result<TaskId, QueueError> {
        self.enqueue_inner(payload, priority, None)
    }

    /// Add a task carrying a reference to the business event that
    /// triggered it.
    pub fn enqueue_for_event(
        &self,
        payload: serde_json::Value,
        priority: Priority,
        business_ref: impl Into<String>,
    ) -> Result<TaskId, QueueError> {
        self.enqueue_inner(payload, priority, Some(business_ref.into()))
    }

    fn enqueue_inner(
        &self,
        payload: serde_json::Value,
        priority: Priority,
        business_ref: Option<String>,
    ) -> Result<TaskId, QueueError> {
        let now = self.clock.epoch_ms();
        let mut state = self.state.lock();
        let seq = state.next_seq;
        state.next_seq += 1;

        let task = AutomationTask {
            id: TaskId::new(),
            priority,
            status: TaskStatus::Queued,
            attempt: 0,
            max_attempts: self.config.max_attempts,
            next_eligible_at_ms: now,
            payload,
            business_ref,
            last_error: None,
            enqueued_at_ms: now,
            enqueued_seq: seq,
        };
        let id = task.id.clone();
        state.log.push(ExecutionLogEntry {
            task_id: id.clone(),
            from: TaskStatus::Queued,
            to: TaskStatus::Queued,
            reason: "enqueued".to_string(),
            at_ms: now,
        });
        state.tasks.insert(id.clone(), task);
        self.persist(&state)?;

        tracing::info!(task = %id, %priority, "task enqueued");
        Ok(id)
    }

    /// Hand the next due task to a worker: highest priority first,
    /// FIFO within a band, honoring backoff eligibility.
    pub fn take_next(&self, worker: &str) -> Result<Option<AutomationTask>, QueueError> {
        let now = self.clock.epoch_ms();
        let mut state = self.state.lock();

        let candidate = state
            .tasks
            .values()
            .filter(|t| t.is_eligible(now))
            .min_by_key(|t| (Reverse(t.priority), t.enqueued_seq))
            .map(|t| t.id.clone());

        let Some(id) = candidate else {
            return Ok(None);
        };

        let (attempt, max_attempts) = {
            let task = state.tasks.get_mut(&id).ok_or_else(|| QueueError::UnknownTask(id.clone()))?;
            task.status = TaskStatus::Running;
            task.attempt += 1;
            (task.attempt, task.max_attempts)
        };
        state.log.push(ExecutionLogEntry {
            task_id: id.clone(),
            from: TaskStatus::Queued,
            to: TaskStatus::Running,
            reason: format!("dispatched to {worker} (attempt {attempt}/{max_attempts})"),
            at_ms: now,
        });
        self.persist(&state)?;

        let task = state.tasks.get(&id).cloned();
        tracing::debug!(task = %id, worker, attempt, "task dispatched");
        Ok(task)
    }

    /// Mark a running task succeeded.
    pub fn complete(&self, id: &TaskId) -> Result<(), QueueError> {
        let now = self.clock.epoch_ms();
        let mut state = self.state.lock();
        Self::expect_status(&state.tasks, id, TaskStatus::Running)?;

        if let Some(task) = state.tasks.get_mut(id) {
            task.status = TaskStatus::Succeeded;
        }
        state.log.push(ExecutionLogEntry {
            task_id: id.clone(),
            from: TaskStatus::Running,
            to: TaskStatus::Succeeded,
            reason: "completed".to_string(),
            at_ms: now,
        });
        self.persist(&state)?;
        tracing::info!(task = %id, "task succeeded");
        Ok(())
    }

    /// Record a running task's failure and apply retry policy.
    ///
    /// Structural failures go straight to `failed` — retrying
    /// reproduces them. Transient failures re-queue with exponential
    /// backoff until attempts are exhausted, at which point the task
    /// escalates to `needs_human` rather than being dropped as failed.
    pub fn fail(&self, id: &TaskId, error: &TaskError) -> Result<(), QueueError> {
        let now = self.clock.epoch_ms();
        let mut guard = self.state.lock();
        let state = &mut *guard;
        Self::expect_status(&state.tasks, id, TaskStatus::Running)?;

        let (to, reason) = {
            let Some(task) = state.tasks.get_mut(id) else {
                return Err(QueueError::UnknownTask(id.clone()));
            };
            task.last_error = Some(error.to_string());
            match error.kind {
                TaskErrorKind::Structural => {
                    task.status = TaskStatus::Failed;
                    (TaskStatus::Failed, error.to_string())
                }
                TaskErrorKind::Transient if task.attempt >= task.max_attempts => {
                    task.status = TaskStatus::NeedsHuman;
                    (
                        TaskStatus::NeedsHuman,
                        format!("automated retries exhausted: {}", error.message),
                    )
                }
                TaskErrorKind::Transient => {
                    task.status = TaskStatus::Queued;
                    let delay = Self::backoff(&self.config, &mut state.rng, task.attempt);
                    task.next_eligible_at_ms = now + delay.as_millis() as u64;
                    (
                        TaskStatus::Queued,
                        format!("retry in {}ms: {}", delay.as_millis(), error.message),
                    )
                }
            }
        };

        state.log.push(ExecutionLogEntry {
            task_id: id.clone(),
            from: TaskStatus::Running,
            to,
            reason: reason.clone(),
            at_ms: now,
        });
        self.persist(&state)?;
        tracing::warn!(task = %id, status = %to, reason = %reason, "task failed");
        Ok(())
    }

    /// Cancel a task between attempts. Only `queued` tasks can be
    /// cancelled — a running controller is never preempted mid-page.
    pub fn cancel(&self, id: &TaskId) -> Result<(), QueueError> {
        let now = self.clock.epoch_ms();
        let mut state = self.state.lock();
        Self::expect_status(&state.tasks, id, TaskStatus::Queued)?;

        if let Some(task) = state.tasks.get_mut(id) {
            task.status = TaskStatus::Cancelled;
        }
        state.log.push(ExecutionLogEntry {
            task_id: id.clone(),
            from: TaskStatus::Queued,
            to: TaskStatus::Cancelled,
            reason: "cancelled between attempts".to_string(),
            at_ms: now,
        });
        self.persist(&state)?;
        tracing::info!(task = %id, "task cancelled");
        Ok(())
    }

    pub fn status(&self, id: &TaskId) -> Result<AutomationTask, QueueError> {
        self.state
            .lock()
            .tasks
            .get(id)
            .cloned()
            .ok_or_else(|| QueueError::UnknownTask(id.clone()))
    }

    /// Tasks in enqueue order, optionally filtered by status.
    pub fn list(&self, filter: Option<TaskStatus>) -> Vec<AutomationTask> {
        self.state
            .lock()
            .tasks
            .values()
            .filter(|t| filter.map_or(true, |f| t.status == f))
            .cloned()
            .collect()
    }

    /// The human hand-off surface: tasks waiting on an operator.
    pub fn needs_human(&self) -> Vec<AutomationTask> {
        self.list(Some(TaskStatus::NeedsHuman))
    }

    /// The append-only transition log.
    pub fn log(&self) -> Vec<ExecutionLogEntry> {
        self.state.lock().log.clone()
    }

    fn expect_status(
        tasks: &IndexMap<TaskId, AutomationTask>,
        id: &TaskId,
        expected: TaskStatus,
    ) -> Result<(), QueueError> {
        let task = tasks.get(id).ok_or_else(|| QueueError::UnknownTask(id.clone()))?;
        if task.status != expected {
            return Err(QueueError::WrongStatus { id: id.clone(), actual: task.status, expected });
        }
        Ok(())
    }

    /// `min(base · 2^attempt + jitter, cap)` with jitter uniform in
    /// `[0, base)`. The cap is applied after the jitter so successive
    /// delays never shrink.
    fn backoff(config: &QueueConfig, rng: &mut SmallRng, attempt: u32) -> Duration {
        let base_ms = config.backoff_base.as_millis() as u64;
        let cap_ms = config.backoff_cap.as_millis() as u64;
        let exponential = base_ms.saturating_mul(1u64 << attempt.min(20));
        let jitter = rng.gen_range(0..base_ms.max(1));
        Duration::from_millis(exponential.saturating_add(jitter).min(cap_ms))
    }

    fn persist(&self, state: &QueueState) -> Result<(), QueueError> {
        let Some(path) = &self.config.persist_path else {
            return Ok(());
        };
        let table = PersistedTable {
            tasks: state.tasks.values().cloned().collect(),
            log: state.log.clone(),
        };
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&table)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
