// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch-queue task model.
//!
//! An [`AutomationTask`] is one unit of queue work — typically a whole
//! form traversal, though the queue is agnostic to what a task does.
//! The queue is the single writer of task status; every transition is
//! mirrored into an immutable [`ExecutionLogEntry`].

use crate::TaskId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Priority band for queue ordering. Strict priority order; FIFO by
/// enqueue time within a band.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

crate::simple_display! {
    Priority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
}

/// Status of a task through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting for a worker (or for its backoff delay to elapse)
    Queued,
    /// Picked up by a worker
    Running,
    /// Terminal: completed successfully
    Succeeded,
    /// Terminal: failed structurally, retrying cannot help
    Failed,
    /// Terminal from the queue's perspective: automated retries
    /// exhausted, waiting on an operator
    NeedsHuman,
    /// Terminal: cancelled between attempts
    Cancelled,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Succeeded
                | TaskStatus::Failed
                | TaskStatus::NeedsHuman
                | TaskStatus::Cancelled
        )
    }
}

crate::simple_display! {
    TaskStatus {
        Queued => "queued",
        Running => "running",
        Succeeded => "succeeded",
        Failed => "failed",
        NeedsHuman => "needs_human",
        Cancelled => "cancelled",
    }
}

/// Retry classification for a task failure.
///
/// Transient failures (actuation flakiness, timeouts) are retried with
/// backoff; structural failures (bad input, malformed navigation
/// rules) reproduce deterministically, so retrying cannot help.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskErrorKind {
    Transient,
    Structural,
}

crate::simple_display! {
    TaskErrorKind {
        Transient => "transient",
        Structural => "structural",
    }
}

/// A classified task failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind} failure: {message}")]
pub struct TaskError {
    pub kind: TaskErrorKind,
    pub message: String,
}

impl TaskError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self { kind: TaskErrorKind::Transient, message: message.into() }
    }

    pub fn structural(message: impl Into<String>) -> Self {
        Self { kind: TaskErrorKind::Structural, message: message.into() }
    }
}

/// One unit of dispatch-queue work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationTask {
    pub id: TaskId,
    pub priority: Priority,
    pub status: TaskStatus,
    /// Number of attempts started so far.
    pub attempt: u32,
    pub max_attempts: u32,
    /// Earliest epoch-ms at which a worker may pick this task up.
    pub next_eligible_at_ms: u64,
    /// Free-form payload interpreted by the task runner.
    pub payload: serde_json::Value,
    /// Foreign reference to the triggering business event (e.g. a
    /// payment), carried for the surrounding CRM tooling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub enqueued_at_ms: u64,
    /// Monotonic enqueue sequence; FIFO tie-break within a priority band.
    pub enqueued_seq: u64,
}

impl AutomationTask {
    /// Whether a worker may pick this task up at `now_ms`.
    pub fn is_eligible(&self, now_ms: u64) -> bool {
        self.status == TaskStatus::Queued && self.next_eligible_at_ms <= now_ms
    }
}

/// Immutable record of one task status transition.
///
/// The append-only log of these entries is the queue's audit trail,
/// independent of the per-page [`RunOutcome`](crate::RunOutcome) trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionLogEntry {
    pub task_id: TaskId,
    pub from: TaskStatus,
    pub to: TaskStatus,
    pub reason: String,
    pub at_ms: u64,
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
