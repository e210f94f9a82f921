// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker pool: a small fixed set of workers pulling tasks from
//! the dispatch queue.
//!
//! Each worker runs one task at a time to completion or stall — the
//! bound is external actuator capacity (concurrent browser sessions),
//! not CPU. The loop is an explicit scheduler with cancellation
//! support rather than timer callbacks, so tests drive it
//! deterministically.

use crate::queue::DispatchQueue;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use urs_core::{AutomationTask, Clock, TaskError};

/// Something that can execute one task. A form traversal is one
/// runner among possibly others.
#[async_trait]
pub trait TaskRunner: Send + Sync + 'static {
    async fn run(&self, task: &AutomationTask) -> Result<(), TaskError>;
}

/// Fixed pool of queue workers.
pub struct WorkerPool<C: Clock> {
    queue: Arc<DispatchQueue<C>>,
    runner: Arc<dyn TaskRunner>,
    workers: usize,
    poll_interval: Duration,
    cancel: CancellationToken,
}

impl<C: Clock> WorkerPool<C> {
    pub fn new(queue: Arc<DispatchQueue<C>>, runner: Arc<dyn TaskRunner>, workers: usize) -> Self {
        Self {
            queue,
            runner,
            workers: workers.max(1),
            poll_interval: Duration::from_secs(1),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Token that stops every worker after its current task.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run all workers until cancelled.
    pub async fn run(&self) {
        let mut set = tokio::task::JoinSet::new();
        for n in 0..self.workers {
            let name = format!("worker-{n}");
            let queue = self.queue.clone();
            let runner = self.runner.clone();
            let poll = self.poll_interval;
            let cancel = self.cancel.clone();
            set.spawn(worker_loop(name, queue, runner, poll, cancel));
        }
        while set.join_next().await.is_some() {}
    }
}

async fn worker_loop<C: Clock>(
    name: String,
    queue: Arc<DispatchQueue<C>>,
    runner: Arc<dyn TaskRunner>,
    poll_interval: Duration,
    cancel: CancellationToken,
) {
    loop {
        // Cancellation is checked before picking a task up, never
        // preempting one mid-run.
        if cancel.is_cancelled() {
            break;
        }

        let task = match queue.take_next(&name) {
            Ok(task) => task,
            Err(e) => {
                tracing::warn!(worker = %name, error = %e, "take_next failed");
                None
            }
        };

        match task {
            Some(task) => {
                tracing::debug!(worker = %name, task = %task.id, "task started");
                let outcome = match runner.run(&task).await {
                    Ok(()) => queue.complete(&task.id),
                    Err(err) => queue.fail(&task.id, &err),
                };
                if let Err(e) = outcome {
                    tracing::warn!(worker = %name, task = %task.id, error = %e, "status transition failed");
                }
            }
            None => {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(poll_interval) => {}
                }
            }
        }
    }
    tracing::debug!(worker = %name, "worker stopped");
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
