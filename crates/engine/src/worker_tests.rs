// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::queue::QueueConfig;
use parking_lot::Mutex;
use urs_core::{FakeClock, Priority, TaskId, TaskStatus};

struct ScriptedRunner {
    ran: Mutex<Vec<TaskId>>,
    result: fn() -> Result<(), TaskError>,
}

impl ScriptedRunner {
    fn succeeding() -> Self {
        Self { ran: Mutex::new(Vec::new()), result: || Ok(()) }
    }

    fn failing_transiently() -> Self {
        Self {
            ran: Mutex::new(Vec::new()),
            result: || Err(TaskError::transient("stalled on page 31")),
        }
    }

    fn failing_structurally() -> Self {
        Self {
            ran: Mutex::new(Vec::new()),
            result: || Err(TaskError::structural("missing answers")),
        }
    }
}

#[async_trait]
impl TaskRunner for ScriptedRunner {
    async fn run(&self, task: &AutomationTask) -> Result<(), TaskError> {
        self.ran.lock().push(task.id.clone());
        (self.result)()
    }
}

fn queue() -> Arc<DispatchQueue<FakeClock>> {
    let config = QueueConfig { max_attempts: 1, jitter_seed: Some(42), ..QueueConfig::default() };
    Arc::new(DispatchQueue::open(config, FakeClock::new()).unwrap())
}

async fn drive(pool: &WorkerPool<FakeClock>, done: impl Fn() -> bool) {
    let cancel = pool.cancellation_token();
    let run = pool.run();
    tokio::pin!(run);
    let wait = async {
        while !done() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        cancel.cancel();
    };
    tokio::join!(run, wait);
}

#[tokio::test(start_paused = true)]
async fn pool_drains_tasks_in_order() {
    let queue = queue();
    queue.enqueue(serde_json::json!({"n": 1}), Priority::Low).unwrap();
    queue.enqueue(serde_json::json!({"n": 2}), Priority::High).unwrap();
    queue.enqueue(serde_json::json!({"n": 3}), Priority::High).unwrap();

    let runner = Arc::new(ScriptedRunner::succeeding());
    let pool = WorkerPool::new(queue.clone(), runner.clone(), 1)
        .with_poll_interval(Duration::from_millis(10));

    drive(&pool, || queue.list(Some(TaskStatus::Succeeded)).len() == 3).await;

    assert_eq!(runner.ran.lock().len(), 3);
    assert_eq!(queue.list(Some(TaskStatus::Succeeded)).len(), 3);
}

#[tokio::test(start_paused = true)]
async fn transient_runner_failure_escalates_when_attempts_are_spent() {
    let queue = queue();
    let id = queue.enqueue(serde_json::json!({}), Priority::Medium).unwrap();

    let runner = Arc::new(ScriptedRunner::failing_transiently());
    let pool = WorkerPool::new(queue.clone(), runner, 1)
        .with_poll_interval(Duration::from_millis(10));

    drive(&pool, || !queue.needs_human().is_empty()).await;

    let task = queue.status(&id).unwrap();
    assert_eq!(task.status, TaskStatus::NeedsHuman);
    assert!(task.last_error.unwrap().contains("stalled on page 31"));
}

#[tokio::test(start_paused = true)]
async fn structural_runner_failure_fails_the_task() {
    let queue = queue();
    let id = queue.enqueue(serde_json::json!({}), Priority::Medium).unwrap();

    let runner = Arc::new(ScriptedRunner::failing_structurally());
    let pool = WorkerPool::new(queue.clone(), runner, 1)
        .with_poll_interval(Duration::from_millis(10));

    drive(&pool, || !queue.list(Some(TaskStatus::Failed)).is_empty()).await;

    assert_eq!(queue.status(&id).unwrap().status, TaskStatus::Failed);
}

#[tokio::test(start_paused = true)]
async fn cancelled_pool_leaves_queued_tasks_untouched() {
    let queue = queue();
    let id = queue.enqueue(serde_json::json!({}), Priority::Medium).unwrap();

    let runner = Arc::new(ScriptedRunner::succeeding());
    let pool = WorkerPool::new(queue.clone(), runner.clone(), 2);
    pool.cancellation_token().cancel();
    pool.run().await;

    // Cancellation is honored before pickup
    assert!(runner.ran.lock().is_empty());
    assert_eq!(queue.status(&id).unwrap().status, TaskStatus::Queued);
}
