// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::audit::MemoryOutcomeSink;
use tempfile::tempdir;
use urs_actuate::FakeActuator;
use urs_core::test_support::no_property_answers;
use urs_core::{FakeClock, Priority, TaskId, TaskStatus};
use urs_discovery::FingerprintStore;

struct Fixture {
    actuator: Arc<FakeActuator>,
    store: Arc<FingerprintStore<FakeClock>>,
    sink: Arc<MemoryOutcomeSink>,
}

fn controller(
    fake: FakeActuator,
    dir: &std::path::Path,
    answers: AnswerMap,
) -> (Fixture, RunController<FakeActuator, FakeClock>) {
    let clock = fake.clock_handle();
    let actuator = Arc::new(fake);
    let store = Arc::new(FingerprintStore::open(dir, clock.clone()).unwrap());
    let sink = Arc::new(MemoryOutcomeSink::new());
    let executor = ActionExecutor::new(actuator.clone(), clock)
        .with_settle(Duration::from_millis(200), Duration::from_millis(50));
    let controller = RunController::new(answers, executor, store.clone(), sink.clone());
    (Fixture { actuator, store, sink }, controller)
}

#[tokio::test]
async fn completes_full_traversal_skipping_property_block() {
    let dir = tempdir().unwrap();
    let (fx, controller) = controller(
        FakeActuator::new(FakeClock::new()),
        dir.path(),
        no_property_answers(),
    );

    let report = controller.run().await.unwrap();

    // 0..=31 then 36..=76: the property block is skipped
    assert_eq!(report.path.len(), 73);
    assert_eq!(report.path.last(), Some(&76));
    for skipped in [32, 33, 34, 35] {
        assert!(!report.path.contains(&skipped));
    }

    // One flushed outcome per visited page, terminal included
    let outcomes = fx.sink.outcomes();
    assert_eq!(outcomes.len(), 73);
    assert!(outcomes.iter().all(|o| o.success));
    assert_eq!(outcomes[0].strategy_used, "labeled-control");
    assert_eq!(outcomes.last().unwrap().strategy_used, "none");

    // Every page the advance landed on was classified; the terminal
    // classification is a duplicate of the last advance's result
    assert_eq!(report.new_pages, 72);
    assert_eq!(fx.store.stats().count, 72);
}

#[tokio::test]
async fn fails_fast_without_required_answers() {
    let dir = tempdir().unwrap();
    let (fx, controller) =
        controller(FakeActuator::new(FakeClock::new()), dir.path(), AnswerMap::new());

    let err = controller.run().await.unwrap_err();

    match err {
        RunError::IncompleteInput(missing) => {
            assert!(missing.contains(&14));
            assert!(missing.contains(&31));
        }
        other => panic!("expected IncompleteInput, got {other}"),
    }
    // Nothing was touched
    assert_eq!(fx.actuator.location_serial(), 0);
    assert!(fx.sink.outcomes().is_empty());
}

#[tokio::test]
async fn stalls_with_partial_trail_when_no_strategy_lands() {
    let dir = tempdir().unwrap();
    let (fx, controller) = controller(
        FakeActuator::new(FakeClock::new()).never_advance(),
        dir.path(),
        no_property_answers(),
    );

    let err = controller.run().await.unwrap_err();

    match err {
        RunError::Stalled { page, last_fingerprint, .. } => {
            assert_eq!(page, 0);
            assert_eq!(last_fingerprint, None);
        }
        other => panic!("expected Stalled, got {other}"),
    }
    // The stall itself was flushed to the trail
    let outcomes = fx.sink.outcomes();
    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].success);
    assert_eq!(outcomes[0].strategy_used, "none");
}

#[tokio::test]
async fn cancellation_is_observed_between_populate_and_advance() {
    let dir = tempdir().unwrap();
    let (fx, controller) = controller(
        FakeActuator::new(FakeClock::new()),
        dir.path(),
        no_property_answers(),
    );
    let cancel = tokio_util::sync::CancellationToken::new();
    cancel.cancel();
    let controller = controller.with_cancel(cancel);

    let err = controller.run().await.unwrap_err();

    assert!(matches!(err, RunError::Cancelled(0)));
    assert_eq!(fx.actuator.location_serial(), 0, "no advance after cancellation");
}

fn task_with_payload(payload: serde_json::Value) -> AutomationTask {
    AutomationTask {
        id: TaskId::new(),
        priority: Priority::Medium,
        status: TaskStatus::Running,
        attempt: 1,
        max_attempts: 3,
        next_eligible_at_ms: 0,
        payload,
        business_ref: None,
        last_error: None,
        enqueued_at_ms: 0,
        enqueued_seq: 0,
    }
}

#[tokio::test]
async fn form_run_runner_executes_a_run_request() {
    let dir = tempdir().unwrap();
    let fake = FakeActuator::new(FakeClock::new());
    let clock = fake.clock_handle();
    let actuator = Arc::new(fake);
    let store = Arc::new(FingerprintStore::open(dir.path(), clock.clone()).unwrap());
    let sink = Arc::new(MemoryOutcomeSink::new());
    let runner = FormRunRunner::new(actuator, store.clone(), clock, sink)
        .with_settle(Duration::from_millis(200), Duration::from_millis(50));

    let payload =
        serde_json::to_value(RunRequest { answers: no_property_answers() }).unwrap();
    runner.run(&task_with_payload(payload)).await.unwrap();

    assert_eq!(store.stats().count, 72);
}

#[tokio::test]
async fn form_run_runner_rejects_malformed_payload_as_structural() {
    let dir = tempdir().unwrap();
    let fake = FakeActuator::new(FakeClock::new());
    let clock = fake.clock_handle();
    let store = Arc::new(FingerprintStore::open(dir.path(), clock.clone()).unwrap());
    let runner = FormRunRunner::new(
        Arc::new(fake),
        store,
        clock,
        Arc::new(MemoryOutcomeSink::new()),
    );

    let err = runner
        .run(&task_with_payload(serde_json::json!({"not": "a run request"})))
        .await
        .unwrap_err();

    assert_eq!(err.kind, urs_core::TaskErrorKind::Structural);
}
