// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One end-to-end form traversal.
//!
//! State machine per page: populate → advance → classify, repeated
//! until the navigation graph reports the terminal page (`Complete`)
//! or the executor exhausts its per-page retries (`Stalled`). Every
//! page transition flushes one outcome through the sink immediately.

use crate::audit::OutcomeSink;
use crate::error::RunError;
use crate::worker::TaskRunner;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use urs_actuate::{
    ActionExecutor, ActuateError, Actuator, AdvanceReport, FieldInstruction, FieldKind,
    PageContext, PAGE_SOURCE_SCRIPT,
};
use urs_core::{AnswerMap, AutomationTask, Clock, RunId, RunOutcome, TaskError};
use urs_discovery::{FingerprintStore, PageCapture, Recorded};
use urs_navigator::{has_fields, NavigationGraph};

/// Pages whose answers must be present before a run starts: the
/// pages that drive branching plus the identity block the form
/// refuses to proceed without.
pub const DEFAULT_REQUIRED_PAGES: &[u32] = &[2, 14, 17, 22, 31, 36, 60];

#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Same-page advance retries before the run stalls.
    pub advance_retries: u32,
    pub required_pages: Vec<u32>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { advance_retries: 2, required_pages: DEFAULT_REQUIRED_PAGES.to_vec() }
    }
}

/// Summary of a completed traversal. The page-by-page trail went
/// through the sink as it happened.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: RunId,
    pub path: Vec<u32>,
    pub new_pages: u32,
}

/// Drives one traversal to completion or stall.
///
/// Owns its answer map exclusively; nothing else mutates run state.
/// Strictly sequential — the underlying form must be advanced in
/// order, so there is no per-page concurrency to manage.
pub struct RunController<A: Actuator, C: Clock> {
    run_id: RunId,
    answers: AnswerMap,
    graph: NavigationGraph,
    executor: ActionExecutor<A, C>,
    store: Arc<FingerprintStore<C>>,
    config: RunConfig,
    cancel: CancellationToken,
    sink: Arc<dyn OutcomeSink>,
}

impl<A: Actuator, C: Clock> RunController<A, C> {
    pub fn new(
        answers: AnswerMap,
        executor: ActionExecutor<A, C>,
        store: Arc<FingerprintStore<C>>,
        sink: Arc<dyn OutcomeSink>,
    ) -> Self {
        Self {
            run_id: RunId::new(),
            answers,
            graph: NavigationGraph::standard(),
            executor,
            store,
            config: RunConfig::default(),
            cancel: CancellationToken::new(),
            sink,
        }
    }

    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_graph(mut self, graph: NavigationGraph) -> Self {
        self.graph = graph;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Execute the traversal.
    pub async fn run(&self) -> Result<RunReport, RunError> {
        let missing: Vec<u32> = self
            .config
            .required_pages
            .iter()
            .copied()
            .filter(|page| !self.answers.has_page(*page))
            .collect();
        if !missing.is_empty() {
            return Err(RunError::IncompleteInput(missing));
        }

        tracing::info!(run = %self.run_id, answered_pages = self.answers.len(), "starting traversal");

        let mut path = Vec::new();
        let mut new_pages = 0u32;
        let mut last_fingerprint: Option<String> = None;
        let mut current = 0u32;

        loop {
            path.push(current);
            let decision = self.graph.decide(current, &self.answers);
            if !decision.skipped_pages.is_empty() {
                tracing::info!(
                    page = current,
                    next = ?decision.next_page,
                    skipped = ?decision.skipped_pages,
                    reason = %decision.reason,
                    "branching"
                );
            }

            if has_fields(current) {
                let instructions = self.instructions_for(current);
                self.executor.populate(current, &instructions).await?;
            }

            // Cancellation is honored between populate and advance:
            // never mid-page, never leaving a half-submitted form.
            if self.cancel.is_cancelled() {
                tracing::warn!(run = %self.run_id, page = current, "cancellation observed");
                return Err(RunError::Cancelled(current));
            }

            let Some(next) = decision.next_page else {
                let recorded = self.classify().await?;
                if recorded.is_new() {
                    new_pages += 1;
                }
                self.sink.append(&RunOutcome {
                    page_index: current,
                    fingerprint_hash: recorded.fingerprint().hash.clone(),
                    strategy_used: "none".to_string(),
                    duration_ms: 0,
                    success: true,
                })?;
                break;
            };

            let report = self.advance_with_retries(current, &last_fingerprint).await?;
            let recorded = self.classify().await?;
            if recorded.is_new() {
                new_pages += 1;
            }
            last_fingerprint = Some(recorded.fingerprint().hash.clone());

            self.sink.append(&RunOutcome {
                page_index: current,
                fingerprint_hash: recorded.fingerprint().hash.clone(),
                strategy_used: report.strategy_used,
                duration_ms: report.elapsed_ms,
                success: true,
            })?;

            current = next;
        }

        tracing::info!(run = %self.run_id, pages = path.len(), new_pages, "traversal complete");
        Ok(RunReport { run_id: self.run_id.clone(), path, new_pages })
    }

    async fn advance_with_retries(
        &self,
        page: u32,
        last_fingerprint: &Option<String>,
    ) -> Result<AdvanceReport, RunError> {
        let mut attempts = 0;
        loop {
            let baseline = self.executor.actuator().current_location().await?;
            let ctx = PageContext::new(page, baseline);
            match self.executor.advance(&ctx).await {
                Ok(report) => return Ok(report),
                Err(err @ ActuateError::Exhausted { .. }) => {
                    if attempts < self.config.advance_retries {
                        attempts += 1;
                        tracing::warn!(page, attempt = attempts, "advance failed; retrying same page");
                        continue;
                    }
                    // Flush the failure so a stalled run still leaves
                    // a usable partial trail
                    self.sink.append(&RunOutcome {
                        page_index: page,
                        fingerprint_hash: last_fingerprint.clone().unwrap_or_default(),
                        strategy_used: "none".to_string(),
                        duration_ms: 0,
                        success: false,
                    })?;
                    return Err(RunError::Stalled {
                        page,
                        last_fingerprint: last_fingerprint.clone(),
                        source: err,
                    });
                }
                Err(other) => return Err(RunError::Actuate(other)),
            }
        }
    }

    /// Fingerprint the page the browser is now showing, recording it
    /// if this template has never been seen before.
    async fn classify(&self) -> Result<Recorded, RunError> {
        let actuator = self.executor.actuator();
        let markup = match actuator.evaluate(PAGE_SOURCE_SCRIPT).await? {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        let url = actuator.current_location().await?;
        let recorded = self.store.record(&PageCapture {
            markup: markup.as_bytes(),
            url: &url,
            run: &self.run_id,
        })?;
        Ok(recorded)
    }

    fn instructions_for(&self, page: u32) -> Vec<FieldInstruction> {
        match self.answers.page(page) {
            Some(fields) => fields
                .iter()
                .map(|(name, value)| FieldInstruction {
                    field: Some(name.clone()),
                    group: None,
                    value: value.clone(),
                    kind: if value == "Y" || value == "N" {
                        FieldKind::Choice
                    } else {
                        FieldKind::Text
                    },
                })
                .collect(),
            None => {
                tracing::debug!(page, "field-bearing page has no scripted answers");
                Vec::new()
            }
        }
    }
}

/// Payload of a form-run task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    pub answers: AnswerMap,
}

/// [`TaskRunner`] that interprets a task payload as a [`RunRequest`]
/// and drives a [`RunController`] for it. One runner serves all
/// workers; each call builds a fresh controller so run state is never
/// shared across concurrent runs.
pub struct FormRunRunner<A: Actuator, C: Clock> {
    actuator: Arc<A>,
    store: Arc<FingerprintStore<C>>,
    clock: C,
    config: RunConfig,
    settle: Duration,
    settle_poll: Duration,
    sink: Arc<dyn OutcomeSink>,
    cancel: CancellationToken,
}

impl<A: Actuator, C: Clock> FormRunRunner<A, C> {
    pub fn new(
        actuator: Arc<A>,
        store: Arc<FingerprintStore<C>>,
        clock: C,
        sink: Arc<dyn OutcomeSink>,
    ) -> Self {
        Self {
            actuator,
            store,
            clock,
            config: RunConfig::default(),
            settle: Duration::from_millis(1500),
            settle_poll: Duration::from_millis(150),
            sink,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_settle(mut self, settle: Duration, settle_poll: Duration) -> Self {
        self.settle = settle;
        self.settle_poll = settle_poll;
        self
    }

    /// Token cancelling every run this runner starts.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

#[async_trait]
impl<A: Actuator, C: Clock> TaskRunner for FormRunRunner<A, C> {
    async fn run(&self, task: &AutomationTask) -> Result<(), TaskError> {
        let request: RunRequest = serde_json::from_value(task.payload.clone())
            .map_err(|e| TaskError::structural(format!("malformed run payload: {e}")))?;

        let executor = ActionExecutor::new(self.actuator.clone(), self.clock.clone())
            .with_settle(self.settle, self.settle_poll);
        let controller =
            RunController::new(request.answers, executor, self.store.clone(), self.sink.clone())
                .with_config(self.config.clone())
                .with_cancel(self.cancel.child_token());

        match controller.run().await {
            Ok(report) => {
                tracing::info!(
                    task = %task.id,
                    pages = report.path.len(),
                    new_pages = report.new_pages,
                    "run completed"
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(task = %task.id, error = %e, "run failed");
                Err(e.classify())
            }
        }
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
