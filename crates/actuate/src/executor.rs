// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The resilient action executor: strategy-chain page advancement and
//! best-available-locator field population.

use crate::actuator::{ActivateOptions, ActuateError, Actuator, SelectorSpec};
use crate::strategy::{default_chain, AdvanceStrategy, PageContext, SuccessCheck};
use std::sync::Arc;
use std::time::Duration;
use urs_core::Clock;

const DEFAULT_SETTLE: Duration = Duration::from_millis(1500);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(150);

/// Telemetry for one successful advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceReport {
    /// Which strategy landed the transition — fed back into chain
    /// ordering over time.
    pub strategy_used: String,
    pub elapsed_ms: u64,
}

/// What kind of control a field instruction drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free-text input: value is written via script.
    Text,
    /// Radio / checkbox / option control: the target is activated.
    Choice,
}

/// One field to populate on a page.
#[derive(Debug, Clone)]
pub struct FieldInstruction {
    /// Exact field identifier, when extraction produced one.
    pub field: Option<String>,
    /// Group for positional fallback selection.
    pub group: Option<String>,
    pub value: String,
    pub kind: FieldKind,
}

/// Drives a single page: populate fields, then advance through the
/// strategy chain until the success signal fires or the chain is spent.
pub struct ActionExecutor<A: Actuator, C: Clock> {
    actuator: Arc<A>,
    clock: C,
    settle: Duration,
    poll_interval: Duration,
    strategies: Vec<Box<dyn AdvanceStrategy<A>>>,
}

impl<A: Actuator, C: Clock> ActionExecutor<A, C> {
    pub fn new(actuator: Arc<A>, clock: C) -> Self {
        Self {
            actuator,
            clock,
            settle: DEFAULT_SETTLE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            strategies: default_chain(),
        }
    }

    /// Replace the strategy chain (order is significant).
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn AdvanceStrategy<A>>>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Bound the per-strategy settle wait.
    pub fn with_settle(mut self, settle: Duration, poll_interval: Duration) -> Self {
        self.settle = settle;
        self.poll_interval = poll_interval;
        self
    }

    pub fn actuator(&self) -> &Arc<A> {
        &self.actuator
    }

    /// Advance past the current page.
    ///
    /// Walks the strategy chain in order. A strategy whose action was
    /// issued gets the full settle window for the success signal to
    /// appear (polled, so a fast transition returns early); one whose
    /// action could not even be issued costs nothing. Succeeds as soon
    /// as any strategy lands; fails with `Exhausted` only when every
    /// strategy has been spent.
    pub async fn advance(&self, ctx: &PageContext) -> Result<AdvanceReport, ActuateError> {
        let started = self.clock.now();
        let mut last_error = String::from("no strategies configured");

        for strategy in &self.strategies {
            tracing::debug!(page = ctx.page, strategy = strategy.name(), "attempting advance");
            match strategy.attempt(&self.actuator, ctx).await {
                Err(e) => {
                    tracing::debug!(
                        page = ctx.page,
                        strategy = strategy.name(),
                        error = %e,
                        "strategy could not act"
                    );
                    last_error = e.to_string();
                }
                Ok(()) => {
                    if self.settled(ctx).await? {
                        let elapsed_ms =
                            self.clock.now().duration_since(started).as_millis() as u64;
                        tracing::info!(
                            page = ctx.page,
                            strategy = strategy.name(),
                            elapsed_ms,
                            "page advanced"
                        );
                        return Ok(AdvanceReport {
                            strategy_used: strategy.name().to_string(),
                            elapsed_ms,
                        });
                    }
                    last_error =
                        format!("no page transition after {} strategy", strategy.name());
                }
            }
        }

        Err(ActuateError::Exhausted {
            page: ctx.page,
            tried: self.strategies.len(),
            last_error,
        })
    }

    /// Populate a page's fields with the best available locator.
    ///
    /// Exact field identifiers win; positional group selection is the
    /// fallback, and every guess is logged with the field it guessed.
    /// Returns the number of fields driven.
    pub async fn populate(
        &self,
        page: u32,
        instructions: &[FieldInstruction],
    ) -> Result<u32, ActuateError> {
        let mut filled = 0;
        for inst in instructions {
            let exact = match &inst.field {
                Some(id) => self.actuator.locate(&SelectorSpec::Field(id.clone())).await?,
                None => Vec::new(),
            };

            let (handles, guessed) = if exact.is_empty() {
                let group = inst.group.clone().or_else(|| inst.field.clone());
                match group {
                    Some(group) => {
                        let handles =
                            self.actuator.locate(&SelectorSpec::GroupFirst(group)).await?;
                        (handles, true)
                    }
                    None => (Vec::new(), true),
                }
            } else {
                (exact, false)
            };

            if guessed {
                tracing::warn!(
                    page,
                    field = inst.field.as_deref().unwrap_or("<unnamed>"),
                    "exact locator unavailable; guessing positional control"
                );
            }

            let Some(handle) = handles.first() else {
                tracing::warn!(
                    page,
                    field = inst.field.as_deref().unwrap_or("<unnamed>"),
                    "no control found for field"
                );
                continue;
            };

            match inst.kind {
                FieldKind::Choice => {
                    self.actuator.activate(handle, &ActivateOptions::default()).await?;
                }
                FieldKind::Text => match &inst.field {
                    Some(id) => {
                        self.actuator.evaluate(&set_value_script(id, &inst.value)).await?;
                    }
                    None => {
                        // Positional text entry has no name to script
                        // against; activation at least focuses it.
                        self.actuator.activate(handle, &ActivateOptions::default()).await?;
                    }
                },
            }
            filled += 1;
        }
        Ok(filled)
    }

    async fn settled(&self, ctx: &PageContext) -> Result<bool, ActuateError> {
        let mut waited = Duration::ZERO;
        loop {
            self.actuator.wait_for(self.poll_interval).await?;
            waited += self.poll_interval;
            if self.check(ctx).await? {
                return Ok(true);
            }
            if waited >= self.settle {
                return Ok(false);
            }
        }
    }

    async fn check(&self, ctx: &PageContext) -> Result<bool, ActuateError> {
        let location = self.actuator.current_location().await?;
        Ok(match &ctx.check {
            SuccessCheck::LocationChanged => location != ctx.baseline_location,
            SuccessCheck::LocationContains(fragment) => location.contains(fragment),
        })
    }
}

fn set_value_script(field: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        r#"var el = document.getElementsByName("{field}")[0]; if (el) {{ el.value = "{escaped}"; el.dispatchEvent(new Event('change', {{bubbles: true}})); }}"#
    )
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
