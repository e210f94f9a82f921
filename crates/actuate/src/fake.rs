// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted in-memory actuator for tests.
//!
//! Simulates a linear sequence of pages at `page://{n}` locations. An
//! "advance action" (activating a submit-style control, or the
//! keyboard confirm) moves to the next location once the configured
//! action count is reached, so tests can pick exactly which strategy
//! in the chain appears to work. Waits advance the shared [`FakeClock`]
//! instead of sleeping.

use crate::actuator::{ActivateOptions, ActuateError, Actuator, ControlHandle, SelectorSpec};
use crate::strategy::PAGE_SOURCE_SCRIPT;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::time::Duration;
use urs_core::FakeClock;

#[derive(Default)]
struct FakeState {
    serial: u32,
    advance_actions: u32,
    succeed_every: u32,
    never_advance: bool,
    missing_labeled: bool,
    unknown_fields: HashSet<String>,
    activations: Vec<(ControlHandle, bool)>,
    evaluations: Vec<String>,
}

/// Scripted [`Actuator`] for tests.
pub struct FakeActuator {
    clock: FakeClock,
    state: Mutex<FakeState>,
}

impl FakeActuator {
    /// Every advance action transitions (first strategy always works).
    pub fn new(clock: FakeClock) -> Self {
        Self {
            clock,
            state: Mutex::new(FakeState { succeed_every: 1, ..FakeState::default() }),
        }
    }

    /// Only every `n`-th advance action transitions; earlier ones are
    /// swallowed, as a flaky widget would.
    pub fn succeed_on_action(self, n: u32) -> Self {
        self.state.lock().succeed_every = n.max(1);
        self
    }

    /// No action ever transitions; every advance stalls.
    pub fn never_advance(self) -> Self {
        self.state.lock().never_advance = true;
        self
    }

    /// The labeled continue control is absent from the page.
    pub fn without_labeled_control(self) -> Self {
        self.state.lock().missing_labeled = true;
        self
    }

    /// Exact lookup for the given field finds nothing (forces the
    /// positional fallback).
    pub fn without_field(self, id: &str) -> Self {
        self.state.lock().unknown_fields.insert(id.to_string());
        self
    }

    /// Clone of the shared clock this fake advances on `wait_for`.
    pub fn clock_handle(&self) -> FakeClock {
        self.clock.clone()
    }

    pub fn activations(&self) -> Vec<(ControlHandle, bool)> {
        self.state.lock().activations.clone()
    }

    pub fn evaluations(&self) -> Vec<String> {
        self.state.lock().evaluations.clone()
    }

    /// Index of the page currently "displayed".
    pub fn location_serial(&self) -> u32 {
        self.state.lock().serial
    }

    fn markup(serial: u32) -> String {
        format!(
            r#"<html><head><title>Page {serial}</title></head>
<body><form action="/urs/page/{serial}">
<input type="radio" name="Q{serial:05}" value="">
</form></body></html>"#
        )
    }

    fn count_advance_action(state: &mut FakeState) {
        state.advance_actions += 1;
        if !state.never_advance && state.advance_actions % state.succeed_every == 0 {
            state.serial += 1;
        }
    }
}

#[async_trait]
impl Actuator for FakeActuator {
    async fn locate(&self, selector: &SelectorSpec) -> Result<Vec<ControlHandle>, ActuateError> {
        let state = self.state.lock();
        Ok(match selector {
            SelectorSpec::Labeled { .. } if state.missing_labeled => Vec::new(),
            SelectorSpec::Labeled { .. } => vec![ControlHandle::new("next-button")],
            SelectorSpec::SubmitCapable => {
                vec![ControlHandle::new("submit-1"), ControlHandle::new("submit-2")]
            }
            SelectorSpec::Field(id) if state.unknown_fields.contains(id) => Vec::new(),
            SelectorSpec::Field(id) => vec![ControlHandle::new(format!("field-{id}"))],
            SelectorSpec::GroupFirst(group) => {
                vec![ControlHandle::new(format!("group-{group}-first"))]
            }
        })
    }

    async fn activate(
        &self,
        handle: &ControlHandle,
        opts: &ActivateOptions,
    ) -> Result<(), ActuateError> {
        let mut state = self.state.lock();
        state.activations.push((handle.clone(), opts.force));
        if handle.0 == "next-button" || handle.0.starts_with("submit-") {
            Self::count_advance_action(&mut state);
        }
        Ok(())
    }

    async fn current_location(&self) -> Result<String, ActuateError> {
        Ok(format!("page://{}", self.state.lock().serial))
    }

    async fn wait_for(&self, duration: Duration) -> Result<(), ActuateError> {
        self.clock.advance(duration);
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, ActuateError> {
        if script == PAGE_SOURCE_SCRIPT {
            let serial = self.state.lock().serial;
            return Ok(serde_json::Value::String(Self::markup(serial)));
        }
        let mut state = self.state.lock();
        state.evaluations.push(script.to_string());
        if script.contains("KeyboardEvent") {
            Self::count_advance_action(&mut state);
        }
        Ok(serde_json::Value::Null)
    }
}
