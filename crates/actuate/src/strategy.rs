// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The ordered chain of page-advance strategies.
//!
//! Each strategy is one independent way of accomplishing "move to the
//! next page". The executor walks them in order; adding a new fallback
//! is a pure extension — a new strategy struct in the chain — never an
//! edit to branching code.

use crate::actuator::{ActivateOptions, ActuateError, Actuator, SelectorSpec};
use async_trait::async_trait;

/// Script returning the current page's markup, for fingerprinting.
pub const PAGE_SOURCE_SCRIPT: &str = "document.documentElement.outerHTML";

// Synthesized keyboard confirm: an Enter keydown on the focused
// element, then an explicit form submit for pages whose handlers only
// listen to the submit event.
const KEYBOARD_CONFIRM_SCRIPT: &str = "document.activeElement && document.activeElement.dispatchEvent(new KeyboardEvent('keydown', {key: 'Enter', bubbles: true})); var f = document.querySelector('form'); f && f.requestSubmit && f.requestSubmit();";

/// How the executor decides an advance attempt landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuccessCheck {
    /// Location differs from the baseline captured before the attempt.
    LocationChanged,
    /// Location contains the given fragment.
    LocationContains(String),
}

/// Everything a strategy needs to act on one page.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub page: u32,
    /// Location observed before any attempt; the default success
    /// signal is a departure from it.
    pub baseline_location: String,
    pub check: SuccessCheck,
}

impl PageContext {
    pub fn new(page: u32, baseline_location: impl Into<String>) -> Self {
        Self {
            page,
            baseline_location: baseline_location.into(),
            check: SuccessCheck::LocationChanged,
        }
    }
}

/// One independent way of advancing a page.
#[async_trait]
pub trait AdvanceStrategy<A: Actuator>: Send + Sync {
    fn name(&self) -> &'static str;

    /// Perform the action. Success here only means the action was
    /// issued; whether the page actually moved is the executor's
    /// settle-and-check to make.
    async fn attempt(&self, actuator: &A, ctx: &PageContext) -> Result<(), ActuateError>;
}

/// Locate the specifically-labeled continue control and activate it.
pub struct LabeledControl {
    pub label: String,
}

#[async_trait]
impl<A: Actuator> AdvanceStrategy<A> for LabeledControl {
    fn name(&self) -> &'static str {
        "labeled-control"
    }

    async fn attempt(&self, actuator: &A, _ctx: &PageContext) -> Result<(), ActuateError> {
        let selector = SelectorSpec::Labeled { role: "button".to_string(), label: self.label.clone() };
        let handles = actuator.locate(&selector).await?;
        let handle = handles
            .first()
            .ok_or_else(|| ActuateError::NoMatch(selector.to_string()))?;
        actuator.activate(handle, &ActivateOptions::default()).await
    }
}

/// Synthesize a keyboard confirm.
pub struct KeyboardConfirm;

#[async_trait]
impl<A: Actuator> AdvanceStrategy<A> for KeyboardConfirm {
    fn name(&self) -> &'static str {
        "keyboard-confirm"
    }

    async fn attempt(&self, actuator: &A, _ctx: &PageContext) -> Result<(), ActuateError> {
        actuator.evaluate(KEYBOARD_CONFIRM_SCRIPT).await.map(|_| ())
    }
}

/// Broadly match any submit-capable control and activate the first.
pub struct AnySubmit;

#[async_trait]
impl<A: Actuator> AdvanceStrategy<A> for AnySubmit {
    fn name(&self) -> &'static str {
        "any-submit"
    }

    async fn attempt(&self, actuator: &A, _ctx: &PageContext) -> Result<(), ActuateError> {
        let handles = actuator.locate(&SelectorSpec::SubmitCapable).await?;
        let handle = handles
            .first()
            .ok_or_else(|| ActuateError::NoMatch(SelectorSpec::SubmitCapable.to_string()))?;
        actuator.activate(handle, &ActivateOptions::default()).await
    }
}

/// Low-level activation on every submit-capable control.
pub struct ForceActivateAll;

#[async_trait]
impl<A: Actuator> AdvanceStrategy<A> for ForceActivateAll {
    fn name(&self) -> &'static str {
        "force-activate-all"
    }

    async fn attempt(&self, actuator: &A, _ctx: &PageContext) -> Result<(), ActuateError> {
        let handles = actuator.locate(&SelectorSpec::SubmitCapable).await?;
        if handles.is_empty() {
            return Err(ActuateError::NoMatch(SelectorSpec::SubmitCapable.to_string()));
        }
        let opts = ActivateOptions { force: true };
        for handle in &handles {
            actuator.activate(handle, &opts).await?;
        }
        Ok(())
    }
}

/// The default chain, cheapest and most precise first.
///
/// Telemetry reports which strategy landed each advance; reorder here
/// when the numbers say a later strategy is carrying the load.
pub fn default_chain<A: Actuator>() -> Vec<Box<dyn AdvanceStrategy<A>>> {
    vec![
        Box::new(LabeledControl { label: "Next".to_string() }),
        Box::new(KeyboardConfirm),
        Box::new(AnySubmit),
        Box::new(ForceActivateAll),
    ]
}
