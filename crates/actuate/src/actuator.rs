// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The abstract browser-actuation capability.
//!
//! Anything that can locate controls, activate them, observe the
//! current location, wait, and evaluate a script can drive the form.
//! Concrete bindings live outside this workspace; tests use the
//! scripted fake.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from actuation.
#[derive(Debug, Error)]
pub enum ActuateError {
    #[error("actuator failure: {0}")]
    Actuator(String),
    #[error("no control matched {0}")]
    NoMatch(String),
    #[error("all {tried} advance strategies exhausted on page {page}: {last_error}")]
    Exhausted {
        page: u32,
        tried: usize,
        last_error: String,
    },
}

/// Opaque reference to a located control, meaningful only to the
/// actuator that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControlHandle(pub String);

impl ControlHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// How to find controls on the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorSpec {
    /// Exact form-field identifier (the Q##### naming convention).
    Field(String),
    /// A control of the given role carrying a visible label.
    Labeled { role: String, label: String },
    /// Any control capable of submitting the page.
    SubmitCapable,
    /// First control in a named group — the positional fallback when
    /// exact identifiers are unavailable.
    GroupFirst(String),
}

impl std::fmt::Display for SelectorSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectorSpec::Field(id) => write!(f, "field:{id}"),
            SelectorSpec::Labeled { role, label } => write!(f, "{role}|{label}"),
            SelectorSpec::SubmitCapable => write!(f, "submit-capable"),
            SelectorSpec::GroupFirst(group) => write!(f, "group-first:{group}"),
        }
    }
}

/// Options for activating a control.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivateOptions {
    /// Use the platform's low-level activation path instead of the
    /// cooperative one.
    pub force: bool,
}

/// Abstract capability for interacting with a rendered page.
///
/// Implementations must make activation idempotent-enough to retry:
/// activating a control twice must not double-submit data. The
/// executor retries on that assumption and cannot enforce it.
#[async_trait]
pub trait Actuator: Send + Sync + 'static {
    /// All controls matching the selector on the current page.
    async fn locate(&self, selector: &SelectorSpec) -> Result<Vec<ControlHandle>, ActuateError>;

    async fn activate(
        &self,
        handle: &ControlHandle,
        opts: &ActivateOptions,
    ) -> Result<(), ActuateError>;

    /// The externally-observable location (URL) of the current page.
    async fn current_location(&self) -> Result<String, ActuateError>;

    /// Bounded wait; never an unbounded block.
    async fn wait_for(&self, duration: Duration) -> Result<(), ActuateError>;

    /// Evaluate a script in the page, returning its JSON value.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, ActuateError>;
}
