// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! urs-actuate: resilient page actuation.
//!
//! The form's widgets misbehave: the labeled continue control sometimes
//! ignores activation, sometimes only a synthesized keyboard confirm
//! lands, sometimes only a low-level activation does. This crate holds
//! the abstract [`Actuator`] capability any browser binding can
//! implement, and an [`ActionExecutor`] that advances a page by walking
//! an ordered chain of independent strategies until one produces the
//! externally-observable success signal.

pub mod actuator;
pub mod executor;
pub mod strategy;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use actuator::{ActivateOptions, ActuateError, Actuator, ControlHandle, SelectorSpec};
pub use executor::{ActionExecutor, AdvanceReport, FieldInstruction, FieldKind};
pub use strategy::{
    default_chain, AdvanceStrategy, PageContext, SuccessCheck, PAGE_SOURCE_SCRIPT,
};

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeActuator;
