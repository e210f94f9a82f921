// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-page audit record emitted by a run.

use serde::{Deserialize, Serialize};

/// One entry in the ordered audit trail of a form traversal.
///
/// Emitted after every page transition and flushed incrementally, so a
/// stalled run still leaves a usable partial trail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunOutcome {
    pub page_index: u32,
    pub fingerprint_hash: String,
    /// Name of the advance strategy that moved past this page, or
    /// "none" when the page was reached but not advanced.
    pub strategy_used: String,
    pub duration_ms: u64,
    pub success: bool,
}
