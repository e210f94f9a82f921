// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run-level error taxonomy and retry classification.
//!
//! Discovery and navigation errors are deterministic: the same inputs
//! reproduce them, so the queue must not retry. Actuation failures are
//! the third-party form misbehaving, which is often time-dependent —
//! exactly what backoff-and-retry exists for.

use thiserror::Error;
use urs_actuate::ActuateError;
use urs_core::TaskError;
use urs_discovery::StorageError;
use urs_navigator::MalformedGraphError;

/// Failure of one end-to-end form traversal.
#[derive(Debug, Error)]
pub enum RunError {
    /// The run was started without its minimum required answer set.
    #[error("required answers missing for pages {0:?}")]
    IncompleteInput(Vec<u32>),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Graph(#[from] MalformedGraphError),

    /// The executor exhausted every strategy on a page, repeatedly.
    /// Carries where the run died for diagnosis.
    #[error("run stalled on page {page}: {source}")]
    Stalled {
        page: u32,
        last_fingerprint: Option<String>,
        #[source]
        source: ActuateError,
    },

    /// Actuator failure outside the advance chain (locating, page
    /// capture).
    #[error(transparent)]
    Actuate(#[from] ActuateError),

    /// The run observed its cancellation flag and stopped.
    #[error("run cancelled at page {0}")]
    Cancelled(u32),
}

impl RunError {
    /// Map onto the queue's retry taxonomy.
    pub fn classify(&self) -> TaskError {
        match self {
            RunError::IncompleteInput(_) | RunError::Storage(_) | RunError::Graph(_) => {
                TaskError::structural(self.to_string())
            }
            RunError::Stalled { .. } | RunError::Actuate(_) | RunError::Cancelled(_) => {
                TaskError::transient(self.to_string())
            }
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
