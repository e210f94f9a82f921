// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The answer map accumulated during one form traversal.
//!
//! Maps page index to the field-name → value answers submitted on that
//! page. Append-only within a run: once a page's answers are recorded
//! they are never mutated, so the full intended path can be re-derived
//! for auditing at any point.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from answer-map mutation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnswerError {
    #[error("answers for page {0} already recorded")]
    PageAlreadyRecorded(u32),
}

/// Ordered mapping from page index to the answers submitted on that page.
///
/// Field order within a page is preserved: branch predicates in the
/// navigation model key off the first field of a page, matching the
/// form's rendered order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerMap {
    pages: BTreeMap<u32, IndexMap<String, String>>,
}

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the answers for a page. Append-only: recording a page
    /// twice within the same run is an error.
    pub fn record_page(
        &mut self,
        page: u32,
        answers: IndexMap<String, String>,
    ) -> Result<(), AnswerError> {
        if self.pages.contains_key(&page) {
            return Err(AnswerError::PageAlreadyRecorded(page));
        }
        self.pages.insert(page, answers);
        Ok(())
    }

    /// All answers recorded for a page, in form order.
    pub fn page(&self, page: u32) -> Option<&IndexMap<String, String>> {
        self.pages.get(&page)
    }

    /// The value answered for a named field on a page.
    pub fn answer(&self, page: u32, field: &str) -> Option<&str> {
        self.pages.get(&page)?.get(field).map(String::as_str)
    }

    /// The value of the first field answered on a page.
    ///
    /// The URS pages that drive branching carry a single leading
    /// yes/no question, so branch predicates read this.
    pub fn first_answer(&self, page: u32) -> Option<&str> {
        self.pages
            .get(&page)?
            .first()
            .map(|(_, value)| value.as_str())
    }

    pub fn has_page(&self, page: u32) -> bool {
        self.pages.contains_key(&page)
    }

    /// Iterate recorded pages in ascending page order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &IndexMap<String, String>)> {
        self.pages.iter().map(|(page, answers)| (*page, answers))
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
#[path = "answers_tests.rs"]
mod tests;
