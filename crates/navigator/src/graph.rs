// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Navigation decisions over the page graph.

use crate::pages::{page_name, PAGE_COUNT, TERMINAL_PAGE};
use crate::rules::{standard_rules, BranchRule, RuleOutcome};
use serde::Serialize;
use thiserror::Error;
use urs_core::AnswerMap;

/// Navigation rule-table failures. Structural: retrying a run cannot
/// fix a rule cycle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedGraphError {
    #[error("navigation did not terminate within {cap} steps (last page {last_page})")]
    CycleDetected { cap: u32, last_page: u32 },
}

/// Output of one navigation decision. Pure and deterministic for a
/// given `(current_page, answers)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchDecision {
    pub current_page: u32,
    /// `None` at the terminal page.
    pub next_page: Option<u32>,
    pub reason: String,
    pub skipped_pages: Vec<u32>,
}

/// Pre-filter result for progress estimation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visibility {
    pub show: bool,
    pub reason: String,
}

/// Pure function of prior answers → next page.
pub struct NavigationGraph {
    rules: &'static [BranchRule],
}

impl NavigationGraph {
    /// Graph with the form's documented rule table.
    pub fn standard() -> Self {
        Self { rules: standard_rules() }
    }

    /// Graph with a custom rule table.
    pub fn with_rules(rules: &'static [BranchRule]) -> Self {
        Self { rules }
    }

    /// Decide the page after `current` given the answers so far.
    ///
    /// Sequential by default; the rule table overrides. An answer
    /// value outside a rule's domain (or a missing answer at a ruled
    /// page) logs a warning and falls back to sequential — it never
    /// fails the run.
    pub fn decide(&self, current: u32, answers: &AnswerMap) -> BranchDecision {
        if current >= TERMINAL_PAGE {
            return BranchDecision {
                current_page: current,
                next_page: None,
                reason: format!("{} is terminal", page_name(current)),
                skipped_pages: Vec::new(),
            };
        }

        if let Some(rule) = self.rules.iter().find(|r| r.page == current) {
            return match answers.answer(current, rule.field) {
                Some(value) => match rule.outcome(value) {
                    Some(RuleOutcome::Jump { next, skipped, reason }) => BranchDecision {
                        current_page: current,
                        next_page: Some(next),
                        reason: reason.to_string(),
                        skipped_pages: skipped.to_vec(),
                    },
                    Some(RuleOutcome::Sequential) => self.sequential(current),
                    None => {
                        tracing::warn!(
                            page = current,
                            field = rule.field,
                            value,
                            "answer outside rule domain; falling back to sequential"
                        );
                        self.sequential(current)
                    }
                },
                None => {
                    tracing::warn!(
                        page = current,
                        field = rule.field,
                        "no answer recorded for ruled page; falling back to sequential"
                    );
                    self.sequential(current)
                }
            };
        }

        self.sequential(current)
    }

    /// Simulate a full traversal from the landing page, without side
    /// effects. The iteration cap guards against rule cycles: hitting
    /// it is a hard error, never a silent infinite loop.
    pub fn trace_path(&self, answers: &AnswerMap) -> Result<Vec<u32>, MalformedGraphError> {
        let cap = PAGE_COUNT * 2;
        let mut path = Vec::new();
        let mut current = 0;
        loop {
            path.push(current);
            if path.len() as u32 > cap {
                return Err(MalformedGraphError::CycleDetected { cap, last_page: current });
            }
            match self.decide(current, answers).next_page {
                Some(next) => current = next,
                None => return Ok(path),
            }
        }
    }

    /// Whether a run with these answers would ever reach `page`.
    ///
    /// Derived from [`trace_path`](Self::trace_path), so it agrees
    /// with what `decide` actually produces when the run gets there.
    pub fn should_show_page(
        &self,
        page: u32,
        answers: &AnswerMap,
    ) -> Result<Visibility, MalformedGraphError> {
        let path = self.trace_path(answers)?;
        if path.contains(&page) {
            Ok(Visibility {
                show: true,
                reason: format!("{} is on the traversal path", page_name(page)),
            })
        } else {
            Ok(Visibility {
                show: false,
                reason: format!(
                    "{} is skipped by branching for the supplied answers",
                    page_name(page)
                ),
            })
        }
    }

    fn sequential(&self, current: u32) -> BranchDecision {
        BranchDecision {
            current_page: current,
            next_page: Some(current + 1),
            reason: "sequential".to_string(),
            skipped_pages: Vec::new(),
        }
    }
}

impl Default for NavigationGraph {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
