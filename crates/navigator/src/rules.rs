// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative branch-rule table.
//!
//! Each rule names the page it governs, the answer field it reads, and
//! an outcome per anticipated value — total over the values the form
//! can produce at that page. Values outside the listed domain fall
//! back to sequential navigation with a logged warning rather than
//! failing the run, so a surprising answer degrades to the default
//! path instead of stranding an applicant.

/// Where a matched rule case sends the run next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    /// Continue to the next page in sequence.
    Sequential,
    /// Jump ahead, naming the pages the jump skips.
    Jump {
        next: u32,
        skipped: &'static [u32],
        reason: &'static str,
    },
}

/// One entry in the branch-rule table.
#[derive(Debug, Clone, Copy)]
pub struct BranchRule {
    pub page: u32,
    /// The answer field the predicate reads (the page's leading
    /// yes/no question).
    pub field: &'static str,
    /// Outcome per anticipated answer value.
    pub cases: &'static [(&'static str, RuleOutcome)],
}

impl BranchRule {
    /// Outcome for an observed answer value, if within the rule's domain.
    pub fn outcome(&self, value: &str) -> Option<RuleOutcome> {
        self.cases
            .iter()
            .find(|(expected, _)| *expected == value)
            .map(|(_, outcome)| *outcome)
    }
}

/// The form's documented conditional navigation.
///
/// Pages 2, 30, and 36 branch in the live form but stay sequential for
/// the clientele this system registers (never third-party preparers,
/// never intermodal equipment providers); their rules pin the
/// anticipated domain so anything else is flagged.
const STANDARD_RULES: &[BranchRule] = &[
    BranchRule {
        page: 2,
        field: "Q01002",
        cases: &[("N", RuleOutcome::Sequential), ("Y", RuleOutcome::Sequential)],
    },
    BranchRule {
        page: 30,
        field: "Q05002",
        cases: &[("N", RuleOutcome::Sequential), ("Y", RuleOutcome::Sequential)],
    },
    BranchRule {
        page: 31,
        field: "Q05004",
        cases: &[
            ("Y", RuleOutcome::Sequential),
            (
                "N",
                RuleOutcome::Jump {
                    next: 36,
                    skipped: &[32, 33, 34, 35],
                    reason: "no property transported; property questions do not apply",
                },
            ),
        ],
    },
    BranchRule {
        page: 36,
        field: "Q05005",
        cases: &[("N", RuleOutcome::Sequential), ("Y", RuleOutcome::Sequential)],
    },
    BranchRule {
        page: 60,
        field: "Q16003",
        cases: &[
            ("Y", RuleOutcome::Sequential),
            (
                "N",
                RuleOutcome::Jump {
                    next: 61,
                    skipped: &[],
                    reason: "no affiliations to detail",
                },
            ),
        ],
    },
];

/// The shipped rule table.
pub fn standard_rules() -> &'static [BranchRule] {
    STANDARD_RULES
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
