// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Markup normalization: strip everything that varies between two
//! captures of the same page template.
//!
//! Two renders of one template differ in injected tokens, timestamps,
//! session identifiers, and whatever values are already entered in the
//! fields. Each replacement below collapses one of those sources to a
//! fixed placeholder so the surviving text is a function of structure
//! alone.

use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static TIMESTAMPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{13,}").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static HEX_TOKENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[a-f0-9]{32,}").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static SESSION_IDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)session[_-]?id['":\s=]+[^"'\s<>]+"#)
        .expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static VALUE_ATTRS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"value="[^"]*""#).expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static DEFAULT_VALUE_ATTRS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"defaultValue="[^"]*""#).expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("constant regex pattern is valid"));

/// Reduce markup to its structural skeleton.
///
/// Order matters: field values are blanked before whitespace collapse
/// so a value containing runs of spaces cannot leak into the skeleton.
pub fn normalize_markup(markup: &str) -> String {
    let text = TIMESTAMPS.replace_all(markup, "TIMESTAMP");
    let text = HEX_TOKENS.replace_all(&text, "TOKEN");
    let text = SESSION_IDS.replace_all(&text, "SESSION_ID");
    let text = VALUE_ATTRS.replace_all(&text, r#"value="""#);
    let text = DEFAULT_VALUE_ATTRS.replace_all(&text, r#"defaultValue="""#);
    let text = WHITESPACE.replace_all(&text, " ");
    text.trim().to_string()
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
