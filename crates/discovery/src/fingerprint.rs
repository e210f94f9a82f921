// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Page fingerprints: hashing and field-identifier extraction.

use crate::normalize::normalize_markup;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::LazyLock;
use urs_core::RunId;

// The URS field-naming convention: every form control is named Q
// followed by exactly five digits.
#[allow(clippy::expect_used)]
static FIELD_IDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)name=["']?(Q\d{5})["']?"#).expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static TITLE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<title>([^<]+)</title>").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static H1_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<h1[^>]*>([^<]+)</h1>").expect("constant regex pattern is valid"));

/// Identity of one structurally distinct form page.
///
/// Immutable once recorded; the catalogue it lives in is append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageFingerprint {
    /// SHA-256 of the normalized markup, hex-encoded.
    pub hash: String,
    pub url: String,
    pub title: String,
    /// Deduplicated, sorted field keys present on the page.
    pub field_identifiers: Vec<String>,
    /// Run during which this template was first observed.
    pub first_seen_run: RunId,
    /// Where the raw HTML snapshot was written.
    pub snapshot_path: PathBuf,
}

/// Hash a page capture down to its template identity.
///
/// Never fails: markup that is not valid UTF-8 cannot be normalized,
/// so the raw byte stream is hashed instead. Such a capture still gets
/// a stable (if over-specific) identity rather than aborting the run.
pub fn hash_page(markup: &[u8]) -> String {
    let mut hasher = Sha256::new();
    match std::str::from_utf8(markup) {
        Ok(text) => hasher.update(normalize_markup(text).as_bytes()),
        Err(_) => hasher.update(markup),
    }
    to_hex(&hasher.finalize())
}

/// Extract the form's field identifiers, deduplicated and sorted.
///
/// Used both as fingerprint metadata and for completeness checks
/// against the answer set before a run starts.
pub fn extract_field_identifiers(markup: &str) -> Vec<String> {
    let ids: BTreeSet<String> = FIELD_IDS
        .captures_iter(markup)
        .map(|c| c[1].to_uppercase())
        .collect();
    ids.into_iter().collect()
}

/// Best-effort page title: `<title>`, then the first `<h1>`.
pub fn extract_title(markup: &str) -> String {
    if let Some(c) = TITLE_TAG.captures(markup) {
        return c[1].trim().to_string();
    }
    if let Some(c) = H1_TAG.captures(markup) {
        return c[1].trim().to_string();
    }
    "Unknown Page".to_string()
}

fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}

#[cfg(test)]
#[path = "fingerprint_tests.rs"]
mod tests;
