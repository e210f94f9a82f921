// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable catalogue of discovered page fingerprints.
//!
//! One store instance is shared by every worker in the process; all
//! mutation goes through a single mutex so concurrent discovery of the
//! same page collapses to one stored entry. State is rewritten to disk
//! after every new discovery with write-to-temp-then-rename semantics,
//! so a crash mid-write never corrupts previously-known entries.

use crate::fingerprint::{extract_field_identifiers, extract_title, hash_page, PageFingerprint};
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use urs_core::{short, Clock, RunId, SystemClock};

const STATE_FILE: &str = "unique-pages-tracker.json";
const SNAPSHOT_DIR: &str = "unique-pages";

/// Default number of consecutive no-discovery runs after which
/// [`FingerprintStore::should_keep_probing`] reports done.
pub const DEFAULT_PROBE_THRESHOLD: u32 = 10;

/// Errors from discovery-state persistence.
///
/// Never swallowed: losing discovery state causes duplicate-page
/// rework in every later run, so callers must see these.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk discovery state document.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateFile {
    total_unique_pages: usize,
    last_updated: u64,
    pages: Vec<PageFingerprint>,
}

/// A raw page capture handed to the store for classification.
#[derive(Debug, Clone, Copy)]
pub struct PageCapture<'a> {
    pub markup: &'a [u8],
    pub url: &'a str,
    pub run: &'a RunId,
}

/// Result of [`FingerprintStore::record`].
#[derive(Debug, Clone)]
pub enum Recorded {
    /// First observation: snapshot written, catalogue extended.
    Stored(PageFingerprint),
    /// Already known: no-op, the existing entry is returned.
    Duplicate(PageFingerprint),
}

impl Recorded {
    pub fn fingerprint(&self) -> &PageFingerprint {
        match self {
            Recorded::Stored(fp) | Recorded::Duplicate(fp) => fp,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Recorded::Stored(_))
    }
}

/// Catalogue summary for operators and reporting.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogueStats {
    pub count: usize,
    pub fingerprints: Vec<PageFingerprint>,
}

/// Append-only catalogue of every structurally distinct page observed.
#[derive(Debug)]
pub struct FingerprintStore<C: Clock = SystemClock> {
    root: PathBuf,
    probe_threshold: u32,
    clock: C,
    pages: Mutex<IndexMap<String, PageFingerprint>>,
}

impl<C: Clock> FingerprintStore<C> {
    /// Open (or create) the catalogue rooted at `root`, merging any
    /// previously persisted state into memory.
    pub fn open(root: impl Into<PathBuf>, clock: C) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(root.join(SNAPSHOT_DIR))?;

        let mut pages = IndexMap::new();
        let state_path = root.join(STATE_FILE);
        if state_path.exists() {
            let raw = fs::read_to_string(&state_path)?;
            let state: StateFile = serde_json::from_str(&raw)?;
            for fp in state.pages {
                pages.insert(fp.hash.clone(), fp);
            }
            tracing::info!(count = pages.len(), "loaded previously discovered pages");
        }

        Ok(Self {
            root,
            probe_threshold: DEFAULT_PROBE_THRESHOLD,
            clock,
            pages: Mutex::new(pages),
        })
    }

    /// Override the probe-stop threshold (operator knob, advisory only).
    pub fn with_probe_threshold(mut self, threshold: u32) -> Self {
        self.probe_threshold = threshold;
        self
    }

    /// Template identity for a capture. Delegates to [`hash_page`];
    /// exposed here so callers classify and record through one handle.
    pub fn hash_page(&self, markup: &[u8]) -> String {
        hash_page(markup)
    }

    pub fn is_known(&self, hash: &str) -> bool {
        self.pages.lock().contains_key(hash)
    }

    /// Classify a capture and record it if never seen before.
    ///
    /// Idempotent by hash: recording an already-known page returns the
    /// existing entry untouched. New pages get an HTML snapshot file
    /// and an atomic state-file rewrite before this returns.
    pub fn record(&self, capture: &PageCapture<'_>) -> Result<Recorded, StorageError> {
        let hash = hash_page(capture.markup);

        // Lock held across the file writes: mutation is single-writer,
        // and racing discoverers of the same hash must collapse to one
        // stored entry.
        let mut pages = self.pages.lock();
        if let Some(existing) = pages.get(&hash) {
            tracing::debug!(hash = short(&hash, 8), "page already discovered");
            return Ok(Recorded::Duplicate(existing.clone()));
        }

        let text = std::str::from_utf8(capture.markup).unwrap_or("");
        let field_identifiers = extract_field_identifiers(text);
        let title = extract_title(text);

        let snapshot_name = format!("unique_page_{}_{}.html", pages.len() + 1, short(&hash, 8));
        let snapshot_path = self.root.join(SNAPSHOT_DIR).join(&snapshot_name);
        fs::write(&snapshot_path, capture.markup)?;

        let fp = PageFingerprint {
            hash: hash.clone(),
            url: capture.url.to_string(),
            title,
            field_identifiers,
            first_seen_run: capture.run.clone(),
            snapshot_path,
        };
        pages.insert(hash.clone(), fp.clone());
        self.persist(&pages)?;

        tracing::info!(
            total = pages.len(),
            hash = short(&hash, 8),
            title = %fp.title,
            fields = fp.field_identifiers.len(),
            "new unique page discovered"
        );
        Ok(Recorded::Stored(fp))
    }

    pub fn stats(&self) -> CatalogueStats {
        let pages = self.pages.lock();
        CatalogueStats {
            count: pages.len(),
            fingerprints: pages.values().cloned().collect(),
        }
    }

    /// Human-readable discovery report (markdown).
    pub fn report(&self) -> String {
        let pages = self.pages.lock();
        let mut out = String::new();
        out.push_str("# Unique Pages Discovery Report\n\n");
        out.push_str(&format!("**Total Unique Pages Discovered:** {}\n\n", pages.len()));
        out.push_str("## Discovered Pages\n\n");
        for (index, fp) in pages.values().enumerate() {
            out.push_str(&format!("### {}. {}\n", index + 1, fp.title));
            out.push_str(&format!("- **Hash:** `{}...`\n", short(&fp.hash, 16)));
            out.push_str(&format!("- **URL:** {}\n", fp.url));
            out.push_str(&format!(
                "- **Fields:** {} ({})\n",
                fp.field_identifiers.len(),
                fp.field_identifiers.join(", ")
            ));
            out.push_str(&format!("- **First Seen:** {}\n", fp.first_seen_run));
            out.push_str(&format!(
                "- **Snapshot:** `{}`\n\n",
                fp.snapshot_path.file_name().and_then(|n| n.to_str()).unwrap_or("?")
            ));
        }
        out
    }

    /// Advisory coverage heuristic: false once `consecutive_runs_without_new`
    /// reaches the configured threshold. Not a correctness guarantee — a
    /// rare branch may need more probes than the threshold allows for.
    pub fn should_keep_probing(&self, consecutive_runs_without_new: u32) -> bool {
        if consecutive_runs_without_new >= self.probe_threshold {
            tracing::info!(
                total = self.pages.lock().len(),
                threshold = self.probe_threshold,
                "no new pages within threshold; full coverage likely"
            );
            return false;
        }
        true
    }

    fn persist(&self, pages: &IndexMap<String, PageFingerprint>) -> Result<(), StorageError> {
        let state = StateFile {
            total_unique_pages: pages.len(),
            last_updated: self.clock.epoch_ms(),
            pages: pages.values().cloned().collect(),
        };
        write_atomic(&self.root.join(STATE_FILE), &serde_json::to_vec_pretty(&state)?)
    }
}

/// Write-to-temp-then-rename so readers never observe a torn file.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
