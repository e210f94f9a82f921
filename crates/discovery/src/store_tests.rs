// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;
use urs_core::FakeClock;

const PAGE_A: &str = r#"<title>Transport Property</title>
<form><input type="radio" name="Q05004" value="Y"></form>"#;

// Same template as PAGE_A, different entered value and injected token
const PAGE_A_LATER: &str = r#"<title>Transport Property</title>
<form data-token="0123456789abcdef0123456789abcdef"><input type="radio" name="Q05004" value="N"></form>"#;

const PAGE_B: &str = r#"<title>Transport Passengers</title>
<form><input type="radio" name="Q05005" value=""></form>"#;

fn store(dir: &Path) -> FingerprintStore<FakeClock> {
    FingerprintStore::open(dir, FakeClock::new()).unwrap()
}

fn capture<'a>(markup: &'a str, run: &'a urs_core::RunId) -> PageCapture<'a> {
    PageCapture { markup: markup.as_bytes(), url: "https://urs.example/page", run }
}

#[test]
fn records_new_page_with_snapshot_and_state_file() {
    let dir = tempdir().unwrap();
    let store = store(dir.path());
    let run = urs_core::RunId::new();

    let recorded = store.record(&capture(PAGE_A, &run)).unwrap();
    assert!(recorded.is_new());
    let fp = recorded.fingerprint();
    assert_eq!(fp.title, "Transport Property");
    assert_eq!(fp.field_identifiers, vec!["Q05004"]);
    assert!(fp.snapshot_path.exists());
    assert!(fp
        .snapshot_path
        .file_name()
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("unique_page_1_"));

    let state: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("unique-pages-tracker.json")).unwrap())
            .unwrap();
    assert_eq!(state["totalUniquePages"], 1);
    assert_eq!(state["pages"][0]["hash"], serde_json::Value::String(fp.hash.clone()));
}

#[test]
fn recording_is_idempotent_by_hash() {
    let dir = tempdir().unwrap();
    let store = store(dir.path());
    let run = urs_core::RunId::new();

    let first = store.record(&capture(PAGE_A, &run)).unwrap();
    // A later render of the same template: different value, new token
    let second = store.record(&capture(PAGE_A_LATER, &run)).unwrap();

    assert!(first.is_new());
    assert!(!second.is_new());
    assert_eq!(first.fingerprint().hash, second.fingerprint().hash);
    assert_eq!(store.stats().count, 1);
}

#[test]
fn distinct_templates_both_recorded() {
    let dir = tempdir().unwrap();
    let store = store(dir.path());
    let run = urs_core::RunId::new();

    store.record(&capture(PAGE_A, &run)).unwrap();
    store.record(&capture(PAGE_B, &run)).unwrap();

    let stats = store.stats();
    assert_eq!(stats.count, 2);
    assert!(store.is_known(&stats.fingerprints[0].hash));
    assert!(store.is_known(&stats.fingerprints[1].hash));
}

#[test]
fn reopen_merges_previously_persisted_state() {
    let dir = tempdir().unwrap();
    let run = urs_core::RunId::new();
    let hash = {
        let store = store(dir.path());
        store.record(&capture(PAGE_A, &run)).unwrap().fingerprint().hash.clone()
    };

    let reopened = store(dir.path());
    assert!(reopened.is_known(&hash));
    assert_eq!(reopened.stats().count, 1);
    // Re-recording after reload is still a duplicate
    assert!(!reopened.record(&capture(PAGE_A, &run)).unwrap().is_new());
}

#[test]
fn open_surfaces_io_failure_as_storage_error() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file in the way").unwrap();

    let err = FingerprintStore::open(&blocker, FakeClock::new()).unwrap_err();
    assert!(matches!(err, StorageError::Io(_)));
}

#[test]
fn concurrent_duplicate_discovery_collapses_to_one_entry() {
    let dir = tempdir().unwrap();
    let store = std::sync::Arc::new(store(dir.path()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            std::thread::spawn(move || {
                let run = urs_core::RunId::new();
                store.record(&capture(PAGE_A, &run)).unwrap().is_new()
            })
        })
        .collect();
    let news: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(news.iter().filter(|n| **n).count(), 1);
    assert_eq!(store.stats().count, 1);
}

#[test]
fn probe_heuristic_stops_at_threshold() {
    let dir = tempdir().unwrap();
    let store = store(dir.path()).with_probe_threshold(10);

    assert!(store.should_keep_probing(0));
    assert!(store.should_keep_probing(9));
    assert!(!store.should_keep_probing(10));
    assert!(!store.should_keep_probing(11));
}

#[test]
fn report_lists_discovered_pages() {
    let dir = tempdir().unwrap();
    let store = store(dir.path());
    let run = urs_core::RunId::new();
    store.record(&capture(PAGE_A, &run)).unwrap();

    let report = store.report();
    assert!(report.contains("**Total Unique Pages Discovered:** 1"));
    assert!(report.contains("### 1. Transport Property"));
    assert!(report.contains("Q05004"));
}
