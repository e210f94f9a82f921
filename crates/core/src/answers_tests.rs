// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use indexmap::IndexMap;

fn page_answers(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn records_and_reads_back_answers() {
    let mut map = AnswerMap::new();
    map.record_page(31, page_answers(&[("Q05004", "Y")])).unwrap();

    assert!(map.has_page(31));
    assert_eq!(map.answer(31, "Q05004"), Some("Y"));
    assert_eq!(map.answer(31, "Q99999"), None);
    assert_eq!(map.answer(32, "Q05004"), None);
}

#[test]
fn recording_a_page_twice_is_rejected() {
    let mut map = AnswerMap::new();
    map.record_page(14, page_answers(&[("Q02001", "Dana")])).unwrap();

    let err = map
        .record_page(14, page_answers(&[("Q02001", "Alex")]))
        .unwrap_err();
    assert_eq!(err, AnswerError::PageAlreadyRecorded(14));
    // Original answers untouched
    assert_eq!(map.answer(14, "Q02001"), Some("Dana"));
}

#[test]
fn first_answer_respects_form_order() {
    let mut map = AnswerMap::new();
    map.record_page(14, page_answers(&[("Q02001", "Dana"), ("Q02003", "x@y.z")]))
        .unwrap();

    assert_eq!(map.first_answer(14), Some("Dana"));
    assert_eq!(map.first_answer(15), None);
}

#[test]
fn iterates_pages_in_ascending_order() {
    let mut map = AnswerMap::new();
    map.record_page(31, page_answers(&[("Q05004", "N")])).unwrap();
    map.record_page(2, page_answers(&[("Q01002", "N")])).unwrap();
    map.record_page(14, page_answers(&[("Q02001", "Dana")])).unwrap();

    let pages: Vec<u32> = map.iter().map(|(page, _)| page).collect();
    assert_eq!(pages, vec![2, 14, 31]);
}

#[test]
fn round_trips_through_serde() {
    let mut map = AnswerMap::new();
    map.record_page(31, page_answers(&[("Q05004", "Y")])).unwrap();

    let json = serde_json::to_string(&map).unwrap();
    let back: AnswerMap = serde_json::from_str(&json).unwrap();
    assert_eq!(back, map);
}
