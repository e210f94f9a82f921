// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

/// A page template as the form renders it: same structure, different
/// injected token / timestamp / entered value per render.
fn render(token: &str, timestamp: &str, entered: &str, fields: &[&str]) -> String {
    let inputs: String = fields
        .iter()
        .map(|f| format!(r#"<input type="text" name="{f}" value="{entered}">"#))
        .collect();
    format!(
        r#"<html><head><title>Operation Classification</title></head>
<body data-token="{token}" data-rendered="{timestamp}">
<form action="/urs/continue?session_id={token}">{inputs}</form>
</body></html>"#
    )
}

#[test]
fn same_template_different_tokens_hash_identically() {
    let a = render(
        "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
        "1717171717171",
        "MILLER FREIGHT LLC",
        &["Q05004"],
    );
    let b = render(
        "ffffffffffffffffffffffffffffffff",
        "1818181818181",
        "",
        &["Q05004"],
    );
    assert_eq!(hash_page(a.as_bytes()), hash_page(b.as_bytes()));
}

#[test]
fn different_field_composition_hashes_differently() {
    let a = render("aa".repeat(16).as_str(), "1717171717171", "", &["Q05004"]);
    let b = render("aa".repeat(16).as_str(), "1717171717171", "", &["Q05004", "Q05005"]);
    assert_ne!(hash_page(a.as_bytes()), hash_page(b.as_bytes()));
}

#[test]
fn hashing_never_fails_on_malformed_markup() {
    // Invalid UTF-8 falls back to hashing the raw byte stream
    let bytes = [0xff, 0xfe, 0x00, 0x41, 0x80];
    let h1 = hash_page(&bytes);
    let h2 = hash_page(&bytes);
    assert_eq!(h1, h2);
    assert_eq!(h1.len(), 64);
}

#[test]
fn field_identifiers_are_deduplicated_sorted_and_uppercased() {
    let markup = r#"
        <input name="Q05005"><input name='q05004'>
        <input name=Q05004><input name="QX1234"><input name="Q123">
    "#;
    assert_eq!(extract_field_identifiers(markup), vec!["Q05004", "Q05005"]);
}

#[test]
fn title_prefers_title_tag_then_h1() {
    assert_eq!(
        extract_title("<title> Transport Property </title><h1>Other</h1>"),
        "Transport Property"
    );
    assert_eq!(extract_title(r#"<h1 class="hdr">Vehicles</h1>"#), "Vehicles");
    assert_eq!(extract_title("<p>nothing here</p>"), "Unknown Page");
}

proptest! {
    /// Hash stability: any substitution of volatile tokens and entered
    /// values leaves the template hash unchanged.
    #[test]
    fn hash_invariant_to_volatile_substitution(
        token_a in "[0-9a-f]{32,40}",
        token_b in "[0-9a-f]{32,40}",
        ts_a in "[0-9]{13,16}",
        ts_b in "[0-9]{13,16}",
        entered_a in "[A-Za-z0-9 ]{0,24}",
        entered_b in "[A-Za-z0-9 ]{0,24}",
    ) {
        let a = render(&token_a, &ts_a, &entered_a, &["Q05004", "Q05044"]);
        let b = render(&token_b, &ts_b, &entered_b, &["Q05004", "Q05044"]);
        prop_assert_eq!(hash_page(a.as_bytes()), hash_page(b.as_bytes()));
    }
}
