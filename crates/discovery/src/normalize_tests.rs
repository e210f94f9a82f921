// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    timestamp = { "ts=1717171717171", "ts=TIMESTAMP" },
    hex_token = { "t=0123456789abcdef0123456789abcdef", "t=TOKEN" },
    session_snake = { r#"session_id="s3cr3t-value""#, r#"SESSION_ID""# },
    session_kebab = { "session-id: abc123", "SESSION_ID" },
    value_attr = { r#"<input value="already entered">"#, r#"<input value="">"# },
    default_value_attr = { r#"<input defaultValue="Dana">"#, r#"<input defaultValue="">"# },
)]
fn volatile_content_is_collapsed(input: &str, expected: &str) {
    assert_eq!(normalize_markup(input), expected);
}

#[test]
fn whitespace_collapses_and_trims() {
    assert_eq!(
        normalize_markup("  <div>\n\t<span>a</span>   <span>b</span>\n</div> "),
        "<div> <span>a</span> <span>b</span> </div>"
    );
}

#[test]
fn short_digit_runs_survive() {
    // Page numbers and question IDs are not timestamps
    assert_eq!(normalize_markup(r#"name='Q05004'"#), "name='Q05004'");
}

#[test]
fn structure_is_preserved() {
    let markup = r#"<form><input type="radio" name="Q05004" value="Y"></form>"#;
    assert_eq!(
        normalize_markup(markup),
        r#"<form><input type="radio" name="Q05004" value=""></form>"#
    );
}
