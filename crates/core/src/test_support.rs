// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canned fixtures shared by tests across the workspace.

use crate::AnswerMap;
use indexmap::IndexMap;

/// Build an answer map from literal `(page, [(field, value)])` pairs.
pub fn answers(pages: &[(u32, &[(&str, &str)])]) -> AnswerMap {
    let mut map = AnswerMap::new();
    for (page, fields) in pages {
        let fields: IndexMap<String, String> = fields
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        #[allow(clippy::unwrap_used)]
        map.record_page(*page, fields).unwrap();
    }
    map
}

/// A carrier that transports property: follows the sequential path
/// through the operation-classification block.
pub fn property_carrier_answers() -> AnswerMap {
    answers(&[
        (2, &[("Q01002", "N")]),
        (14, &[("Q02001", "Dana Miller"), ("Q02003", "dana@example.com")]),
        (17, &[("Q03001", "MILLER FREIGHT LLC")]),
        (22, &[("Q03014", "871234567")]),
        (31, &[("Q05004", "Y")]),
        (36, &[("Q05005", "N")]),
        (60, &[("Q16003", "N")]),
    ])
}

/// A carrier that does not transport property: page 31 answers "No",
/// which skips the property block (pages 32-35) and lands on 36.
pub fn no_property_answers() -> AnswerMap {
    answers(&[
        (2, &[("Q01002", "N")]),
        (14, &[("Q02001", "Dana Miller"), ("Q02003", "dana@example.com")]),
        (17, &[("Q03001", "MILLER COURIER LLC")]),
        (22, &[("Q03014", "879876543")]),
        (31, &[("Q05004", "N")]),
        (36, &[("Q05005", "N")]),
        (60, &[("Q16003", "N")]),
    ])
}
