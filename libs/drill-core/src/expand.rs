//! Expansion of answer fields into the literal answers they accept.
//!
//! An answer field lists alternatives separated by commas. Each alternative
//! may contain optional text in parentheses, so `"(the) cat, (a) dog"` accepts
//! `cat`, `the cat`, `dog` and `a dog`.
//!
//! Every produced answer has its whitespace runs collapsed to single spaces,
//! not just its ends trimmed. Dropping `(very)` from `"a (very) big"` leaves
//! two spaces behind, and the reported answer should read `"a big"`. A field
//! written as `"a  b"` is therefore reported as `"a b"`.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static OPTIONAL_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(([^)]+)\)").expect("optional text pattern is valid")
});

/// Expand an answer field into every acceptable literal answer.
///
/// Output order is deterministic: alternatives in field order, and within an
/// alternative each optional segment is tried omitted before included.
/// Duplicates and empty strings are dropped.
pub fn expand_answers(field: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut answers = Vec::new();

    for alternative in field.split(',') {
        for answer in expand_optional(alternative) {
            if !answer.is_empty() && seen.insert(answer.clone()) {
                answers.push(answer);
            }
        }
    }

    answers
}

/// Expand the parenthesised segments of a single alternative.
pub fn expand_optional(alternative: &str) -> Vec<String> {
    let mut segments: Vec<Vec<String>> = Vec::new();
    let mut rest_start = 0;

    for captures in OPTIONAL_TEXT.captures_iter(alternative) {
        let (Some(whole), Some(inner)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let fixed = &alternative[rest_start..whole.start()];
        segments.push(vec![
            fixed.to_string(),
            format!("{}{}", fixed, inner.as_str().trim()),
        ]);
        rest_start = whole.end();
    }
    segments.push(vec![alternative[rest_start..].to_string()]);

    let mut combinations = vec![String::new()];
    for options in &segments {
        combinations = combinations
            .iter()
            .flat_map(|prefix| options.iter().map(move |option| format!("{}{}", prefix, option)))
            .collect();
    }

    combinations
        .into_iter()
        .map(|s| normalize_whitespace(&s))
        .collect()
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
