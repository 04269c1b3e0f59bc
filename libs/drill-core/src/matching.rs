//! Answer matching with typo tolerance.
//!
//! Similarity is the Ratcliff-Obershelp ratio `2·M / T`, where `M` counts the
//! characters in the matching blocks found by repeatedly taking the longest
//! common substring, and `T` is the combined length of both strings.

use crate::expand::expand_answers;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Default tolerance percentage.
pub const DEFAULT_TOLERANCE: u8 = 80;

/// Result of comparing a typed answer to one acceptable answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Whether the answer is considered correct.
    pub is_correct: bool,
    /// Similarity score between 0.0 and 1.0.
    pub similarity: f64,
    /// The acceptable answer compared against, as written in the word list.
    pub candidate: String,
}

/// Verdict for a typed answer against a whole answer field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub correct: bool,
    /// First acceptable answer that matched.
    pub matched: Option<String>,
    /// Every literal answer the field accepts, in comparison order.
    pub acceptable: Vec<String>,
}

/// Compare a typed answer to a single acceptable answer.
///
/// Accepts when `ratio * 100 >= tolerance`. The comparison is done on integer
/// counts so a tolerance of 100 accepts only identical normalized strings.
pub fn is_acceptable(typed: &str, candidate: &str, tolerance: u8, ignore_accents: bool) -> MatchResult {
    let typed_normalized: Vec<char> = normalize(typed, ignore_accents).chars().collect();
    let candidate_normalized: Vec<char> = normalize(candidate, ignore_accents).chars().collect();

    let total = typed_normalized.len() + candidate_normalized.len();
    let matched = matching_characters(&typed_normalized, &candidate_normalized);

    let similarity = if total == 0 {
        1.0
    } else {
        (2 * matched) as f64 / total as f64
    };
    let is_correct = 200 * matched >= usize::from(tolerance.min(100)) * total;

    MatchResult {
        is_correct,
        similarity,
        candidate: candidate.to_string(),
    }
}

/// Grade a typed answer against every answer an answer field accepts.
pub fn grade(typed: &str, answer_field: &str, tolerance: u8, ignore_accents: bool) -> Grade {
    let acceptable = expand_answers(answer_field);
    let matched = acceptable
        .iter()
        .map(|candidate| is_acceptable(typed, candidate, tolerance, ignore_accents))
        .find(|result| result.is_correct)
        .map(|result| result.candidate);

    Grade {
        correct: matched.is_some(),
        matched,
        acceptable,
    }
}

/// Lowercase, and with `ignore_accents` strip combining marks after NFD.
pub fn normalize(text: &str, ignore_accents: bool) -> String {
    if ignore_accents {
        remove_accents(text).to_lowercase()
    } else {
        text.to_lowercase()
    }
}

fn remove_accents(s: &str) -> String {
    s.nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect()
}

/// Calculate the Ratcliff-Obershelp similarity ratio (0.0 to 1.0).
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let total = a_chars.len() + b_chars.len();
    if total == 0 {
        return 1.0; // Both empty strings are identical
    }
    (2 * matching_characters(&a_chars, &b_chars)) as f64 / total as f64
}

/// Total characters in the matching blocks of `a` and `b`.
pub fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        total += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }

    total
}

/// Longest common run of `a[alo..ahi]` and `b[blo..bhi]`, earliest in `a` on ties.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let mut best = (alo, blo, 0);
    let width = bhi - blo;

    // Two rows of run lengths, column 0 stays zero
    let mut prev = vec![0usize; width + 1];
    let mut curr = vec![0usize; width + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let col = j - blo + 1;
            curr[col] = if a[i] == b[j] { prev[col - 1] + 1 } else { 0 };
            if curr[col] > best.2 {
                best = (i + 1 - curr[col], j + 1 - curr[col], curr[col]);
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    best
}
