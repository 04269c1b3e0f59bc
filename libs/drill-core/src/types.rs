//! Core types for vocabulary drilling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One vocabulary entry: a word in the source language and its translation.
///
/// The language labels live on the session; two pairs are the same entry when
/// both words are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WordPair {
    pub source: String,
    pub target: String,
}

impl WordPair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Which side of a pair is the prompt and which is the expected answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Source word shown, target word expected.
    Forward,
    /// Target word shown, source word expected.
    Backward,
}

impl Direction {
    pub const BOTH: [Direction; 2] = [Direction::Forward, Direction::Backward];

    /// Human label, `"{prompt language} to {answer language}"`.
    pub fn label(self, source_language: &str, target_language: &str) -> String {
        match self {
            Self::Forward => format!("{} to {}", source_language, target_language),
            Self::Backward => format!("{} to {}", target_language, source_language),
        }
    }

    /// Whether the two directions of a language pair get different labels.
    /// `"a to a"` and `"a"` both label as `"a to a to a"`, for example.
    pub fn has_distinct_labels(source_language: &str, target_language: &str) -> bool {
        Self::Forward.label(source_language, target_language)
            != Self::Backward.label(source_language, target_language)
    }

    /// Resolve a human label back to a direction.
    pub fn from_label(label: &str, source_language: &str, target_language: &str) -> Option<Self> {
        Self::BOTH
            .into_iter()
            .find(|d| d.label(source_language, target_language) == label)
    }

    pub fn prompt(self, pair: &WordPair) -> &str {
        match self {
            Self::Forward => &pair.source,
            Self::Backward => &pair.target,
        }
    }

    pub fn answer(self, pair: &WordPair) -> &str {
        match self {
            Self::Forward => &pair.target,
            Self::Backward => &pair.source,
        }
    }

    pub fn prompt_language<'a>(self, source_language: &'a str, target_language: &'a str) -> &'a str {
        match self {
            Self::Forward => source_language,
            Self::Backward => target_language,
        }
    }

    pub fn answer_language<'a>(self, source_language: &'a str, target_language: &'a str) -> &'a str {
        self.reversed().prompt_language(source_language, target_language)
    }

    pub fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    /// Get the direction name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        }
    }

    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "forward" => Some(Self::Forward),
            "backward" => Some(Self::Backward),
            _ => None,
        }
    }
}

/// Whether a direction is drilled from the full list or from its mistakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Practice,
    Mistakes,
}

impl Default for Mode {
    fn default() -> Self {
        Self::Practice
    }
}

/// One submitted answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub question: String,
    pub your_answer: String,
    pub correct_answer: String,
    pub correct: bool,
    pub timestamp: DateTime<Utc>,
    pub word_pair: WordPair,
}

/// Feedback category shown after a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Success,
    Error,
}

impl FeedbackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Transient message about the most recent submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub message: String,
}

impl Feedback {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FeedbackKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FeedbackKind::Error,
            message: message.into(),
        }
    }
}

/// Lifecycle of a practice set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetState {
    NotStarted,
    InProgress,
    Exhausted,
}

/// Filter for reviewing past answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewFilter {
    All,
    Correct,
    Incorrect,
}

impl Default for ReviewFilter {
    fn default() -> Self {
        Self::All
    }
}

impl ReviewFilter {
    pub fn accepts(self, attempt: &AttemptRecord) -> bool {
        match self {
            Self::All => true,
            Self::Correct => attempt.correct,
            Self::Incorrect => !attempt.correct,
        }
    }
}

/// Text most recently queued for pronunciation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub text: String,
    pub language_code: String,
}
