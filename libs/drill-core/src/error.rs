//! Error types for drill-core.

use thiserror::Error;

/// Result type alias using PracticeError.
pub type Result<T> = std::result::Result<T, PracticeError>;

/// Errors raised by practice sets and sessions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PracticeError {
    #[error("no current word: position {cursor} of {len}")]
    OutOfRange { cursor: usize, len: usize },

    #[error("no previous answer to change assessment")]
    EmptyHistory,

    #[error("no question to remove")]
    NothingToRemove,

    #[error("unknown direction: {0}")]
    UnknownDirection(String),

    #[error("no answer to pronounce yet")]
    NothingToPronounce,
}

/// Errors that make a progress snapshot unusable.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("snapshot is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("snapshot field `{field}` is invalid: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("snapshot version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

impl SnapshotError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by the progress store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("malformed snapshot: {0}")]
    Malformed(#[from] SnapshotError),
}

/// Errors that can occur while reading an exercise table.
#[derive(Debug, Error)]
pub enum ExerciseError {
    #[error("exercise table is empty")]
    Empty,

    #[error("line {line} needs two non-empty columns")]
    MissingColumn { line: usize },

    #[error("source and target language must be non-empty and label each direction differently")]
    InvalidLanguages,

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("collaborator failed: {0}")]
    Collaborator(String),
}
