//! API request and response types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use drill_core::{
    AttemptRecord, Direction, Feedback, Mode, Prompt, ReviewFilter, SetSummary, Submission, TableFormat,
    WordPair,
};
use drill_core::PracticeSession;

// === Path and Query Types ===

/// `/api/sessions/:id/:mode/:direction/...`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SetPath {
    pub id: Uuid,
    pub mode: Mode,
    pub direction: Direction,
}

/// Query parameters for attempt review
#[derive(Debug, Default, Deserialize)]
pub struct AttemptsQuery {
    #[serde(default)]
    pub filter: ReviewFilter,
}

// === Session Types ===

/// Request to start a session from an uploaded word table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub name: String,
    pub source_language: String,
    pub target_language: String,
    /// Table layout; guessed from `file_name` when absent, tab-separated otherwise.
    pub format: Option<TableFormat>,
    pub file_name: Option<String>,
    pub content: String,
}

impl CreateSessionRequest {
    pub fn table_format(&self) -> TableFormat {
        self.format
            .or_else(|| self.file_name.as_deref().and_then(TableFormat::from_file_name))
            .unwrap_or(TableFormat::Tsv)
    }
}

/// One drilling direction of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionInfo {
    pub direction: Direction,
    pub label: String,
    pub practice: SetSummary,
    pub mistakes: SetSummary,
    pub mistake_count: usize,
}

/// Overview of a live session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: Uuid,
    pub exercise_name: String,
    pub source_language: String,
    pub target_language: String,
    pub tolerance: u8,
    pub ignore_accents: bool,
    pub total_words: usize,
    pub directions: Vec<DirectionInfo>,
}

impl SessionInfo {
    pub fn from_session(session_id: Uuid, session: &PracticeSession) -> Self {
        let directions = Direction::BOTH
            .into_iter()
            .map(|direction| DirectionInfo {
                direction,
                label: session.direction_label(direction),
                practice: session.summary(direction, Mode::Practice),
                mistakes: session.summary(direction, Mode::Mistakes),
                mistake_count: session.mistakes(direction).len(),
            })
            .collect();

        Self {
            session_id,
            exercise_name: session.exercise_name().to_string(),
            source_language: session.source_language().to_string(),
            target_language: session.target_language().to_string(),
            tolerance: session.tolerance(),
            ignore_accents: session.ignore_accents(),
            total_words: session.original_word_list().len(),
            directions,
        }
    }
}

/// Response for session creation, import, restore and lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub session: SessionInfo,
    pub persisted: bool,
    /// Reason the last write of this session's progress failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_error: Option<String>,
}

impl SessionResponse {
    pub fn new(session: SessionInfo, persisted: bool, save_error: Option<String>) -> Self {
        Self {
            session,
            persisted,
            save_error,
        }
    }
}

/// Mistakes of one direction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionMistakes {
    pub direction: Direction,
    pub label: String,
    pub pairs: Vec<WordPair>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MistakesResponse {
    pub directions: Vec<DirectionMistakes>,
}

// === Practice Types ===

/// Response for begin and reset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: SetSummary,
    pub persisted: bool,
}

/// The word on screen, if any, with the set's progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentResponse {
    pub prompt: Option<Prompt>,
    pub feedback: Option<Feedback>,
    pub summary: SetSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    #[serde(flatten)]
    pub submission: Submission,
    pub persisted: bool,
}

/// Response after flipping the last verdict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentResponse {
    pub attempt: AttemptRecord,
    pub feedback: Option<Feedback>,
    pub summary: SetSummary,
    pub persisted: bool,
}

/// Response after dropping the last answered word
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropResponse {
    pub removed: WordPair,
    pub summary: SetSummary,
    pub persisted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptsResponse {
    pub filter: ReviewFilter,
    pub attempts: Vec<AttemptRecord>,
}

// === Settings Types ===

/// Request to update settings (all fields optional)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSettingsRequest {
    /// Values above 100 are clamped.
    pub tolerance: Option<u32>,
    pub ignore_accents: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub tolerance: u8,
    pub ignore_accents: bool,
    pub persisted: bool,
}
