//! Vocabulary drill engine shared by the backend service.
//!
//! Provides:
//! - Answer expansion for comma alternatives and optional `(text)`
//! - Fuzzy answer matching with a similarity tolerance
//! - Practice sets with a shuffled queue, cursor and attempt history
//! - Practice sessions tracking both directions and their mistakes
//! - Snapshot save and restore through a pluggable progress store
//! - Exercise tables (TSV/CSV) and the collaborator contracts

pub mod collab;
pub mod error;
pub mod exercise;
pub mod expand;
pub mod matching;
pub mod practice_set;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod types;

pub use collab::{generate_exercise, normalize_word_list, pronounce, CollaboratorError, Pronouncer, WordListSource};
pub use error::{ExerciseError, PracticeError, Result, SnapshotError, StoreError};
pub use exercise::{language_code, parse_table, Exercise, TableFormat};
pub use expand::{expand_answers, expand_optional};
pub use matching::{grade, is_acceptable, similarity_ratio, Grade, MatchResult, DEFAULT_TOLERANCE};
pub use practice_set::{PracticeSet, SetSummary};
pub use session::{PracticeSession, Prompt, Submission};
pub use snapshot::{ProgressSnapshot, SNAPSHOT_VERSION};
pub use store::{make_key, MemoryBackend, ProgressBackend, ProgressStore, PROGRESS_KEY};
pub use types::{
    AttemptRecord, Direction, Feedback, FeedbackKind, Mode, ReviewFilter, SetState, Utterance, WordPair,
};
