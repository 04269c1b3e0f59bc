//! Snapshot format for saving and resuming a practice session.
//!
//! # Format
//! ```json
//! {
//!   "version": 1,
//!   "source_language": "English",
//!   "target_language": "Turkish",
//!   "exercise_name": "animals",
//!   "tolerance": 80,
//!   "ignore_accents": false,
//!   "exercise_data": [{"English": "dog", "Turkish": "köpek"}],
//!   "mistakes": {"English to Turkish": [], "Turkish to English": []},
//!   "practice_sets": {
//!     "English to Turkish": {
//!       "word_list": [{"English": "dog", "Turkish": "köpek"}],
//!       "progress": [],
//!       "current_index": 0,
//!       "last_feedback_message": null,
//!       "practice_started": false
//!     }
//!   },
//!   "mistakes_sets": {}
//! }
//! ```
//!
//! `source_language`, `target_language` and `exercise_data` are required.
//! `tolerance` defaults to 80 and `ignore_accents` to false. A direction
//! missing from `practice_sets` or `mistakes_sets` starts fresh.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::matching::DEFAULT_TOLERANCE;
use crate::practice_set::PracticeSet;
use crate::session::{DirectionProgress, PracticeSession};
use crate::types::{AttemptRecord, Direction, Feedback, FeedbackKind, WordPair};

/// Newest snapshot layout this crate reads and writes.
pub const SNAPSHOT_VERSION: u32 = 1;

const REQUIRED_FIELDS: [&str; 3] = ["source_language", "target_language", "exercise_data"];

/// Word pair keyed by language label.
pub type PairRecord = BTreeMap<String, String>;

/// Serialized session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    pub source_language: String,
    pub target_language: String,
    #[serde(default)]
    pub exercise_name: String,
    #[serde(default = "default_tolerance")]
    pub tolerance: i64,
    #[serde(default)]
    pub ignore_accents: bool,
    pub exercise_data: Vec<PairRecord>,
    #[serde(default)]
    pub mistakes: BTreeMap<String, Vec<PairRecord>>,
    #[serde(default)]
    pub practice_sets: BTreeMap<String, SetRecord>,
    #[serde(default)]
    pub mistakes_sets: BTreeMap<String, SetRecord>,
}

/// Serialized practice set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
    /// Absent means the set's source list, unshuffled.
    #[serde(default)]
    pub word_list: Option<Vec<PairRecord>>,
    #[serde(default)]
    pub progress: Vec<AttemptEntry>,
    #[serde(default)]
    pub current_index: usize,
    /// `[kind, message]`
    #[serde(default)]
    pub last_feedback_message: Option<(String, String)>,
    #[serde(default)]
    pub practice_started: bool,
}

/// Serialized attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptEntry {
    pub question: String,
    pub your_answer: String,
    pub correct_answer: String,
    pub correct: bool,
    /// RFC 3339; timestamps without an offset are read as UTC.
    pub timestamp: String,
    pub word_pair: PairRecord,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

fn default_tolerance() -> i64 {
    i64::from(DEFAULT_TOLERANCE)
}

/// Serialize a session to snapshot JSON bytes.
pub fn serialize(session: &PracticeSession) -> Result<Vec<u8>, SnapshotError> {
    Ok(serde_json::to_vec(&to_snapshot(session))?)
}

/// Rebuild a session from snapshot JSON bytes.
pub fn deserialize(bytes: &[u8]) -> Result<PracticeSession, SnapshotError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    if let Some(object) = value.as_object() {
        for field in REQUIRED_FIELDS {
            if object.get(field).map_or(true, serde_json::Value::is_null) {
                return Err(SnapshotError::MissingField(field));
            }
        }
    }
    from_snapshot(serde_json::from_value(value)?)
}

/// Capture a session's full state.
pub fn to_snapshot(session: &PracticeSession) -> ProgressSnapshot {
    let codec = PairCodec::new(&session.source_language, &session.target_language);

    let mut mistakes = BTreeMap::new();
    let mut practice_sets = BTreeMap::new();
    let mut mistakes_sets = BTreeMap::new();
    for direction in Direction::BOTH {
        let label = session.direction_label(direction);
        let progress = session.progress(direction);
        mistakes.insert(label.clone(), codec.encode_all(&progress.mistakes));
        practice_sets.insert(label.clone(), codec.encode_set(&progress.practice));
        mistakes_sets.insert(label, codec.encode_set(&progress.mistake_practice));
    }

    ProgressSnapshot {
        version: SNAPSHOT_VERSION,
        source_language: session.source_language.clone(),
        target_language: session.target_language.clone(),
        exercise_name: session.exercise_name.clone(),
        tolerance: i64::from(session.tolerance),
        ignore_accents: session.ignore_accents,
        exercise_data: codec.encode_all(&session.original_word_list),
        mistakes,
        practice_sets,
        mistakes_sets,
    }
}

/// Validate a snapshot and rebuild the session it describes.
pub fn from_snapshot(snapshot: ProgressSnapshot) -> Result<PracticeSession, SnapshotError> {
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            found: snapshot.version,
            supported: SNAPSHOT_VERSION,
        });
    }

    let source = snapshot.source_language.trim();
    let target = snapshot.target_language.trim();
    if source.is_empty() {
        return Err(SnapshotError::invalid("source_language", "empty"));
    }
    if target.is_empty() || !Direction::has_distinct_labels(source, target) {
        return Err(SnapshotError::invalid(
            "target_language",
            "empty or gives both directions the same label",
        ));
    }
    let tolerance = u8::try_from(snapshot.tolerance)
        .ok()
        .filter(|t| *t <= 100)
        .ok_or_else(|| SnapshotError::invalid("tolerance", format!("{} is outside 0-100", snapshot.tolerance)))?;

    let codec = PairCodec::new(source, target);
    let original_word_list = codec.decode_all(&snapshot.exercise_data, "exercise_data")?;
    if original_word_list.is_empty() {
        return Err(SnapshotError::invalid("exercise_data", "empty"));
    }

    let labels: Vec<String> = Direction::BOTH
        .iter()
        .map(|d| d.label(source, target))
        .collect();
    for (field, keys) in [
        ("mistakes", snapshot.mistakes.keys().collect::<Vec<_>>()),
        ("practice_sets", snapshot.practice_sets.keys().collect()),
        ("mistakes_sets", snapshot.mistakes_sets.keys().collect()),
    ] {
        if let Some(unknown) = keys.into_iter().find(|k| !labels.contains(*k)) {
            return Err(SnapshotError::invalid(field, format!("unknown direction `{}`", unknown)));
        }
    }

    let mut session = PracticeSession {
        exercise_name: snapshot.exercise_name,
        source_language: source.to_string(),
        target_language: target.to_string(),
        original_word_list,
        forward: DirectionProgress::default(),
        backward: DirectionProgress::default(),
        tolerance,
        ignore_accents: snapshot.ignore_accents,
        last_utterance: None,
    };

    for (direction, label) in Direction::BOTH.into_iter().zip(&labels) {
        let mistakes = match snapshot.mistakes.get(label) {
            Some(records) => codec.decode_all(records, &format!("mistakes.{}", label))?,
            None => Vec::new(),
        };
        let mut seen = HashSet::new();
        if !mistakes.iter().all(|p| seen.insert(p)) {
            return Err(SnapshotError::invalid(format!("mistakes.{}", label), "duplicate word pair"));
        }

        let practice = codec.decode_set(
            snapshot.practice_sets.get(label),
            &session.original_word_list,
            &format!("practice_sets.{}", label),
        )?;
        let mistake_practice = codec.decode_set(
            snapshot.mistakes_sets.get(label),
            &mistakes,
            &format!("mistakes_sets.{}", label),
        )?;
        if mistake_practice.len() != mistakes.len()
            || !mistakes.iter().all(|p| mistake_practice.contains(p))
        {
            return Err(SnapshotError::invalid(
                format!("mistakes_sets.{}", label),
                "word list out of step with mistakes",
            ));
        }

        *session.progress_mut(direction) = DirectionProgress {
            practice,
            mistake_practice,
            mistakes,
        };
    }

    Ok(session)
}

/// Converts word pairs to and from label-keyed records.
struct PairCodec<'a> {
    source: &'a str,
    target: &'a str,
}

impl<'a> PairCodec<'a> {
    fn new(source: &'a str, target: &'a str) -> Self {
        Self { source, target }
    }

    fn encode(&self, pair: &WordPair) -> PairRecord {
        BTreeMap::from([
            (self.source.to_string(), pair.source.clone()),
            (self.target.to_string(), pair.target.clone()),
        ])
    }

    fn encode_all(&self, pairs: &[WordPair]) -> Vec<PairRecord> {
        pairs.iter().map(|p| self.encode(p)).collect()
    }

    fn encode_set(&self, set: &PracticeSet) -> SetRecord {
        SetRecord {
            word_list: Some(self.encode_all(set.queue())),
            progress: set
                .attempts()
                .iter()
                .map(|a| AttemptEntry {
                    question: a.question.clone(),
                    your_answer: a.your_answer.clone(),
                    correct_answer: a.correct_answer.clone(),
                    correct: a.correct,
                    timestamp: a.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                    word_pair: self.encode(&a.word_pair),
                })
                .collect(),
            current_index: set.cursor(),
            last_feedback_message: set
                .last_feedback()
                .map(|f| (f.kind.as_str().to_string(), f.message.clone())),
            practice_started: set.is_started(),
        }
    }

    fn decode(&self, record: &PairRecord, field: &str) -> Result<WordPair, SnapshotError> {
        let side = |label: &str| {
            record
                .get(label)
                .cloned()
                .ok_or_else(|| SnapshotError::invalid(field, format!("missing `{}`", label)))
        };
        Ok(WordPair::new(side(self.source)?, side(self.target)?))
    }

    fn decode_all(&self, records: &[PairRecord], field: &str) -> Result<Vec<WordPair>, SnapshotError> {
        records
            .iter()
            .enumerate()
            .map(|(i, r)| self.decode(r, &format!("{}[{}]", field, i)))
            .collect()
    }

    fn decode_set(
        &self,
        record: Option<&SetRecord>,
        source_words: &[WordPair],
        field: &str,
    ) -> Result<PracticeSet, SnapshotError> {
        let Some(record) = record else {
            return Ok(PracticeSet::new(source_words));
        };

        let queue = match &record.word_list {
            Some(words) => self.decode_all(words, &format!("{}.word_list", field))?,
            None => source_words.to_vec(),
        };

        let attempts = record
            .progress
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let entry_field = format!("{}.progress[{}]", field, i);
                Ok(AttemptRecord {
                    question: entry.question.clone(),
                    your_answer: entry.your_answer.clone(),
                    correct_answer: entry.correct_answer.clone(),
                    correct: entry.correct,
                    timestamp: parse_timestamp(&entry.timestamp, &entry_field)?,
                    word_pair: self.decode(&entry.word_pair, &format!("{}.word_pair", entry_field))?,
                })
            })
            .collect::<Result<Vec<_>, SnapshotError>>()?;

        let feedback = match &record.last_feedback_message {
            Some((kind, message)) => {
                let kind = FeedbackKind::from_str(kind).ok_or_else(|| {
                    SnapshotError::invalid(
                        format!("{}.last_feedback_message", field),
                        format!("unknown kind `{}`", kind),
                    )
                })?;
                Some(Feedback {
                    kind,
                    message: message.clone(),
                })
            }
            None => None,
        };

        PracticeSet::from_parts(
            queue,
            record.current_index,
            attempts,
            feedback,
            record.practice_started,
        )
        .map_err(|e| SnapshotError::invalid(format!("{}.current_index", field), e.to_string()))
    }
}

fn parse_timestamp(value: &str, field: &str) -> Result<DateTime<Utc>, SnapshotError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| SnapshotError::invalid(format!("{}.timestamp", field), format!("`{}` is not a timestamp", value)))
}
