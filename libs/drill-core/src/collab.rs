//! Contracts for the external services a drill depends on.
//!
//! Speech synthesis and language-model word extraction live outside this
//! crate; they are reached only through these traits.

use std::collections::HashSet;

use thiserror::Error;

use crate::error::ExerciseError;
use crate::exercise::Exercise;
use crate::types::{Utterance, WordPair};

/// Failure reported by an external collaborator.
#[derive(Debug, Error)]
#[error("{service}: {message}")]
pub struct CollaboratorError {
    pub service: &'static str,
    pub message: String,
}

impl From<CollaboratorError> for ExerciseError {
    fn from(err: CollaboratorError) -> Self {
        ExerciseError::Collaborator(err.to_string())
    }
}

/// Text-to-speech service.
pub trait Pronouncer: Send + Sync {
    /// Audio for `text` spoken in the language with the given two-letter code.
    fn speak(&self, text: &str, language_code: &str) -> Result<Vec<u8>, CollaboratorError>;
}

/// Speak an utterance through a pronouncer.
pub fn pronounce(pronouncer: &dyn Pronouncer, utterance: &Utterance) -> Result<Vec<u8>, CollaboratorError> {
    pronouncer.speak(&utterance.text, &utterance.language_code)
}

/// Word extraction and translation service.
pub trait WordListSource: Send + Sync {
    /// Dictionary-form words found in `text`.
    fn extract_words(&self, text: &str, language: &str) -> Result<Vec<String>, CollaboratorError>;

    /// `(original, translation)` for each word.
    fn translate(
        &self,
        words: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<(String, String)>, CollaboratorError>;
}

/// Trim, drop empties, deduplicate ignoring case (first spelling wins) and
/// sort ignoring case.
pub fn normalize_word_list(words: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique: Vec<String> = words
        .into_iter()
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty() && seen.insert(w.to_lowercase()))
        .collect();
    unique.sort_by_key(|w| w.to_lowercase());
    unique
}

/// Build an exercise from free text by extracting and translating its words.
pub fn generate_exercise(
    source: &dyn WordListSource,
    name: &str,
    text: &str,
    source_language: &str,
    target_language: &str,
) -> Result<Exercise, ExerciseError> {
    let words = normalize_word_list(source.extract_words(text, source_language)?);
    if words.is_empty() {
        return Err(ExerciseError::Empty);
    }

    let pairs = source
        .translate(&words, source_language, target_language)?
        .into_iter()
        .map(|(original, translation)| (original.trim().to_string(), translation.trim().to_string()))
        .filter(|(original, translation)| !original.is_empty() && !translation.is_empty())
        .map(|(original, translation)| WordPair::new(original, translation))
        .collect();

    Exercise::new(name, source_language, target_language, pairs)
}
