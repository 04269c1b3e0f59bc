//! Exercise sources: two-column word tables and the language catalog.
//!
//! # Formats
//! Tab-separated text uses the first two columns of every line:
//! ```text
//! dog	köpek
//! cat	kedi	(extra columns ignored)
//! ```
//! Comma-separated text follows CSV quoting rules, so an answer field holding
//! alternatives must be quoted: `"hond, (het) beest",animal`.

use serde::{Deserialize, Serialize};

use crate::error::ExerciseError;
use crate::types::{Direction, WordPair};

/// Speech codes for the languages exercises are usually written in.
pub const LANGUAGE_CODES: &[(&str, &str)] = &[
    ("English", "en"),
    ("Turkish", "tr"),
    ("Spanish", "es"),
    ("French", "fr"),
    ("German", "de"),
    ("Italian", "it"),
    ("Dutch", "nl"),
    ("Russian", "ru"),
    ("Portuguese", "pt"),
];

/// Two-letter speech code for a language label, `en` when unknown.
pub fn language_code(label: &str) -> &'static str {
    LANGUAGE_CODES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(label.trim()))
        .map(|(_, code)| *code)
        .unwrap_or("en")
}

/// Layout of an uploaded word table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableFormat {
    Tsv,
    Csv,
}

impl TableFormat {
    /// Guess the format from a file name, `.txt` and `.tsv` being tab-separated.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".csv") {
            Some(Self::Csv)
        } else if lower.ends_with(".txt") || lower.ends_with(".tsv") {
            Some(Self::Tsv)
        } else {
            None
        }
    }
}

/// A loaded word list with its two language labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    pub source_language: String,
    pub target_language: String,
    pub pairs: Vec<WordPair>,
}

impl Exercise {
    pub fn new(
        name: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        pairs: Vec<WordPair>,
    ) -> Result<Self, ExerciseError> {
        let source_language = source_language.into().trim().to_string();
        let target_language = target_language.into().trim().to_string();
        if source_language.is_empty()
            || target_language.is_empty()
            || !Direction::has_distinct_labels(&source_language, &target_language)
        {
            return Err(ExerciseError::InvalidLanguages);
        }
        if pairs.is_empty() {
            return Err(ExerciseError::Empty);
        }

        Ok(Self {
            name: name.into(),
            source_language,
            target_language,
            pairs,
        })
    }

    /// Parse a table and label its columns.
    pub fn parse(
        name: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        content: &str,
        format: TableFormat,
    ) -> Result<Self, ExerciseError> {
        let pairs = parse_table(content, format)?;
        Self::new(name, source_language, target_language, pairs)
    }
}

/// Parse a two-column table into word pairs.
pub fn parse_table(content: &str, format: TableFormat) -> Result<Vec<WordPair>, ExerciseError> {
    let pairs = match format {
        TableFormat::Tsv => parse_tsv(content)?,
        TableFormat::Csv => parse_csv(content)?,
    };
    if pairs.is_empty() {
        return Err(ExerciseError::Empty);
    }
    Ok(pairs)
}

fn parse_tsv(content: &str) -> Result<Vec<WordPair>, ExerciseError> {
    let mut pairs = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut columns = line.split('\t').map(str::trim);
        let pair = row_to_pair(columns.next(), columns.next(), idx + 1)?;
        pairs.push(pair);
    }

    Ok(pairs)
}

fn parse_csv(content: &str) -> Result<Vec<WordPair>, ExerciseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut pairs = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        if record.iter().all(str::is_empty) {
            continue;
        }
        pairs.push(row_to_pair(record.get(0), record.get(1), line)?);
    }

    Ok(pairs)
}

fn row_to_pair(source: Option<&str>, target: Option<&str>, line: usize) -> Result<WordPair, ExerciseError> {
    match (source, target) {
        (Some(source), Some(target)) if !source.is_empty() && !target.is_empty() => {
            Ok(WordPair::new(source, target))
        }
        _ => Err(ExerciseError::MissingColumn { line }),
    }
}
