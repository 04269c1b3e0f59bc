//! Practice session: every practice and mistake set of one exercise.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{PracticeError, Result};
use crate::exercise::{language_code, Exercise};
use crate::matching::{grade, DEFAULT_TOLERANCE};
use crate::practice_set::{PracticeSet, SetSummary};
use crate::types::{AttemptRecord, Direction, Feedback, Mode, ReviewFilter, Utterance, WordPair};

/// Practice set, mistake set and mistakes list of one direction.
///
/// A pair is in `mistakes` exactly when it is in `mistake_practice`'s queue.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct DirectionProgress {
    pub(crate) practice: PracticeSet,
    pub(crate) mistake_practice: PracticeSet,
    pub(crate) mistakes: Vec<WordPair>,
}

impl DirectionProgress {
    fn set(&self, mode: Mode) -> &PracticeSet {
        match mode {
            Mode::Practice => &self.practice,
            Mode::Mistakes => &self.mistake_practice,
        }
    }

    fn set_mut(&mut self, mode: Mode) -> &mut PracticeSet {
        match mode {
            Mode::Practice => &mut self.practice,
            Mode::Mistakes => &mut self.mistake_practice,
        }
    }
}

/// The word currently asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub question: String,
    pub prompt_language: String,
    pub answer_language: String,
    pub word_pair: WordPair,
}

/// Outcome of grading one submitted answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub correct: bool,
    pub question: String,
    pub your_answer: String,
    /// Answer field of the word pair, as written in the list.
    pub expected: String,
    /// Acceptable answer that matched, if any.
    pub matched: Option<String>,
    pub acceptable: Vec<String>,
    pub feedback: Feedback,
    pub summary: SetSummary,
}

/// All progress for one loaded exercise.
#[derive(Debug, Clone, PartialEq)]
pub struct PracticeSession {
    pub(crate) exercise_name: String,
    pub(crate) source_language: String,
    pub(crate) target_language: String,
    pub(crate) original_word_list: Vec<WordPair>,
    pub(crate) forward: DirectionProgress,
    pub(crate) backward: DirectionProgress,
    pub(crate) tolerance: u8,
    pub(crate) ignore_accents: bool,
    pub(crate) last_utterance: Option<Utterance>,
}

impl PracticeSession {
    /// Start a session over a freshly loaded exercise.
    pub fn new(exercise: Exercise) -> Self {
        Self::new_with_rng(exercise, &mut rand::thread_rng())
    }

    pub fn new_with_rng<R: Rng + ?Sized>(exercise: Exercise, rng: &mut R) -> Self {
        let mut session = Self {
            exercise_name: String::new(),
            source_language: String::new(),
            target_language: String::new(),
            original_word_list: Vec::new(),
            forward: DirectionProgress::default(),
            backward: DirectionProgress::default(),
            tolerance: DEFAULT_TOLERANCE,
            ignore_accents: false,
            last_utterance: None,
        };
        session.setup_new_exercise_with_rng(exercise, rng);
        session
    }

    /// Replace all content with a new exercise. Tolerance and accent settings
    /// carry over.
    pub fn setup_new_exercise(&mut self, exercise: Exercise) {
        self.setup_new_exercise_with_rng(exercise, &mut rand::thread_rng());
    }

    pub fn setup_new_exercise_with_rng<R: Rng + ?Sized>(&mut self, exercise: Exercise, rng: &mut R) {
        self.exercise_name = exercise.name;
        self.source_language = exercise.source_language;
        self.target_language = exercise.target_language;
        self.original_word_list = exercise.pairs;
        self.last_utterance = None;

        let words = self.original_word_list.clone();
        for direction in Direction::BOTH {
            let progress = self.progress_mut(direction);
            *progress = DirectionProgress::default();
            progress.practice.reset_with_rng(&words, rng);
        }
    }

    pub fn exercise_name(&self) -> &str {
        &self.exercise_name
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub fn original_word_list(&self) -> &[WordPair] {
        &self.original_word_list
    }

    pub fn tolerance(&self) -> u8 {
        self.tolerance
    }

    /// Set the typo tolerance, clamped to 100.
    pub fn set_tolerance(&mut self, tolerance: u8) {
        self.tolerance = tolerance.min(100);
    }

    pub fn ignore_accents(&self) -> bool {
        self.ignore_accents
    }

    pub fn set_ignore_accents(&mut self, ignore_accents: bool) {
        self.ignore_accents = ignore_accents;
    }

    pub fn direction_label(&self, direction: Direction) -> String {
        direction.label(&self.source_language, &self.target_language)
    }

    /// Resolve a `"{X} to {Y}"` label for this exercise.
    pub fn direction_by_label(&self, label: &str) -> Result<Direction> {
        Direction::from_label(label, &self.source_language, &self.target_language)
            .ok_or_else(|| PracticeError::UnknownDirection(label.to_string()))
    }

    pub(crate) fn progress(&self, direction: Direction) -> &DirectionProgress {
        match direction {
            Direction::Forward => &self.forward,
            Direction::Backward => &self.backward,
        }
    }

    pub(crate) fn progress_mut(&mut self, direction: Direction) -> &mut DirectionProgress {
        match direction {
            Direction::Forward => &mut self.forward,
            Direction::Backward => &mut self.backward,
        }
    }

    pub fn practice_set(&self, direction: Direction, mode: Mode) -> &PracticeSet {
        self.progress(direction).set(mode)
    }

    pub fn mistakes(&self, direction: Direction) -> &[WordPair] {
        &self.progress(direction).mistakes
    }

    /// Flag a pair as a mistake in one direction. Adding it twice is a no-op.
    pub fn add_mistake(&mut self, pair: &WordPair, direction: Direction) -> bool {
        let progress = self.progress_mut(direction);
        if progress.mistakes.contains(pair) {
            return false;
        }
        progress.mistakes.push(pair.clone());
        if !progress.mistake_practice.contains(pair) {
            progress.mistake_practice.push_word(pair.clone());
        }
        true
    }

    /// Clear a pair's mistake flag in one direction. Removing an absent pair is a no-op.
    pub fn remove_from_mistakes(&mut self, pair: &WordPair, direction: Direction) -> bool {
        let progress = self.progress_mut(direction);
        let before = progress.mistakes.len();
        progress.mistakes.retain(|p| p != pair);
        let removed_from_queue = progress.mistake_practice.remove_word(pair);
        before != progress.mistakes.len() || removed_from_queue
    }

    /// Reshuffle the full word list for a direction and forget its progress.
    pub fn reset_practice_progress(&mut self, direction: Direction) {
        self.reset_practice_progress_with_rng(direction, &mut rand::thread_rng());
    }

    pub fn reset_practice_progress_with_rng<R: Rng + ?Sized>(&mut self, direction: Direction, rng: &mut R) {
        let words = self.original_word_list.clone();
        self.progress_mut(direction).practice.reset_with_rng(&words, rng);
    }

    /// Rebuild a direction's mistake set from its current mistakes.
    pub fn reset_mistakes_progress(&mut self, direction: Direction) {
        self.reset_mistakes_progress_with_rng(direction, &mut rand::thread_rng());
    }

    pub fn reset_mistakes_progress_with_rng<R: Rng + ?Sized>(&mut self, direction: Direction, rng: &mut R) {
        let progress = self.progress_mut(direction);
        let words = progress.mistakes.clone();
        progress.mistake_practice.reset_with_rng(&words, rng);
    }

    pub fn reset(&mut self, direction: Direction, mode: Mode) {
        match mode {
            Mode::Practice => self.reset_practice_progress(direction),
            Mode::Mistakes => self.reset_mistakes_progress(direction),
        }
    }

    /// Enter a set. A set with no saved progress is reshuffled first; a set
    /// with progress is resumed where it stopped.
    pub fn begin(&mut self, direction: Direction, mode: Mode) -> SetSummary {
        self.begin_with_rng(direction, mode, &mut rand::thread_rng())
    }

    pub fn begin_with_rng<R: Rng + ?Sized>(&mut self, direction: Direction, mode: Mode, rng: &mut R) -> SetSummary {
        let set = self.practice_set(direction, mode);
        if !set.is_started() && set.attempts().is_empty() {
            match mode {
                Mode::Practice => self.reset_practice_progress_with_rng(direction, rng),
                Mode::Mistakes => self.reset_mistakes_progress_with_rng(direction, rng),
            }
        }
        let set = self.progress_mut(direction).set_mut(mode);
        set.start();
        set.summary()
    }

    /// The word waiting to be answered in a set.
    pub fn current_prompt(&self, direction: Direction, mode: Mode) -> Result<Prompt> {
        let pair = self.practice_set(direction, mode).current_pair()?;
        Ok(Prompt {
            question: direction.prompt(pair).to_string(),
            prompt_language: direction
                .prompt_language(&self.source_language, &self.target_language)
                .to_string(),
            answer_language: direction
                .answer_language(&self.source_language, &self.target_language)
                .to_string(),
            word_pair: pair.clone(),
        })
    }

    /// Record an answer given while practising the full list, updating the
    /// direction's mistakes from the verdict.
    pub fn record_practice_answer(
        &mut self,
        direction: Direction,
        question: &str,
        your_answer: &str,
        correct_answer: &str,
        correct: bool,
        pair: WordPair,
    ) {
        self.progress_mut(direction)
            .practice
            .record_attempt(question, your_answer, correct_answer, correct, pair.clone());
        if correct {
            self.remove_from_mistakes(&pair, direction);
        } else {
            self.add_mistake(&pair, direction);
        }
    }

    /// Record an answer given while practising mistakes.
    pub fn record_mistake_answer(
        &mut self,
        direction: Direction,
        question: &str,
        your_answer: &str,
        correct_answer: &str,
        correct: bool,
        pair: WordPair,
    ) {
        self.progress_mut(direction)
            .mistake_practice
            .record_attempt(question, your_answer, correct_answer, correct, pair);
    }

    /// Grade an answer for the current word and advance the set.
    ///
    /// Nothing changes when the set has no current word.
    pub fn submit_answer(&mut self, direction: Direction, mode: Mode, your_answer: &str) -> Result<Submission> {
        let pair = self.practice_set(direction, mode).current_pair()?.clone();
        let question = direction.prompt(&pair).to_string();
        let expected = direction.answer(&pair).to_string();

        let verdict = grade(your_answer, &expected, self.tolerance, self.ignore_accents);
        let feedback = match &verdict.matched {
            Some(matched) => Feedback::success(format!("Correct! Your answer: **{}**", matched)),
            None => Feedback::error(format!(
                "Incorrect! Your answer: **{}**. Acceptable answers were: **{}**",
                your_answer,
                verdict.acceptable.join(", ")
            )),
        };

        match mode {
            Mode::Practice => self.record_practice_answer(
                direction,
                &question,
                your_answer,
                &expected,
                verdict.correct,
                pair,
            ),
            Mode::Mistakes => self.record_mistake_answer(
                direction,
                &question,
                your_answer,
                &expected,
                verdict.correct,
                pair,
            ),
        }

        let answer_language = direction.answer_language(&self.source_language, &self.target_language);
        self.last_utterance = Some(Utterance {
            text: expected.clone(),
            language_code: language_code(answer_language).to_string(),
        });

        let set = self.progress_mut(direction).set_mut(mode);
        set.set_feedback(Some(feedback.clone()));

        Ok(Submission {
            correct: verdict.correct,
            question,
            your_answer: your_answer.to_string(),
            expected,
            matched: verdict.matched,
            acceptable: verdict.acceptable,
            feedback,
            summary: set.summary(),
        })
    }

    /// Flip the verdict of the last answer in a set. In practice mode the
    /// pair moves into or out of the direction's mistakes accordingly.
    pub fn change_assessment(&mut self, direction: Direction, mode: Mode) -> Result<AttemptRecord> {
        let attempt = self
            .progress_mut(direction)
            .set_mut(mode)
            .revert_last_assessment()?
            .clone();

        if mode == Mode::Practice {
            if attempt.correct {
                self.remove_from_mistakes(&attempt.word_pair, direction);
            } else {
                self.add_mistake(&attempt.word_pair, direction);
            }
        }

        let feedback = if attempt.correct {
            Feedback::success(format!("Corrected to correct. Your answer: **{}**", attempt.your_answer))
        } else {
            Feedback::error(format!("Corrected to incorrect. Your answer: **{}**", attempt.your_answer))
        };
        self.progress_mut(direction).set_mut(mode).set_feedback(Some(feedback));

        Ok(attempt)
    }

    /// Remove the last answered word from a set, with its attempt, and clear
    /// its mistake flag for the direction.
    pub fn drop_current_question(&mut self, direction: Direction, mode: Mode) -> Result<WordPair> {
        let removed = self.progress_mut(direction).set_mut(mode).drop_current_question()?;
        self.remove_from_mistakes(&removed, direction);
        Ok(removed)
    }

    pub fn summary(&self, direction: Direction, mode: Mode) -> SetSummary {
        self.practice_set(direction, mode).summary()
    }

    pub fn review(&self, direction: Direction, mode: Mode, filter: ReviewFilter) -> Vec<&AttemptRecord> {
        self.practice_set(direction, mode).review(filter)
    }

    /// Prompt text of the current word, ready for the pronouncer.
    pub fn prompt_utterance(&self, direction: Direction, mode: Mode) -> Result<Utterance> {
        let prompt = self.current_prompt(direction, mode)?;
        Ok(Utterance {
            text: prompt.question,
            language_code: language_code(&prompt.prompt_language).to_string(),
        })
    }

    /// Expected answer of the last graded submission.
    pub fn answer_utterance(&self) -> Result<&Utterance> {
        self.last_utterance.as_ref().ok_or(PracticeError::NothingToPronounce)
    }
}
