//! Progress through one shuffled word queue.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{PracticeError, Result};
use crate::types::{AttemptRecord, Feedback, ReviewFilter, SetState, WordPair};

/// Queue, cursor and answer log for one (exercise, direction) pair.
///
/// `cursor == queue.len()` means the set is exhausted. Every recorded attempt
/// advances the cursor by one and every removal retracts one, so
/// `attempts.len() == cursor`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PracticeSet {
    pub(crate) queue: Vec<WordPair>,
    pub(crate) cursor: usize,
    pub(crate) attempts: Vec<AttemptRecord>,
    pub(crate) last_feedback: Option<Feedback>,
    pub(crate) started: bool,
}

/// Counts describing a set, for progress displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetSummary {
    pub state: SetState,
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    pub incorrect: usize,
    /// 1-based number of the word on screen, capped at `total`.
    pub position: usize,
    /// Share of the queue already answered; 1.0 once exhausted.
    pub completion: f64,
}

impl PracticeSet {
    /// Create a set over a shuffled copy of `words`.
    pub fn new(words: &[WordPair]) -> Self {
        Self::new_with_rng(words, &mut rand::thread_rng())
    }

    pub fn new_with_rng<R: Rng + ?Sized>(words: &[WordPair], rng: &mut R) -> Self {
        let mut set = Self::default();
        set.reset_with_rng(words, rng);
        set
    }

    /// Rebuild a set from saved parts without reshuffling.
    pub fn from_parts(
        queue: Vec<WordPair>,
        cursor: usize,
        attempts: Vec<AttemptRecord>,
        last_feedback: Option<Feedback>,
        started: bool,
    ) -> Result<Self> {
        if cursor > queue.len() {
            return Err(PracticeError::OutOfRange {
                cursor,
                len: queue.len(),
            });
        }
        Ok(Self {
            queue,
            cursor,
            attempts,
            last_feedback,
            started,
        })
    }

    /// Replace the queue with a fresh shuffle of `words` and forget all progress.
    pub fn reset(&mut self, words: &[WordPair]) {
        self.reset_with_rng(words, &mut rand::thread_rng());
    }

    pub fn reset_with_rng<R: Rng + ?Sized>(&mut self, words: &[WordPair], rng: &mut R) {
        self.queue = words.to_vec();
        self.queue.shuffle(rng);
        self.cursor = 0;
        self.attempts.clear();
        self.last_feedback = None;
        self.started = false;
    }

    pub fn queue(&self) -> &[WordPair] {
        &self.queue
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn attempts(&self) -> &[AttemptRecord] {
        &self.attempts
    }

    pub fn last_feedback(&self) -> Option<&Feedback> {
        self.last_feedback.as_ref()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.queue.len()
    }

    pub fn state(&self) -> SetState {
        if self.is_exhausted() && (self.started || !self.attempts.is_empty()) {
            SetState::Exhausted
        } else if self.started {
            SetState::InProgress
        } else {
            SetState::NotStarted
        }
    }

    /// Mark the set as begun without answering anything.
    pub fn start(&mut self) {
        self.started = true;
    }

    /// The word pair waiting to be answered.
    pub fn current_pair(&self) -> Result<&WordPair> {
        self.queue.get(self.cursor).ok_or(PracticeError::OutOfRange {
            cursor: self.cursor,
            len: self.queue.len(),
        })
    }

    /// Append an attempt and advance to the next word.
    pub fn record_attempt(
        &mut self,
        question: &str,
        your_answer: &str,
        correct_answer: &str,
        correct: bool,
        word_pair: WordPair,
    ) -> &AttemptRecord {
        self.record_attempt_at(question, your_answer, correct_answer, correct, word_pair, Utc::now())
    }

    pub fn record_attempt_at(
        &mut self,
        question: &str,
        your_answer: &str,
        correct_answer: &str,
        correct: bool,
        word_pair: WordPair,
        timestamp: DateTime<Utc>,
    ) -> &AttemptRecord {
        self.started = true;
        self.cursor += 1;
        self.attempts.push(AttemptRecord {
            question: question.to_string(),
            your_answer: your_answer.to_string(),
            correct_answer: correct_answer.to_string(),
            correct,
            timestamp,
            word_pair,
        });
        &self.attempts[self.attempts.len() - 1]
    }

    /// Flip the verdict of the most recent attempt. The cursor does not move.
    pub fn revert_last_assessment(&mut self) -> Result<&AttemptRecord> {
        let last = self.attempts.last_mut().ok_or(PracticeError::EmptyHistory)?;
        last.correct = !last.correct;
        Ok(&*last)
    }

    /// Take the most recently answered word out of the queue along with its attempt.
    pub fn drop_current_question(&mut self) -> Result<WordPair> {
        if self.cursor == 0 {
            return Err(PracticeError::NothingToRemove);
        }
        self.cursor -= 1;
        let removed = self.queue.remove(self.cursor);
        self.attempts.pop();
        Ok(removed)
    }

    pub fn set_feedback(&mut self, feedback: Option<Feedback>) {
        self.last_feedback = feedback;
    }

    pub fn contains(&self, pair: &WordPair) -> bool {
        self.queue.contains(pair)
    }

    /// Append a word to the end of the queue.
    pub(crate) fn push_word(&mut self, pair: WordPair) {
        self.queue.push(pair);
    }

    /// Remove a word from the queue. An already answered word takes its
    /// attempt with it and moves the cursor back, so the unanswered remainder
    /// stays in place.
    pub(crate) fn remove_word(&mut self, pair: &WordPair) -> bool {
        let Some(index) = self.queue.iter().position(|p| p == pair) else {
            return false;
        };
        self.queue.remove(index);
        if index < self.cursor {
            self.cursor -= 1;
            if let Some(answered) = self.attempts.iter().position(|a| &a.word_pair == pair) {
                self.attempts.remove(answered);
            }
        }
        true
    }

    /// Attempts matching `filter`, newest first.
    pub fn review(&self, filter: ReviewFilter) -> Vec<&AttemptRecord> {
        let mut attempts: Vec<&AttemptRecord> =
            self.attempts.iter().filter(|a| filter.accepts(a)).collect();
        attempts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        attempts
    }

    pub fn summary(&self) -> SetSummary {
        let total = self.queue.len();
        let correct = self.attempts.iter().filter(|a| a.correct).count();
        let completion = if self.is_exhausted() {
            1.0
        } else {
            self.cursor as f64 / total as f64
        };

        SetSummary {
            state: self.state(),
            total,
            answered: self.attempts.len(),
            correct,
            incorrect: self.attempts.len() - correct,
            position: (self.cursor + 1).min(total),
            completion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn words() -> Vec<WordPair> {
        vec![
            WordPair::new("dog", "köpek"),
            WordPair::new("cat", "kedi"),
            WordPair::new("bird", "kuş"),
        ]
    }

    fn answer(set: &mut PracticeSet, correct: bool) -> WordPair {
        let pair = set.current_pair().unwrap().clone();
        set.record_attempt(&pair.source, "typed", &pair.target, correct, pair.clone());
        pair
    }

    #[test]
    fn reset_shuffles_a_full_copy() {
        let mut rng = StdRng::seed_from_u64(7);
        let set = PracticeSet::new_with_rng(&words(), &mut rng);
        let mut queue = set.queue().to_vec();
        queue.sort();
        let mut expected = words();
        expected.sort();
        assert_eq!(queue, expected);
        assert_eq!(set.cursor(), 0);
        assert_eq!(set.state(), SetState::NotStarted);
    }

    #[test]
    fn recording_advances_cursor_in_step_with_attempts() {
        let mut set = PracticeSet::new(&words());
        for expected in 1..=3 {
            answer(&mut set, expected % 2 == 0);
            assert_eq!(set.cursor(), expected);
            assert_eq!(set.attempts().len(), set.cursor());
        }
        assert_eq!(set.state(), SetState::Exhausted);
        assert!(matches!(
            set.current_pair(),
            Err(PracticeError::OutOfRange { cursor: 3, len: 3 })
        ));
    }

    #[test]
    fn state_machine_walks_through_lifecycle() {
        let mut set = PracticeSet::new(&words()[..1]);
        assert_eq!(set.state(), SetState::NotStarted);
        set.start();
        assert_eq!(set.state(), SetState::InProgress);
        answer(&mut set, true);
        assert_eq!(set.state(), SetState::Exhausted);
        set.reset(&words());
        assert_eq!(set.state(), SetState::NotStarted);
        assert!(set.attempts().is_empty());
        assert_eq!(set.last_feedback(), None);
    }

    #[test]
    fn revert_flips_only_the_last_attempt() {
        let mut set = PracticeSet::new(&words());
        assert_eq!(set.revert_last_assessment(), Err(PracticeError::EmptyHistory));
        answer(&mut set, true);
        answer(&mut set, false);
        assert!(set.revert_last_assessment().unwrap().correct);
        assert_eq!(set.cursor(), 2);
        assert!(set.attempts()[0].correct);
    }

    #[test]
    fn drop_retracts_question_and_attempt() {
        let mut set = PracticeSet::new(&words());
        assert_eq!(set.drop_current_question(), Err(PracticeError::NothingToRemove));

        let answered = answer(&mut set, true);
        let removed = set.drop_current_question().unwrap();
        assert_eq!(removed, answered);
        assert_eq!(set.cursor(), 0);
        assert!(set.attempts().is_empty());
        assert_eq!(set.len(), 2);
        assert!(!set.contains(&answered));
    }

    #[test]
    fn removing_answered_word_keeps_remaining_queue() {
        let mut set = PracticeSet::new(&words());
        let first = answer(&mut set, false);
        let next = set.current_pair().unwrap().clone();
        assert!(set.remove_word(&first));
        assert_eq!(set.current_pair().unwrap(), &next);
        assert!(set.attempts().is_empty());
        assert!(!set.remove_word(&first));
    }

    #[test]
    fn removing_answered_word_takes_its_attempt() {
        let mut set = PracticeSet::new(&words());
        let first = answer(&mut set, false);
        let second = answer(&mut set, true);
        assert!(set.remove_word(&first));
        assert_eq!(set.cursor(), 1);
        assert_eq!(set.attempts().len(), 1);
        assert_eq!(set.attempts()[0].word_pair, second);

        assert_eq!(set.drop_current_question().unwrap(), second);
        assert_eq!(set.cursor(), 0);
        assert!(set.attempts().is_empty());
    }

    #[test]
    fn review_filters_newest_first() {
        let mut set = PracticeSet::new(&words());
        let start = Utc::now();
        for (offset, correct) in [(0, true), (1, false), (2, true)] {
            let pair = set.current_pair().unwrap().clone();
            set.record_attempt_at(
                &pair.source,
                "x",
                &pair.target,
                correct,
                pair.clone(),
                start + Duration::seconds(offset),
            );
        }
        let correct = set.review(ReviewFilter::Correct);
        assert_eq!(correct.len(), 2);
        assert!(correct[0].timestamp > correct[1].timestamp);
        assert_eq!(set.review(ReviewFilter::Incorrect).len(), 1);
        assert_eq!(set.review(ReviewFilter::All).len(), 3);
    }

    #[test]
    fn summary_counts() {
        let mut set = PracticeSet::new(&words());
        answer(&mut set, true);
        answer(&mut set, false);
        let summary = set.summary();
        assert_eq!(summary.correct, 1);
        assert_eq!(summary.incorrect, 1);
        assert_eq!(summary.position, 3);
        assert!((summary.completion - 2.0 / 3.0).abs() < 1e-9);

        answer(&mut set, true);
        let summary = set.summary();
        assert_eq!(summary.position, 3);
        assert_eq!(summary.completion, 1.0);

        let empty = PracticeSet::new(&[]).summary();
        assert_eq!(empty.position, 0);
        assert_eq!(empty.completion, 1.0);
        assert_eq!(empty.state, SetState::NotStarted);
    }

    #[test]
    fn from_parts_rejects_cursor_past_end() {
        assert!(PracticeSet::from_parts(words(), 4, vec![], None, true).is_err());
        let set = PracticeSet::from_parts(words(), 3, vec![], None, true).unwrap();
        assert!(set.is_exhausted());
    }
}
