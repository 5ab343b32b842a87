//! Quiz game state machine.
//!
//! Questions load asynchronously; the game then walks through them one at a
//! time, revealing whether each answer was right before moving on, and ends
//! on a score screen with an optional review of every question.

use std::time::Duration;

use crate::models::Question;

/// How long the correct/incorrect reveal stays up before advancing.
pub const REVEAL_DURATION: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizPhase {
    Loading,
    /// Load finished with nothing to play (empty list or failed request)
    Empty,
    InProgress,
    Complete,
    Reviewing,
}

/// Verdict for an answered question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerVerdict {
    Correct,
    Incorrect,
    Unanswered,
}

impl AnswerVerdict {
    pub fn label(&self) -> &'static str {
        match self {
            AnswerVerdict::Correct => "Correct",
            AnswerVerdict::Incorrect => "Incorrect",
            AnswerVerdict::Unanswered => "No answer",
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuizGame {
    phase: QuizPhase,
    questions: Vec<Question>,
    current: usize,
    score: usize,
    /// Answer picked for the current question while its result is shown
    selected: Option<usize>,
    user_answers: Vec<Option<usize>>,
    review_index: usize,
    load_error: Option<String>,
}

impl Default for QuizGame {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizGame {
    pub fn new() -> Self {
        Self {
            phase: QuizPhase::Loading,
            questions: Vec::new(),
            current: 0,
            score: 0,
            selected: None,
            user_answers: Vec::new(),
            review_index: 0,
            load_error: None,
        }
    }

    // ===== Loading =====

    /// Start a fresh game with the loaded questions
    pub fn load(&mut self, questions: Vec<Question>) {
        let count = questions.len();
        *self = Self::new();
        self.questions = questions;
        self.user_answers = vec![None; count];
        self.phase = if count == 0 {
            QuizPhase::Empty
        } else {
            QuizPhase::InProgress
        };
    }

    /// Record a failed load. Renders the same as an empty quiz.
    pub fn load_failed(&mut self, message: impl Into<String>) {
        self.load(Vec::new());
        self.load_error = Some(message.into());
    }

    /// Reset to the loading state; the caller fetches questions again
    pub fn restart(&mut self) {
        *self = Self::new();
    }

    // ===== Accessors =====

    pub fn phase(&self) -> &QuizPhase {
        &self.phase
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            QuizPhase::InProgress => self.questions.get(self.current),
            _ => None,
        }
    }

    pub fn score(&self) -> usize {
        self.score
    }

    /// Score as a whole percentage, 0 for an empty quiz
    pub fn percentage(&self) -> u32 {
        if self.questions.is_empty() {
            return 0;
        }
        ((self.score as f64 / self.questions.len() as f64) * 100.0).round() as u32
    }

    /// Fraction of the quiz reached, counting the current question
    pub fn progress(&self) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        (self.current + 1).min(self.questions.len()) as f64 / self.questions.len() as f64
    }

    /// Answer picked for the current question, while its result is shown
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_showing_result(&self) -> bool {
        self.selected.is_some()
    }

    pub fn user_answer(&self, index: usize) -> Option<usize> {
        self.user_answers.get(index).copied().flatten()
    }

    // ===== Play =====

    /// Answer the current question.
    ///
    /// Returns whether the answer was correct, or `None` when the answer is
    /// ignored (result already showing, wrong phase, or out of range).
    pub fn answer(&mut self, choice: usize) -> Option<bool> {
        if self.phase != QuizPhase::InProgress || self.selected.is_some() {
            return None;
        }
        let question = self.questions.get(self.current)?;
        if choice >= question.answers.len() {
            return None;
        }

        let correct = question.is_correct(choice);
        self.selected = Some(choice);
        if let Some(slot) = self.user_answers.get_mut(self.current) {
            *slot = Some(choice);
        }
        if correct {
            self.score += 1;
        }
        Some(correct)
    }

    /// Move past the revealed result to the next question, or finish.
    /// Does nothing unless a result is showing.
    pub fn advance(&mut self) {
        if self.phase != QuizPhase::InProgress || self.selected.is_none() {
            return;
        }
        self.selected = None;
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        } else {
            self.phase = QuizPhase::Complete;
        }
    }

    // ===== Review =====

    pub fn start_review(&mut self) {
        if self.phase == QuizPhase::Complete {
            self.phase = QuizPhase::Reviewing;
            self.review_index = 0;
        }
    }

    pub fn back_to_score(&mut self) {
        if self.phase == QuizPhase::Reviewing {
            self.phase = QuizPhase::Complete;
        }
    }

    pub fn next_review(&mut self) {
        if self.review_index + 1 < self.questions.len() {
            self.review_index += 1;
        }
    }

    pub fn prev_review(&mut self) {
        self.review_index = self.review_index.saturating_sub(1);
    }

    pub fn review_index(&self) -> usize {
        self.review_index
    }

    pub fn review_question(&self) -> Option<&Question> {
        match self.phase {
            QuizPhase::Reviewing => self.questions.get(self.review_index),
            _ => None,
        }
    }

    pub fn verdict(&self, index: usize) -> AnswerVerdict {
        match (self.questions.get(index), self.user_answer(index)) {
            (Some(q), Some(answer)) if q.is_correct(answer) => AnswerVerdict::Correct,
            (Some(_), Some(_)) => AnswerVerdict::Incorrect,
            _ => AnswerVerdict::Unanswered,
        }
    }
}
