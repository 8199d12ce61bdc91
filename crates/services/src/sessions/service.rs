use chrono::{DateTime, Utc};
use std::sync::Arc;

use quiz_core::model::{
    ProgressMap, Question, QuestionIndex, QuestionSet, QuizId, Score, incorrect_answers, score,
};
use tracing::warn;

use crate::error::SessionError;
use super::progress::QuizProgress;
use super::view::ReviewItem;

/// Where the taker is within a started quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    /// A question is on screen (`cursor < total`).
    Answering,
    /// Past the last question; the results screen is shown.
    Completed,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory state of one quiz being taken.
///
/// Owns the progress map for the quiz and the navigation cursor. The cursor
/// ranges over `0..=total`; `cursor == total` means the quiz is completed.
/// Nothing here touches storage: `QuizLoopService` decides when snapshots of
/// the map are flushed.
#[derive(Debug, Clone)]
pub struct QuizSession {
    quiz_id: QuizId,
    questions: Arc<QuestionSet>,
    answers: ProgressMap,
    cursor: usize,
    last_flush_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Bind loaded progress to its questions and place the cursor on the first
    /// unanswered question.
    ///
    /// Answers for indexes beyond the question set are dropped.
    #[must_use]
    pub fn resume(quiz_id: QuizId, questions: Arc<QuestionSet>, mut answers: ProgressMap) -> Self {
        let total = questions.len();
        let dropped = answers.retain_below(total);
        if !dropped.is_empty() {
            warn!(quiz = %quiz_id, dropped = dropped.len(), total, "ignoring answers beyond the question set");
        }
        let cursor = answers.first_unanswered(total);
        Self {
            quiz_id,
            questions,
            answers,
            cursor,
            last_flush_at: None,
        }
    }

    #[must_use]
    pub fn quiz_id(&self) -> &QuizId {
        &self.quiz_id
    }

    #[must_use]
    pub fn questions(&self) -> &QuestionSet {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &ProgressMap {
        &self.answers
    }

    pub(crate) fn answers_mut(&mut self) -> &mut ProgressMap {
        &mut self.answers
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        if self.cursor >= self.total() {
            QuizPhase::Completed
        } else {
            QuizPhase::Answering
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase() == QuizPhase::Completed
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(QuestionIndex::new(self.cursor))
    }

    /// Answer previously recorded for the question on screen, if any.
    #[must_use]
    pub fn selected_for_current(&self) -> Option<&str> {
        self.answers
            .get(QuestionIndex::new(self.cursor))
            .and_then(|record| record.selected())
    }

    /// Step back one question. Answers are left untouched.
    ///
    /// From the results screen this returns to the last question.
    pub fn previous(&mut self) -> usize {
        self.cursor = self.cursor.saturating_sub(1);
        self.cursor
    }

    /// Record `selected` for the current question and advance.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` if there is no current question.
    pub fn submit(&mut self, selected: Option<String>) -> Result<QuestionIndex, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        let index = QuestionIndex::new(self.cursor);
        self.answers.record(index, selected);
        self.cursor += 1;
        Ok(index)
    }

    /// Move the cursor directly, clamped to `total`.
    pub fn go_to(&mut self, cursor: usize) -> usize {
        self.cursor = cursor.min(self.total());
        self.cursor
    }

    pub(crate) fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    #[must_use]
    pub fn last_flush_at(&self) -> Option<DateTime<Utc>> {
        self.last_flush_at
    }

    pub(crate) fn mark_flushed(&mut self, at: DateTime<Utc>) {
        self.last_flush_at = Some(at);
    }

    #[must_use]
    pub fn score(&self) -> Score {
        score(&self.questions, &self.answers)
    }

    /// Recorded answers that are wrong, in question order.
    #[must_use]
    pub fn incorrect_answers(&self) -> Vec<ReviewItem> {
        incorrect_answers(&self.questions, &self.answers)
            .into_iter()
            .map(ReviewItem::from)
            .collect()
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress {
            total: self.total(),
            answered: self.answers.len(),
            cursor: self.cursor,
            is_complete: self.is_complete(),
        }
    }
}
