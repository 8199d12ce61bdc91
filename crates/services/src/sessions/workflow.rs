use chrono::Duration;
use std::sync::Arc;

use quiz_core::model::{QuestionIndex, QuizId};
use storage::repository::StorageError;
use tracing::{debug, info};

use crate::Clock;
use crate::error::SessionError;
use crate::progress::ProgressStore;
use crate::quizzes::QuizCatalog;
use super::service::QuizSession;

/// Result of answering a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizAnswerResult {
    pub index: QuestionIndex,
    /// Whether a progress snapshot was enqueued for this answer.
    pub flushed: bool,
    pub is_complete: bool,
}

/// Orchestrates quiz start, answering and restart with write-back of progress.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    catalog: Arc<QuizCatalog>,
    progress: ProgressStore,
    require_selection: bool,
    flush_interval: Duration,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(clock: Clock, catalog: Arc<QuizCatalog>, progress: ProgressStore) -> Self {
        Self {
            clock,
            catalog,
            progress,
            require_selection: false,
            flush_interval: Duration::zero(),
        }
    }

    #[must_use]
    pub fn with_require_selection(mut self, require_selection: bool) -> Self {
        self.require_selection = require_selection;
        self
    }

    /// Only flush on "Next" once `interval` has passed since the last flush.
    ///
    /// Completing the quiz and restarting always flush.
    #[must_use]
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Quiz ids available to start.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the sources cannot be listed.
    pub async fn list_quizzes(&self) -> Result<Vec<QuizId>, StorageError> {
        self.catalog.list_quizzes().await
    }

    /// Load questions and saved progress, resuming at the first unanswered
    /// question.
    ///
    /// Snapshots this process has already queued are committed before the
    /// progress is read, so re-entering a quiz sees the latest answers.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Load` if the questions cannot be loaded. Saved
    /// progress that cannot be read is ignored.
    pub async fn start_quiz(&self, quiz_id: QuizId) -> Result<QuizSession, SessionError> {
        let questions = self.catalog.load(&quiz_id).await?;
        self.progress.dispatcher().drain().await;
        let answers = self.progress.load(&quiz_id).await;
        let session = QuizSession::resume(quiz_id, questions, answers);
        info!(
            quiz = %session.quiz_id(),
            total = session.total(),
            cursor = session.cursor(),
            "quiz started"
        );
        Ok(session)
    }

    /// Record `selected` for the current question, flush, and advance.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` past the last question, and
    /// `SessionError::NoSelection` when a selection is required but missing.
    pub fn next(
        &self,
        session: &mut QuizSession,
        selected: Option<String>,
    ) -> Result<QuizAnswerResult, SessionError> {
        if session.is_complete() {
            return Err(SessionError::Completed);
        }
        if self.require_selection && selected.is_none() {
            return Err(SessionError::NoSelection);
        }

        let index = session.submit(selected)?;
        let is_complete = session.is_complete();
        let due = self
            .clock
            .has_elapsed(session.last_flush_at(), self.flush_interval);
        let flushed = if is_complete || due {
            self.flush(session)
        } else {
            debug!(quiz = %session.quiz_id(), %index, "flush deferred");
            false
        };

        Ok(QuizAnswerResult {
            index,
            flushed,
            is_complete,
        })
    }

    /// Step back one question without touching answers.
    pub fn previous(&self, session: &mut QuizSession) -> usize {
        session.previous()
    }

    /// Discard every answer for the quiz and start again from the first
    /// question.
    pub fn restart(&self, session: &mut QuizSession) {
        let quiz_id = session.quiz_id().clone();
        self.progress.clear(&quiz_id, session.answers_mut());
        session.reset_cursor();
        session.mark_flushed(self.clock.now());
        info!(quiz = %quiz_id, "quiz restarted");
    }

    /// Enqueue a snapshot of the session's answers now.
    pub fn flush(&self, session: &mut QuizSession) -> bool {
        let queued = self.progress.flush(session.quiz_id(), session.answers());
        if queued {
            session.mark_flushed(self.clock.now());
        }
        queued
    }
}
