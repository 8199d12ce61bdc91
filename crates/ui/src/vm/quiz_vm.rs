use quiz_core::model::QuizId;
use services::{QuizLoopService, QuizPhase, QuizProgress, QuizSession, ReviewItem, SessionError};

use crate::views::ViewError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizIntent {
    /// Choose the option at this position for the question on screen.
    Select(usize),
    Next,
    Previous,
    Restart,
}

/// Screen state for one quiz: the session plus the radio selection that has
/// not been submitted yet.
pub struct QuizVm {
    session: QuizSession,
    selected: Option<usize>,
}

impl QuizVm {
    #[must_use]
    pub fn new(session: QuizSession) -> Self {
        let mut vm = Self {
            session,
            selected: None,
        };
        vm.sync_selection();
        vm
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.session.phase()
    }

    #[must_use]
    pub fn title(&self) -> String {
        format!("{} Quiz", self.session.quiz_id())
    }

    #[must_use]
    pub fn question_header(&self) -> Option<String> {
        self.session
            .current_question()
            .map(|question| format!("Question {}", question.number()))
    }

    #[must_use]
    pub fn prompt(&self) -> Option<&str> {
        self.session.current_question().map(|question| question.prompt())
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        self.session
            .current_question()
            .map(|question| question.options())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn select(&mut self, position: usize) {
        if position < self.options().len() {
            self.selected = Some(position);
        }
    }

    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.session.cursor() > 0
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        self.session.progress()
    }

    #[must_use]
    pub fn progress_label(&self) -> String {
        let progress = self.progress();
        format!("{} of {}", (progress.cursor + 1).min(progress.total), progress.total)
    }

    #[must_use]
    pub fn score_label(&self) -> String {
        format!("Your score: {}", self.session.score())
    }

    #[must_use]
    pub fn review(&self) -> Vec<ReviewItem> {
        self.session.incorrect_answers()
    }

    /// # Errors
    ///
    /// Returns `ViewError::NoSelection` when an answer is required but none is
    /// selected, `ViewError::Unknown` for other failures.
    pub fn next(&mut self, quiz_loop: &QuizLoopService) -> Result<(), ViewError> {
        let answer = self
            .selected
            .and_then(|position| self.options().get(position).cloned());
        match quiz_loop.next(&mut self.session, answer) {
            Ok(_) => {
                self.sync_selection();
                Ok(())
            }
            Err(SessionError::NoSelection) => Err(ViewError::NoSelection),
            Err(_) => Err(ViewError::Unknown),
        }
    }

    pub fn previous(&mut self, quiz_loop: &QuizLoopService) {
        quiz_loop.previous(&mut self.session);
        self.sync_selection();
    }

    pub fn restart(&mut self, quiz_loop: &QuizLoopService) {
        quiz_loop.restart(&mut self.session);
        self.sync_selection();
    }

    /// Pre-select the answer already recorded for the question on screen.
    fn sync_selection(&mut self) {
        self.selected = self.session.current_question().and_then(|question| {
            self.session
                .selected_for_current()
                .and_then(|answer| question.option_position(answer))
        });
    }
}

/// # Errors
///
/// Returns `ViewError::LoadFailed` when the quiz cannot be loaded.
pub async fn start_quiz(quiz_loop: &QuizLoopService, quiz_id: &str) -> Result<QuizVm, ViewError> {
    let quiz_id = QuizId::new(quiz_id).map_err(|_| ViewError::LoadFailed)?;
    let session = quiz_loop
        .start_quiz(quiz_id)
        .await
        .map_err(|_| ViewError::LoadFailed)?;
    Ok(QuizVm::new(session))
}

/// # Errors
///
/// Returns `ViewError::NoQuizzes` when there is nothing to take and
/// `ViewError::Unknown` when the sources cannot be listed.
pub async fn list_quizzes(quiz_loop: &QuizLoopService) -> Result<Vec<String>, ViewError> {
    let ids = quiz_loop
        .list_quizzes()
        .await
        .map_err(|_| ViewError::Unknown)?;
    if ids.is_empty() {
        return Err(ViewError::NoQuizzes);
    }
    Ok(ids.iter().map(ToString::to_string).collect())
}
