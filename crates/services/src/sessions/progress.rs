/// Position within a quiz, for the question header and results screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    pub total: usize,
    pub answered: usize,
    pub cursor: usize,
    pub is_complete: bool,
}

impl QuizProgress {
    /// Questions without a recorded answer.
    #[must_use]
    pub fn unanswered(&self) -> usize {
        self.total.saturating_sub(self.answered)
    }
}
