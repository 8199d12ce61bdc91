use quiz_core::model::{IncorrectAnswer, QuestionIndex};

/// One wrongly answered question as shown on the results screen.
///
/// Owns its strings so the UI can hold it independently of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    /// Position in the quiz; unique, unlike the free-form `number` label.
    pub index: QuestionIndex,
    pub number: String,
    pub prompt: String,
    pub options: Vec<String>,
    /// `None` when the taker advanced without choosing an option.
    pub your_answer: Option<String>,
    pub correct_answer: String,
}

impl From<IncorrectAnswer<'_>> for ReviewItem {
    fn from(answer: IncorrectAnswer<'_>) -> Self {
        Self {
            index: answer.question.index(),
            number: answer.question.number().to_string(),
            prompt: answer.question.prompt().to_string(),
            options: answer.question.options().to_vec(),
            your_answer: answer.record.selected.clone(),
            correct_answer: answer.question.correct_option().to_string(),
        }
    }
}
