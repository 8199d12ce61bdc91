use std::fmt;

use crate::model::progress::{AnswerRecord, ProgressMap};
use crate::model::question::{Question, QuestionSet};

/// Correct answers out of the total question count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.correct, self.total)
    }
}

/// A recorded answer that does not match the correct option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncorrectAnswer<'a> {
    pub question: &'a Question,
    pub record: &'a AnswerRecord,
}

/// Count recorded answers equal to their question's correct option.
///
/// Unrecorded questions count against the total but never as correct. Entries
/// whose index is outside the set are ignored.
#[must_use]
pub fn score(questions: &QuestionSet, progress: &ProgressMap) -> Score {
    let correct = progress
        .iter()
        .filter_map(|(index, record)| questions.get(index).map(|q| (q, record)))
        .filter(|(question, record)| question.is_correct(record.selected()))
        .count();

    Score {
        correct,
        total: questions.len(),
    }
}

/// Recorded answers that differ from the correct option, in index order.
#[must_use]
pub fn incorrect_answers<'a>(
    questions: &'a QuestionSet,
    progress: &'a ProgressMap,
) -> Vec<IncorrectAnswer<'a>> {
    progress
        .iter()
        .filter_map(|(index, record)| {
            let question = questions.get(index)?;
            (!question.is_correct(record.selected())).then_some(IncorrectAnswer { question, record })
        })
        .collect()
}
