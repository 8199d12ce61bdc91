mod grading;
mod ids;
mod progress;
mod question;

pub use grading::{IncorrectAnswer, Score, incorrect_answers, score};
pub use ids::{ParseIdError, QuestionIndex, QuizId, QuizIdError};
pub use progress::{AnswerRecord, ProgressMap, ProgressMapError};
pub use question::{OPTION_SEPARATOR, Question, QuestionError, QuestionSet, REQUIRED_COLUMNS};
