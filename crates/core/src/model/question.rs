use std::io::Read;

use serde::Deserialize;
use thiserror::Error;

use crate::model::ids::QuestionIndex;

/// Separator used to join a question's options in a single CSV field.
pub const OPTION_SEPARATOR: char = '|';

/// Columns every question source must provide.
pub const REQUIRED_COLUMNS: [&str; 4] = ["question_number", "question", "options", "correct_option"];

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question source is missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("malformed question source: {0}")]
    Csv(String),

    #[error("row {row}: options cannot be empty")]
    EmptyOptions { row: usize },

    #[error("row {row}: correct option {correct:?} is not one of the options")]
    CorrectOptionNotFound { row: usize, correct: String },

    #[error("question source has no questions")]
    Empty,
}

impl From<csv::Error> for QuestionError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single multiple-choice question. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    index: QuestionIndex,
    number: String,
    prompt: String,
    options: Vec<String>,
    correct_option: String,
}

impl Question {
    /// Creates a validated question.
    ///
    /// Options are addressed by position, so duplicates are kept as-is.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyOptions` if `options` is empty, or
    /// `QuestionError::CorrectOptionNotFound` if `correct_option` does not match
    /// one of the options verbatim. `row` is reported 1-based.
    pub fn new(
        index: QuestionIndex,
        number: impl Into<String>,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_option: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let row = index.value() + 1;
        if options.is_empty() {
            return Err(QuestionError::EmptyOptions { row });
        }
        let correct_option = correct_option.into();
        if !options.iter().any(|option| *option == correct_option) {
            return Err(QuestionError::CorrectOptionNotFound {
                row,
                correct: correct_option,
            });
        }

        Ok(Self {
            index,
            number: number.into(),
            prompt: prompt.into(),
            options,
            correct_option,
        })
    }

    #[must_use]
    pub fn index(&self) -> QuestionIndex {
        self.index
    }

    /// Ordinal label shown to the taker ("Question 3").
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_option(&self) -> &str {
        &self.correct_option
    }

    /// True when `selected` is exactly the correct option.
    #[must_use]
    pub fn is_correct(&self, selected: Option<&str>) -> bool {
        selected == Some(self.correct_option.as_str())
    }

    /// Position of the first option equal to `selected`.
    #[must_use]
    pub fn option_position(&self, selected: &str) -> Option<usize> {
        self.options.iter().position(|option| option == selected)
    }
}

//
// ─── QUESTION SET ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct RawQuestion {
    question_number: String,
    question: String,
    options: String,
    correct_option: String,
}

fn split_options(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(OPTION_SEPARATOR).map(str::to_owned).collect()
}

/// Ordered questions of one quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    questions: Vec<Question>,
}

impl QuestionSet {
    /// Wraps already validated questions.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::Empty` if there are no questions.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionError> {
        if questions.is_empty() {
            return Err(QuestionError::Empty);
        }
        Ok(Self { questions })
    }

    /// Parses a CSV question source.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if a required column is missing, a row is
    /// malformed, a row fails validation, or the source has no rows.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, QuestionError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|header| header == column) {
                return Err(QuestionError::MissingColumn(column));
            }
        }

        let mut questions = Vec::new();
        for (position, row) in reader.deserialize::<RawQuestion>().enumerate() {
            let raw = row?;
            questions.push(Question::new(
                QuestionIndex::new(position),
                raw.question_number,
                raw.question,
                split_options(&raw.options),
                raw.correct_option,
            )?);
        }

        Self::new(questions)
    }

    /// Parses a CSV question source held in memory.
    ///
    /// # Errors
    ///
    /// See [`QuestionSet::from_csv_reader`].
    pub fn from_csv_str(source: &str) -> Result<Self, QuestionError> {
        Self::from_csv_reader(source.as_bytes())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: QuestionIndex) -> Option<&Question> {
        self.questions.get(index.value())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPITALS: &str = "\
question_number,question,options,correct_option
1,Capital of France?,Paris|Lyon|Nice,Paris
2,Capital of Italy?,Milan|Rome,Rome
3,Capital of Spain?,Madrid|Madrid|Seville,Madrid
";

    #[test]
    fn parses_rows_in_order() {
        let set = QuestionSet::from_csv_str(CAPITALS).unwrap();
        assert_eq!(set.len(), 3);

        let first = set.get(QuestionIndex::new(0)).unwrap();
        assert_eq!(first.number(), "1");
        assert_eq!(first.prompt(), "Capital of France?");
        assert_eq!(first.options(), ["Paris", "Lyon", "Nice"]);

        for question in set.iter() {
            assert!(question.options().iter().any(|o| o == question.correct_option()));
        }
    }

    #[test]
    fn keeps_duplicate_options_by_position() {
        let set = QuestionSet::from_csv_str(CAPITALS).unwrap();
        let third = set.get(QuestionIndex::new(2)).unwrap();
        assert_eq!(third.options().len(), 3);
        assert_eq!(third.option_position("Madrid"), Some(0));
    }

    #[test]
    fn ignores_extra_columns_and_padded_headers() {
        let source = "\
 question_number , question ,options,correct_option,topic
7,2 + 2?,3|4,4,math
";
        let set = QuestionSet::from_csv_str(source).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(QuestionIndex::new(0)).unwrap().number(), "7");
    }

    #[test]
    fn missing_column_is_rejected() {
        let source = "question_number,question,options\n1,Q,A|B\n";
        let err = QuestionSet::from_csv_str(source).unwrap_err();
        assert_eq!(err, QuestionError::MissingColumn("correct_option"));
    }

    #[test]
    fn correct_option_must_be_an_option() {
        let source = "\
question_number,question,options,correct_option
1,Q1,A|B,A
2,Q2,A|B,C
";
        let err = QuestionSet::from_csv_str(source).unwrap_err();
        assert_eq!(
            err,
            QuestionError::CorrectOptionNotFound {
                row: 2,
                correct: "C".to_string()
            }
        );
    }

    #[test]
    fn empty_options_are_rejected() {
        let source = "question_number,question,options,correct_option\n1,Q,,\n";
        let err = QuestionSet::from_csv_str(source).unwrap_err();
        assert_eq!(err, QuestionError::EmptyOptions { row: 1 });
    }

    #[test]
    fn ragged_rows_are_malformed() {
        let source = "question_number,question,options,correct_option\n1,Q,A|B\n";
        let err = QuestionSet::from_csv_str(source).unwrap_err();
        assert!(matches!(err, QuestionError::Csv(_)), "{err:?}");
    }

    #[test]
    fn header_only_source_is_empty() {
        let source = "question_number,question,options,correct_option\n";
        let err = QuestionSet::from_csv_str(source).unwrap_err();
        assert_eq!(err, QuestionError::Empty);
    }

    #[test]
    fn is_correct_requires_exact_match() {
        let set = QuestionSet::from_csv_str(CAPITALS).unwrap();
        let first = set.get(QuestionIndex::new(0)).unwrap();
        assert!(first.is_correct(Some("Paris")));
        assert!(!first.is_correct(Some("paris")));
        assert!(!first.is_correct(None));
    }
}
