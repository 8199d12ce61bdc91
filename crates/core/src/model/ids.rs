use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Zero-based position of a question inside its quiz.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionIndex(usize);

impl QuestionIndex {
    /// Creates a new `QuestionIndex`
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the underlying index
    #[must_use]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl fmt::Debug for QuestionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionIndex({})", self.0)
    }
}

impl fmt::Display for QuestionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for parsing an index from a progress key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    raw: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse QuestionIndex from {:?}", self.raw)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for QuestionIndex {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<usize>()
            .map(QuestionIndex::new)
            .map_err(|_| ParseIdError { raw: s.to_string() })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizIdError {
    #[error("quiz id cannot be empty")]
    Empty,

    #[error("quiz id contains a path separator: {0}")]
    PathSeparator(String),

    #[error("quiz id is reserved: {0}")]
    Reserved(String),
}

/// Base name (without extension) of a question source.
///
/// The same id names the progress record, so it is kept free of path
/// components.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QuizId(String);

impl QuizId {
    /// Validates and wraps a quiz id.
    ///
    /// # Errors
    ///
    /// Returns `QuizIdError` if the id is empty, `.`/`..`, or contains `/` or `\`.
    pub fn new(value: impl Into<String>) -> Result<Self, QuizIdError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(QuizIdError::Empty);
        }
        if trimmed.contains('/') || trimmed.contains('\\') {
            return Err(QuizIdError::PathSeparator(trimmed.to_string()));
        }
        if trimmed == "." || trimmed == ".." {
            return Err(QuizIdError::Reserved(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Derives a quiz id from a source file name such as `capitals.csv`.
    ///
    /// Returns `None` for names without the `.csv` extension.
    #[must_use]
    pub fn from_source_file_name(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(".csv")?;
        Self::new(stem).ok()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the question source, e.g. `capitals.csv`.
    #[must_use]
    pub fn source_file_name(&self) -> String {
        format!("{}.csv", self.0)
    }

    /// File name of the progress record, e.g. `capitals_progress.json`.
    #[must_use]
    pub fn progress_file_name(&self) -> String {
        format!("{}_progress.json", self.0)
    }
}

impl fmt::Debug for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuizId({})", self.0)
    }
}

impl fmt::Display for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QuizId {
    type Err = QuizIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for QuizId {
    type Error = QuizIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<QuizId> for String {
    fn from(value: QuizId) -> Self {
        value.0
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
