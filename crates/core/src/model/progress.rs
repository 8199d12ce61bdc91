use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{ParseIdError, QuestionIndex};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressMapError {
    #[error("invalid progress key: {0}")]
    InvalidKey(#[from] ParseIdError),
}

/// The taker's recorded answer for one question.
///
/// `selected` is `None` when the taker advanced without choosing an option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub selected: Option<String>,
}

impl AnswerRecord {
    #[must_use]
    pub fn new(selected: Option<String>) -> Self {
        Self { selected }
    }

    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }
}

/// Answers keyed by question index.
///
/// Serialized as a JSON object with string keys, e.g.
/// `{"0": {"selected": "Paris"}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, AnswerRecord>",
    into = "BTreeMap<String, AnswerRecord>"
)]
pub struct ProgressMap {
    answers: BTreeMap<QuestionIndex, AnswerRecord>,
}

impl ProgressMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the answer for `index`.
    pub fn record(&mut self, index: QuestionIndex, selected: Option<String>) {
        self.answers.insert(index, AnswerRecord::new(selected));
    }

    #[must_use]
    pub fn get(&self, index: QuestionIndex) -> Option<&AnswerRecord> {
        self.answers.get(&index)
    }

    #[must_use]
    pub fn contains(&self, index: QuestionIndex) -> bool {
        self.answers.contains_key(&index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }

    /// Entries in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (QuestionIndex, &AnswerRecord)> {
        self.answers.iter().map(|(index, record)| (*index, record))
    }

    /// First index in `0..total` with no recorded answer, or `total` when every
    /// question has one.
    #[must_use]
    pub fn first_unanswered(&self, total: usize) -> usize {
        (0..total)
            .find(|i| !self.contains(QuestionIndex::new(*i)))
            .unwrap_or(total)
    }

    /// Drop entries whose index is not below `total`; returns the dropped indexes.
    pub fn retain_below(&mut self, total: usize) -> Vec<QuestionIndex> {
        let dropped: Vec<QuestionIndex> = self
            .answers
            .keys()
            .copied()
            .filter(|index| index.value() >= total)
            .collect();
        for index in &dropped {
            self.answers.remove(index);
        }
        dropped
    }
}

impl TryFrom<BTreeMap<String, AnswerRecord>> for ProgressMap {
    type Error = ProgressMapError;

    fn try_from(raw: BTreeMap<String, AnswerRecord>) -> Result<Self, Self::Error> {
        let mut answers = BTreeMap::new();
        for (key, record) in raw {
            answers.insert(key.trim().parse::<QuestionIndex>()?, record);
        }
        Ok(Self { answers })
    }
}

impl From<ProgressMap> for BTreeMap<String, AnswerRecord> {
    fn from(map: ProgressMap) -> Self {
        map.answers
            .into_iter()
            .map(|(index, record)| (index.to_string(), record))
            .collect()
    }
}
