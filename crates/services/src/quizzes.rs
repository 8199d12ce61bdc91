use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use quiz_core::model::{QuestionSet, QuizId};
use storage::repository::{QuizSourceRepository, StorageError};
use tracing::{debug, warn};

use crate::error::LoadError;

/// Lists quiz sources and loads each one at most once per process.
pub struct QuizCatalog {
    sources: Arc<dyn QuizSourceRepository>,
    cache: Mutex<HashMap<QuizId, Arc<QuestionSet>>>,
}

impl QuizCatalog {
    #[must_use]
    pub fn new(sources: Arc<dyn QuizSourceRepository>) -> Self {
        Self {
            sources,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Available quiz ids, sorted. A missing source location lists nothing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the source location cannot be listed.
    pub async fn list_quizzes(&self) -> Result<Vec<QuizId>, StorageError> {
        let mut ids = match self.sources.list_sources().await {
            Ok(ids) => ids,
            Err(StorageError::NotFound) => {
                warn!("quiz source location not found");
                Vec::new()
            }
            Err(err) => return Err(err),
        };
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    /// Parsed questions for `quiz_id`, read from the source on first use.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Source` if the source cannot be read and
    /// `LoadError::Question` if it does not parse into a valid question set.
    pub async fn load(&self, quiz_id: &QuizId) -> Result<Arc<QuestionSet>, LoadError> {
        if let Some(cached) = self.cached(quiz_id) {
            return Ok(cached);
        }

        let text = self.sources.read_source(quiz_id).await?;
        let questions = Arc::new(QuestionSet::from_csv_str(&text)?);
        debug!(quiz = %quiz_id, questions = questions.len(), "question source loaded");

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = cache
            .entry(quiz_id.clone())
            .or_insert_with(|| Arc::clone(&questions));
        Ok(Arc::clone(entry))
    }

    /// Forget the cached questions for `quiz_id`; the next `load` re-reads them.
    pub fn invalidate(&self, quiz_id: &QuizId) {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.remove(quiz_id);
    }

    fn cached(&self, quiz_id: &QuizId) -> Option<Arc<QuestionSet>> {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.get(quiz_id).cloned()
    }
}
