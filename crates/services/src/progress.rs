use std::sync::Arc;

use quiz_core::model::{ProgressMap, QuestionIndex, QuizId};
use storage::repository::ProgressRepository;
use tracing::warn;

use crate::dispatcher::{DispatcherHandle, PendingWrite};

/// Reads progress directly from the durable store and writes it back through
/// the persistence dispatcher.
#[derive(Clone)]
pub struct ProgressStore {
    repo: Arc<dyn ProgressRepository>,
    dispatcher: DispatcherHandle,
}

impl ProgressStore {
    #[must_use]
    pub fn new(repo: Arc<dyn ProgressRepository>, dispatcher: DispatcherHandle) -> Self {
        Self { repo, dispatcher }
    }

    #[must_use]
    pub fn dispatcher(&self) -> &DispatcherHandle {
        &self.dispatcher
    }

    /// Last committed progress for `quiz_id`.
    ///
    /// Never fails: a missing snapshot is an empty map, and an unreadable or
    /// malformed one is logged and treated as empty.
    pub async fn load(&self, quiz_id: &QuizId) -> ProgressMap {
        let bytes = match self.repo.read_snapshot(quiz_id).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return ProgressMap::new(),
            Err(err) => {
                warn!(quiz = %quiz_id, error = %err, "progress unavailable; starting empty");
                return ProgressMap::new();
            }
        };

        match serde_json::from_slice::<ProgressMap>(&bytes) {
            Ok(map) => map,
            Err(err) => {
                warn!(quiz = %quiz_id, error = %err, "progress snapshot malformed; starting empty");
                ProgressMap::new()
            }
        }
    }

    /// Insert or overwrite one answer in memory.
    pub fn record_answer(map: &mut ProgressMap, index: QuestionIndex, selected: Option<String>) {
        map.record(index, selected);
    }

    /// Enqueue a full snapshot of `map`. Returns whether it was queued.
    pub fn flush(&self, quiz_id: &QuizId, map: &ProgressMap) -> bool {
        match serde_json::to_vec(map) {
            Ok(content) => self
                .dispatcher
                .enqueue(PendingWrite::new(quiz_id.clone(), content)),
            Err(err) => {
                warn!(quiz = %quiz_id, error = %err, "could not serialize progress");
                false
            }
        }
    }

    /// Discard every answer and enqueue the empty snapshot.
    pub fn clear(&self, quiz_id: &QuizId, map: &mut ProgressMap) -> bool {
        map.clear();
        self.flush(quiz_id, map)
    }
}
