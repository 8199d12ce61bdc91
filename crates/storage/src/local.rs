use std::path::PathBuf;

use async_trait::async_trait;
use quiz_core::model::QuizId;
use tracing::debug;

use crate::repository::{ProgressRepository, QuizSourceRepository, StorageError};

/// Question sources and progress snapshots stored side by side in one
/// directory: `<dir>/<quiz>.csv` and `<dir>/<quiz>_progress.json`.
#[derive(Clone, Debug)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn source_path(&self, quiz_id: &QuizId) -> PathBuf {
        self.root.join(quiz_id.source_file_name())
    }

    fn progress_path(&self, quiz_id: &QuizId) -> PathBuf {
        self.root.join(quiz_id.progress_file_name())
    }
}

#[async_trait]
impl QuizSourceRepository for LocalRepository {
    async fn list_sources(&self) -> Result<Vec<QuizId>, StorageError> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name();
            if let Some(id) = name.to_str().and_then(QuizId::from_source_file_name) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    async fn read_source(&self, quiz_id: &QuizId) -> Result<String, StorageError> {
        Ok(tokio::fs::read_to_string(self.source_path(quiz_id)).await?)
    }
}

#[async_trait]
impl ProgressRepository for LocalRepository {
    async fn read_snapshot(&self, quiz_id: &QuizId) -> Result<Option<Vec<u8>>, StorageError> {
        match tokio::fs::read(self.progress_path(quiz_id)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn write_snapshot(&self, quiz_id: &QuizId, content: &[u8]) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;

        // Staged write, then rename into place.
        let path = self.progress_path(quiz_id);
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, content).await?;
        tokio::fs::rename(&staging, &path).await?;
        debug!(quiz = %quiz_id, path = %path.display(), bytes = content.len(), "progress written");
        Ok(())
    }
}
