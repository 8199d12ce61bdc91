use async_trait::async_trait;
use quiz_core::model::QuizId;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::github::{GithubConfig, GithubRepository};
use crate::local::LocalRepository;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("unauthorized")]
    Unauthorized,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound,
            std::io::ErrorKind::PermissionDenied => Self::Unauthorized,
            _ => Self::Io(err.to_string()),
        }
    }
}

/// Read-only access to CSV question sources.
#[async_trait]
pub trait QuizSourceRepository: Send + Sync {
    /// List quiz ids of every available source, sorted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the source location cannot be listed.
    async fn list_sources(&self) -> Result<Vec<QuizId>, StorageError>;

    /// Read the raw CSV text of a source.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn read_source(&self, quiz_id: &QuizId) -> Result<String, StorageError>;
}

/// Durable home of serialized progress snapshots, one per quiz.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the last committed snapshot, `None` if there is none yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record exists but cannot be read.
    async fn read_snapshot(&self, quiz_id: &QuizId) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replace the snapshot for `quiz_id` with `content`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the commit fails.
    async fn write_snapshot(&self, quiz_id: &QuizId, content: &[u8]) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    sources: Arc<Mutex<HashMap<QuizId, String>>>,
    snapshots: Arc<Mutex<HashMap<QuizId, Vec<u8>>>>,
    writes: Arc<Mutex<Vec<(QuizId, Vec<u8>)>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a question source.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn insert_source(&self, quiz_id: QuizId, csv: impl Into<String>) -> Result<(), StorageError> {
        let mut guard = self
            .sources
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(quiz_id, csv.into());
        Ok(())
    }

    /// Current snapshot for `quiz_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn snapshot(&self, quiz_id: &QuizId) -> Result<Option<Vec<u8>>, StorageError> {
        let guard = self
            .snapshots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(quiz_id).cloned())
    }

    /// Every committed write, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn write_history(&self) -> Result<Vec<(QuizId, Vec<u8>)>, StorageError> {
        let guard = self
            .writes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }
}

#[async_trait]
impl QuizSourceRepository for InMemoryRepository {
    async fn list_sources(&self) -> Result<Vec<QuizId>, StorageError> {
        let guard = self
            .sources
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut ids: Vec<QuizId> = guard.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn read_source(&self, quiz_id: &QuizId) -> Result<String, StorageError> {
        let guard = self
            .sources
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(quiz_id).cloned().ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn read_snapshot(&self, quiz_id: &QuizId) -> Result<Option<Vec<u8>>, StorageError> {
        self.snapshot(quiz_id)
    }

    async fn write_snapshot(&self, quiz_id: &QuizId, content: &[u8]) -> Result<(), StorageError> {
        {
            let mut guard = self
                .snapshots
                .lock()
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            guard.insert(quiz_id.clone(), content.to_vec());
        }
        let mut writes = self
            .writes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        writes.push((quiz_id.clone(), content.to_vec()));
        Ok(())
    }
}

/// Repositories bundled for the services layer.
#[derive(Clone)]
pub struct Storage {
    pub sources: Arc<dyn QuizSourceRepository>,
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    /// Wrap an existing in-memory repository so tests can keep a handle to it.
    #[must_use]
    pub fn from_in_memory(repo: InMemoryRepository) -> Self {
        let sources: Arc<dyn QuizSourceRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo);
        Self { sources, progress }
    }

    /// Sources and progress files under one local directory.
    #[must_use]
    pub fn local(data_dir: impl Into<PathBuf>) -> Self {
        let repo = LocalRepository::new(data_dir);
        let sources: Arc<dyn QuizSourceRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo);
        Self { sources, progress }
    }

    /// Sources and progress files in a remote GitHub repository.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the HTTP client cannot be built.
    pub fn github(config: GithubConfig) -> Result<Self, StorageError> {
        let repo = GithubRepository::new(config)?;
        let sources: Arc<dyn QuizSourceRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo);
        Ok(Self { sources, progress })
    }
}
