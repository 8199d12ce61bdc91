//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::QuestionError;
use storage::repository::StorageError;

use crate::config::ConfigError;

/// A quiz could not be loaded. Fatal to starting that quiz.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("question source unavailable: {0}")]
    Source(#[from] StorageError),
    #[error(transparent)]
    Question(#[from] QuestionError),
}

/// Errors emitted by quiz sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("quiz already completed")]
    Completed,
    #[error("select an option before continuing")]
    NoSelection,
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
