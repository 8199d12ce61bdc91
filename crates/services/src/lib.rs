#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod progress;
pub mod quizzes;
pub mod sessions;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use config::{BackendConfig, ConfigError, QuizConfig};
pub use dispatcher::{DispatcherHandle, DispatcherStats, PendingWrite, PersistenceDispatcher};
pub use error::{AppServicesError, LoadError, SessionError};
pub use progress::ProgressStore;
pub use quizzes::QuizCatalog;
pub use sessions::{QuizAnswerResult, QuizLoopService, QuizPhase, QuizProgress, QuizSession, ReviewItem};
