use std::sync::Arc;

use storage::repository::Storage;
use tracing::info;

use crate::config::{BackendConfig, QuizConfig};
use crate::dispatcher::{DispatcherHandle, PersistenceDispatcher};
use crate::error::AppServicesError;
use crate::progress::ProgressStore;
use crate::quizzes::QuizCatalog;
use crate::sessions::QuizLoopService;
use crate::Clock;

/// Assembles app-facing services over the configured backend.
///
/// The returned `PersistenceDispatcher` owns the background writer; keep it
/// alive for the lifetime of the app and `shutdown` it on exit.
#[derive(Clone)]
pub struct AppServices {
    backend: &'static str,
    quiz_loop: Arc<QuizLoopService>,
    dispatcher: DispatcherHandle,
}

impl AppServices {
    /// Build services for `config`. Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the storage backend cannot be set up.
    pub fn new(
        config: &QuizConfig,
        clock: Clock,
    ) -> Result<(Self, PersistenceDispatcher), AppServicesError> {
        let storage = match &config.backend {
            BackendConfig::Local { data_dir } => Storage::local(data_dir.clone()),
            BackendConfig::Github(github) => Storage::github(github.clone())?,
        };
        let (mut services, dispatcher) = Self::from_storage(storage, config, clock);
        services.backend = config.backend.name();
        Ok((services, dispatcher))
    }

    /// Build services over already constructed repositories.
    #[must_use]
    pub fn from_storage(
        storage: Storage,
        config: &QuizConfig,
        clock: Clock,
    ) -> (Self, PersistenceDispatcher) {
        let dispatcher = PersistenceDispatcher::spawn(Arc::clone(&storage.progress));
        let handle = dispatcher.handle();

        let catalog = Arc::new(QuizCatalog::new(Arc::clone(&storage.sources)));
        let progress = ProgressStore::new(Arc::clone(&storage.progress), handle.clone());
        let quiz_loop = Arc::new(
            QuizLoopService::new(clock, catalog, progress)
                .with_require_selection(config.require_selection)
                .with_flush_interval(config.flush_interval),
        );

        info!(
            backend = config.backend.name(),
            require_selection = config.require_selection,
            flush_interval_secs = config.flush_interval.num_seconds(),
            "quiz services ready"
        );

        (
            Self {
                backend: "custom",
                quiz_loop,
                dispatcher: handle,
            },
            dispatcher,
        )
    }

    /// Name of the storage backend, `custom` for injected repositories.
    #[must_use]
    pub fn backend(&self) -> &'static str {
        self.backend
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }

    #[must_use]
    pub fn dispatcher(&self) -> DispatcherHandle {
        self.dispatcher.clone()
    }
}
