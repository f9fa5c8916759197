//! Application state.

use std::sync::Arc;

use txhook_store::Store;

use crate::config::ServiceConfig;
use crate::ingest::Ingestor;
use crate::worker::CompletionWorkers;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<dyn Store>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Completion worker pool.
    pub workers: Arc<CompletionWorkers>,

    /// Ingestion coordinator.
    pub ingestor: Ingestor,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        let workers = Arc::new(CompletionWorkers::new(
            Arc::clone(&store),
            config.completion_delay,
            config.max_concurrent_completions,
        ));

        tracing::info!(
            delay_ms = u64::try_from(config.completion_delay.as_millis()).unwrap_or(u64::MAX),
            max_concurrent = config.max_concurrent_completions,
            "Completion workers configured"
        );

        let ingestor = Ingestor::new(Arc::clone(&store), Arc::clone(&workers));

        Self {
            store,
            config,
            workers,
            ingestor,
        }
    }
}
