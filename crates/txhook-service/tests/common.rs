//! Common test utilities for txhook integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum_test::TestServer;
use serde_json::Value;
use tokio::time::Instant;

use txhook_service::{create_router, AppState, CompletionWorkers, ServiceConfig, StorageBackend};
use txhook_store::MemoryStore;

/// Completion delay used by default in integration tests.
pub const COMPLETION_DELAY: Duration = Duration::from_millis(100);

/// How long helpers wait for a completion before failing the test.
pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(5);

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The store behind the server.
    pub store: Arc<MemoryStore>,
    /// The completion worker pool behind the server.
    pub workers: Arc<CompletionWorkers>,
}

impl TestHarness {
    /// Create a new test harness with an empty store.
    pub fn new() -> Self {
        Self::with_delay(COMPLETION_DELAY)
    }

    /// Create a harness whose completions fire after `delay`.
    pub fn with_delay(delay: Duration) -> Self {
        Self::with_config(test_config(delay))
    }

    /// Create a harness from an explicit configuration.
    pub fn with_config(config: ServiceConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), config);
        let workers = state.workers.clone();

        let router: Router = create_router(state);
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            workers,
        }
    }

    /// Read a transaction through the status endpoint.
    pub async fn status(&self, transaction_id: &str) -> Value {
        let response = self
            .server
            .get(&format!("/v1/transactions/{transaction_id}"))
            .await;
        response.assert_status_ok();
        response.json()
    }

    /// Poll the status endpoint until the transaction is `PROCESSED`.
    pub async fn wait_for_processed(&self, transaction_id: &str) -> Value {
        let deadline = Instant::now() + COMPLETION_TIMEOUT;
        loop {
            let body = self.status(transaction_id).await;
            if body["status"] == "PROCESSED" {
                return body;
            }
            assert!(
                Instant::now() < deadline,
                "transaction {transaction_id} was not processed in time"
            );
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Service configuration for tests.
pub fn test_config(delay: Duration) -> ServiceConfig {
    ServiceConfig {
        listen_addr: "127.0.0.1:0".into(),
        storage: StorageBackend::Memory,
        ..ServiceConfig::default()
    }
    .with_completion_delay(delay)
}
