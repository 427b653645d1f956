//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own dataset and database.

use super::constants::*;
use super::fixtures::{create_test_dataset, fixture_dataset};
use movie_catalog_server::analysis::{
    Aggregator, KoreanTokenizer, Summarizer, DEFAULT_SUMMARY_SIZE,
};
use movie_catalog_server::catalog_store::{CatalogStore, SqliteCatalogStore};
use movie_catalog_server::ingestion::Importer;
use movie_catalog_server::server::{serve_until, RequestsLoggingLevel, ServerConfig};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated, freshly imported catalog
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// Catalog store for direct database access in tests
    pub catalog_store: Arc<dyn CatalogStore>,

    // Private fields - keep resources alive until drop
    _temp_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port, serving the fixture dataset
    pub async fn spawn() -> Self {
        Self::spawn_with_dataset(&fixture_dataset()).await
    }

    /// Spawns a new test server on a random port
    ///
    /// This function:
    /// 1. Writes `dataset` to a temporary directory
    /// 2. Imports it into a temporary database
    /// 3. Binds to a random port (127.0.0.1:0)
    /// 4. Spawns the server in a background task
    /// 5. Waits for the server to be ready
    ///
    /// # Panics
    ///
    /// Panics if the import fails, the port cannot be bound or the server
    /// doesn't become ready within timeout.
    pub async fn spawn_with_dataset(dataset: &Value) -> Self {
        let (temp_dir, data_path, db_path) =
            create_test_dataset(dataset).expect("Failed to create test dataset");

        let catalog_store: Arc<dyn CatalogStore> =
            Arc::new(SqliteCatalogStore::new(&db_path, 2).expect("Failed to open catalog store"));

        let importer = Importer::new(Aggregator::new(
            Summarizer::new(KoreanTokenizer::new()),
            DEFAULT_SUMMARY_SIZE,
        ));
        importer
            .import_if_empty(&data_path, catalog_store.as_ref())
            .expect("Failed to import test dataset");

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            content_cache_age_sec: TEST_CONTENT_CACHE_AGE_SEC,
            ..Default::default()
        };

        let serving_store = catalog_store.clone();
        tokio::spawn(async move {
            serve_until(config, serving_store, listener, async {
                shutdown_rx.await.ok();
            })
            .await
            .expect("Server failed");
        });

        let server = Self {
            base_url,
            catalog_store,
            _temp_dir: temp_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the / endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
