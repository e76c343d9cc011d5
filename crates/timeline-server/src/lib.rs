//! HTTP API server for the timeline platform.
//!
//! Wires the in-memory state store, a blob store (file-backed when
//! `BLOB_STORE_PATH` is set, in-memory otherwise) and the account directory
//! into the application layer, and serves the graph, detail and business
//! function endpoints.

#![forbid(unsafe_code)]

use std::sync::Arc;

use timeline_content_store::{BlobStorage, FileBlobStore, InMemoryBlobStore};
use timeline_state_inmemory::{InMemoryStore, InMemoryUserDirectory};

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::TimelineServer;

/// Build and run the server from configuration
pub async fn run(config: ServerConfig) -> ServerResult<()> {
    init_logging(&config);

    let blob_store = create_blob_store(&config).await?;
    let store = Arc::new(InMemoryStore::new());
    let repos = store.repositories();
    let users = Arc::new(InMemoryUserDirectory::new());

    let server = TimelineServer::new(config, repos, blob_store, users);
    server.run().await
}

fn init_logging(config: &ServerConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    fmt().with_env_filter(filter).with_target(true).init();
}

async fn create_blob_store(config: &ServerConfig) -> ServerResult<Arc<dyn BlobStorage>> {
    match &config.blob_store_path {
        Some(path) => {
            tracing::info!("using file blob store at {}", path);
            let store = FileBlobStore::new(path)
                .await
                .map_err(|err| ServerError::ConfigError(err.to_string()))?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::info!("using in-memory blob store");
            Ok(Arc::new(InMemoryBlobStore::new()))
        }
    }
}
