//! The timeline server: configuration plus the wired dependencies, shared
//! with every handler as axum state.

use std::sync::Arc;

use axum::http::HeaderMap;
use tracing::info;

use timeline_content_store::BlobStorage;
use timeline_core::application::functions::Functions;
use timeline_core::domain::repository::{Repositories, UserDirectory};
use timeline_core::types::AuthContext;

use crate::api;
use crate::api::errors::ApiError;
use crate::auth::auth_from_headers;
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Shared server state
#[derive(Debug)]
pub struct TimelineServer {
    pub config: ServerConfig,
    pub repos: Repositories,
    pub blob_store: Arc<dyn BlobStorage>,
    pub functions: Functions,
}

impl TimelineServer {
    pub fn new(
        config: ServerConfig,
        repos: Repositories,
        blob_store: Arc<dyn BlobStorage>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        let functions = Functions::new(repos.clone(), users);
        Self {
            config,
            repos,
            blob_store,
            functions,
        }
    }

    /// Caller identity for a request
    pub fn auth(&self, headers: &HeaderMap) -> Result<AuthContext, ApiError> {
        auth_from_headers(headers, self.config.admin_api_key.as_deref())
    }

    /// Whether the graph data store answers queries
    pub async fn check_state_store_health(&self) -> bool {
        self.repos.flows.list_flows().await.is_ok()
    }

    /// Whether the blob store answers queries
    pub async fn check_blob_store_health(&self) -> bool {
        self.blob_store.exists("health/probe").await.is_ok()
    }

    /// Bind the listener and serve until shutdown
    pub async fn run(self) -> ServerResult<()> {
        let addr = self.config.socket_addr()?;
        let app = api::build_router(Arc::new(self));

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|err| ServerError::ConfigError(format!("failed to bind {}: {}", addr, err)))?;
        info!("listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|err| ServerError::InternalError(err.to_string()))
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install ctrl-c handler: {}", err);
        return;
    }
    info!("shutdown signal received");
}
