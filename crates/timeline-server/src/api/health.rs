//! Health check endpoint.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::server::TimelineServer;

/// Basic health information plus dependency probes
pub async fn health_check(State(server): State<Arc<TimelineServer>>) -> impl IntoResponse {
    let state_store_up = server.check_state_store_health().await;
    let blob_store_up = server.check_blob_store_health().await;

    let body = json!({
        "status": if state_store_up && blob_store_up { "UP" } else { "DOWN" },
        "version": env!("CARGO_PKG_VERSION"),
        "dependencies": {
            "stateStore": { "status": if state_store_up { "UP" } else { "DOWN" } },
            "blobStore": { "status": if blob_store_up { "UP" } else { "DOWN" } },
        },
    });

    let status = if state_store_up && blob_store_up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}
