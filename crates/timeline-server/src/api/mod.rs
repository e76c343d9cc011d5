//! API routes and handlers.
//!
//! Graph endpoints live here; node sub-resource endpoints are in
//! [`detail`], the business functions in [`functions`]. Every handler
//! extracts the caller from headers first and lets the admin gate inside
//! the application layer reject non-admin mutations.

use axum::{
    extract::{Json, Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub mod detail;
pub mod errors;
pub mod functions;
pub mod health;

use timeline_core::domain::edge::Edge;
use timeline_core::domain::flow::Flow;
use timeline_core::domain::node::{Node, NodeUpdate};
use timeline_core::domain::node_type::NodeType;
use timeline_core::types::{ClientTimelineId, EdgeId, FlowId, NodeId, Position};
use timeline_core::CoreError;

use crate::server::TimelineServer;
use errors::ApiResult;

/// Build the router for API endpoints
pub fn build_router(server: Arc<TimelineServer>) -> Router {
    Router::new()
        // Flows
        .route("/v1/flows", get(list_flows).post(create_flow))
        .route("/v1/flows/:flow_id", get(get_flow).delete(delete_flow))
        .route("/v1/flows/:flow_id/nodes", post(create_node))
        .route("/v1/flows/:flow_id/edges", post(create_edge))
        // Nodes and edges
        .route(
            "/v1/nodes/:node_id",
            get(get_node).patch(update_node).delete(delete_node),
        )
        .route("/v1/nodes/:node_id/position", put(update_node_position))
        .route("/v1/edges/:edge_id", axum::routing::delete(delete_edge))
        // Node sub-resources (detail editor tabs)
        .merge(detail::routes())
        // Business functions
        .merge(functions::routes())
        // Health check
        .route("/health", get(health::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

#[derive(Debug, Deserialize)]
struct CreateFlowRequest {
    name: String,
    start_date: chrono::NaiveDate,
    end_date: chrono::NaiveDate,
    /// Present for a client-instance flow, absent for a template
    #[serde(default)]
    client_timeline_id: Option<ClientTimelineId>,
}

#[derive(Debug, Serialize)]
struct FlowGraphResponse {
    flow: Flow,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

async fn list_flows(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Flow>>> {
    server.auth(&headers)?;
    Ok(Json(server.repos.flows.list_flows().await?))
}

async fn create_flow(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Json(body): Json<CreateFlowRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = server.auth(&headers)?;
    auth.require_admin("create flow")?;
    if body.end_date <= body.start_date {
        return Err(CoreError::Validation("end date must be after start date".into()).into());
    }

    let flow = match body.client_timeline_id {
        Some(timeline_id) => {
            // The timeline must exist before an instance can be bound to it.
            server.repos.timelines.get_timeline(timeline_id).await?;
            Flow::client_instance(body.name, timeline_id, body.start_date, body.end_date)
        }
        None => Flow::template(body.name, body.start_date, body.end_date),
    };
    server.repos.flows.save_flow(&flow).await?;
    Ok((StatusCode::CREATED, Json(flow)))
}

async fn get_flow(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path(flow_id): Path<FlowId>,
) -> ApiResult<Json<FlowGraphResponse>> {
    server.auth(&headers)?;
    let flow = server.repos.flows.get_flow(flow_id).await?;
    let nodes = server.repos.nodes.list_nodes(flow_id).await?;
    let edges = server.repos.edges.list_edges(flow_id).await?;
    Ok(Json(FlowGraphResponse { flow, nodes, edges }))
}

async fn delete_flow(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path(flow_id): Path<FlowId>,
) -> ApiResult<StatusCode> {
    let auth = server.auth(&headers)?;
    auth.require_admin("delete flow")?;
    server.repos.flows.delete_flow(flow_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct CreateNodeRequest {
    node_type: NodeType,
    #[serde(default)]
    title: Option<String>,
    position: Position,
}

async fn create_node(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path(flow_id): Path<FlowId>,
    Json(body): Json<CreateNodeRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = server.auth(&headers)?;
    auth.require_admin("create node")?;

    let title = body
        .title
        .unwrap_or_else(|| format!("New {}", body.node_type.descriptor().label));
    let node = Node::new(flow_id, body.node_type, title, body.position, auth.user_id);
    server.repos.nodes.create_node(&node).await?;
    Ok((StatusCode::CREATED, Json(node)))
}

async fn get_node(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path(node_id): Path<NodeId>,
) -> ApiResult<Json<Node>> {
    server.auth(&headers)?;
    Ok(Json(server.repos.nodes.get_node(node_id).await?))
}

async fn update_node(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path(node_id): Path<NodeId>,
    Json(update): Json<NodeUpdate>,
) -> ApiResult<Json<Node>> {
    let auth = server.auth(&headers)?;
    auth.require_admin("edit node details")?;
    Ok(Json(server.repos.nodes.update_node(node_id, update).await?))
}

async fn update_node_position(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path(node_id): Path<NodeId>,
    Json(position): Json<Position>,
) -> ApiResult<StatusCode> {
    let auth = server.auth(&headers)?;
    auth.require_admin("move node")?;
    server
        .repos
        .nodes
        .update_node_position(node_id, position)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_node(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path(node_id): Path<NodeId>,
) -> ApiResult<StatusCode> {
    let auth = server.auth(&headers)?;
    auth.require_admin("delete node")?;
    let blob_paths = server.repos.nodes.delete_node(node_id).await?;
    for path in blob_paths {
        if let Err(err) = server.blob_store.remove(&path).await {
            warn!(%node_id, path, error = %err, "orphaned blob left behind");
        }
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct CreateEdgeRequest {
    source_node_id: NodeId,
    target_node_id: NodeId,
    #[serde(default)]
    label: Option<String>,
}

async fn create_edge(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path(flow_id): Path<FlowId>,
    Json(body): Json<CreateEdgeRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = server.auth(&headers)?;
    auth.require_admin("connect nodes")?;

    let mut edge = Edge::new(flow_id, body.source_node_id, body.target_node_id);
    edge.label = body.label;
    server.repos.edges.create_edge(&edge).await?;
    Ok((StatusCode::CREATED, Json(edge)))
}

async fn delete_edge(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path(edge_id): Path<EdgeId>,
) -> ApiResult<StatusCode> {
    let auth = server.auth(&headers)?;
    auth.require_admin("delete edge")?;
    server.repos.edges.delete_edge(edge_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
