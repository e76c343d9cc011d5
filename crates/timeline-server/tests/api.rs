//! End-to-end API tests over the in-memory backends.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use timeline_content_store::InMemoryBlobStore;
use timeline_server::api::build_router;
use timeline_server::{ServerConfig, TimelineServer};
use timeline_state_inmemory::{InMemoryStore, InMemoryUserDirectory};

const ADMIN_KEY: &str = "test-admin-key";

fn app() -> Router {
    let config = ServerConfig {
        admin_api_key: Some(ADMIN_KEY.to_string()),
        ..Default::default()
    };
    let store = Arc::new(InMemoryStore::new());
    let server = TimelineServer::new(
        config,
        store.repositories(),
        Arc::new(InMemoryBlobStore::new()),
        Arc::new(InMemoryUserDirectory::new()),
    );
    build_router(Arc::new(server))
}

struct Caller {
    user_id: String,
    admin: bool,
}

impl Caller {
    fn admin() -> Self {
        Self {
            user_id: Uuid::new_v4().to_string(),
            admin: true,
        }
    }

    fn client(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            admin: false,
        }
    }
}

fn request(method: &str, uri: &str, caller: &Caller, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", &caller.user_id);
    if caller.admin {
        builder = builder.header("authorization", format!("Bearer {}", ADMIN_KEY));
    }
    match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn create_flow(app: &Router, admin: &Caller) -> String {
    let (status, flow) = send(
        app,
        request(
            "POST",
            "/v1/flows",
            admin,
            Some(json!({
                "name": "Onboarding",
                "start_date": "2024-01-01",
                "end_date": "2024-07-01",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    flow["id"].as_str().unwrap().to_string()
}

async fn create_node(app: &Router, admin: &Caller, flow_id: &str, node_type: &str, x: f64) -> Value {
    let (status, node) = send(
        app,
        request(
            "POST",
            &format!("/v1/flows/{}/nodes", flow_id),
            admin,
            Some(json!({
                "node_type": node_type,
                "position": {"x": x, "y": 0.0},
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    node
}

#[tokio::test]
async fn health_reports_up() {
    let app = app();
    let caller = Caller::admin();
    let (status, body) = send(&app, request("GET", "/health", &caller, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "UP");
    assert_eq!(body["dependencies"]["stateStore"]["status"], "UP");
}

#[tokio::test]
async fn identity_and_admin_gates() {
    let app = app();

    // No X-User-Id at all.
    let req = Request::builder()
        .method("GET")
        .uri("/v1/flows")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Authenticated but not admin: reads pass, mutations are forbidden.
    let client = Caller::client(&Uuid::new_v4().to_string());
    let (status, _) = send(&app, request("GET", "/v1/flows", &client, None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/v1/flows",
            &client,
            Some(json!({
                "name": "x",
                "start_date": "2024-01-01",
                "end_date": "2024-02-01",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["errorDetails"]["errorCode"], "ERR_FORBIDDEN");
}

#[tokio::test]
async fn flow_dates_are_validated() {
    let app = app();
    let admin = Caller::admin();
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/v1/flows",
            &admin,
            Some(json!({
                "name": "backwards",
                "start_date": "2024-07-01",
                "end_date": "2024-01-01",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorDetails"]["errorCode"], "ERR_VALIDATION");
}

#[tokio::test]
async fn graph_round_trip_with_cascading_node_delete() {
    let app = app();
    let admin = Caller::admin();
    let flow_id = create_flow(&app, &admin).await;

    let right = create_node(&app, &admin, &flow_id, "service", 300.0).await;
    let left = create_node(&app, &admin, &flow_id, "product", 100.0).await;

    let (status, edge) = send(
        &app,
        request(
            "POST",
            &format!("/v1/flows/{}/edges", flow_id),
            &admin,
            Some(json!({
                "source_node_id": left["id"],
                "target_node_id": right["id"],
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(edge["animated"], false);

    let (status, graph) = send(
        &app,
        request("GET", &format!("/v1/flows/{}", flow_id), &admin, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // Nodes come back ordered by x.
    assert_eq!(graph["nodes"][0]["id"], left["id"]);
    assert_eq!(graph["nodes"][1]["id"], right["id"]);
    assert_eq!(graph["edges"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        request(
            "DELETE",
            &format!("/v1/nodes/{}", left["id"].as_str().unwrap()),
            &admin,
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, graph) = send(
        &app,
        request("GET", &format!("/v1/flows/{}", flow_id), &admin, None),
    )
    .await;
    assert_eq!(graph["nodes"].as_array().unwrap().len(), 1);
    assert!(graph["edges"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_node_type_falls_back_to_custom() {
    let app = app();
    let admin = Caller::admin();
    let flow_id = create_flow(&app, &admin).await;

    let node = create_node(&app, &admin, &flow_id, "hologram", 0.0).await;
    assert_eq!(node["node_type"], "custom");
}

#[tokio::test]
async fn document_upload_and_download_round_trip() {
    let app = app();
    let admin = Caller::admin();
    let flow_id = create_flow(&app, &admin).await;
    let node = create_node(&app, &admin, &flow_id, "document", 0.0).await;
    let node_id = node["id"].as_str().unwrap();

    let payload = b"%PDF-1.4 contract body";
    let (status, meta) = send(
        &app,
        request(
            "POST",
            &format!("/v1/nodes/{}/documents", node_id),
            &admin,
            Some(json!({
                "filename": "contract.pdf",
                "mime_type": "application/pdf",
                "content_base64": base64::encode(payload),
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(meta["size_bytes"], payload.len());

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!(
                "/v1/nodes/{}/documents/{}",
                node_id,
                meta["id"].as_str().unwrap()
            ),
            &admin,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/pdf"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], payload);
}

#[tokio::test]
async fn kanban_routes_reject_non_kanban_nodes() {
    let app = app();
    let admin = Caller::admin();
    let flow_id = create_flow(&app, &admin).await;
    let plain = create_node(&app, &admin, &flow_id, "service", 0.0).await;

    let (status, _) = send(
        &app,
        request(
            "GET",
            &format!("/v1/nodes/{}/boards", plain["id"].as_str().unwrap()),
            &admin,
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn business_functions_end_to_end() {
    let app = app();
    let admin = Caller::admin();

    // Provision a client.
    let (status, profile) = send(
        &app,
        request(
            "POST",
            "/v1/functions/create-client",
            &admin,
            Some(json!({
                "full_name": "Ana Lima",
                "email": "ana@example.com",
                "password": "secret1",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let client_id = profile["user_id"].as_str().unwrap().to_string();

    // Short passwords are rejected up front.
    let (status, _) = send(
        &app,
        request(
            "POST",
            "/v1/functions/create-client",
            &admin,
            Some(json!({
                "full_name": "Bruno Reis",
                "email": "bruno@example.com",
                "password": "short",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Import a template and assign it.
    let (status, template) = send(
        &app,
        request(
            "POST",
            "/v1/functions/import-timeline",
            &admin,
            Some(json!({
                "name": "Onboarding",
                "duration_months": 6,
                "items": ["Kickoff", "Draft", "Delivery"],
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, timeline) = send(
        &app,
        request(
            "POST",
            "/v1/functions/assign-timeline",
            &admin,
            Some(json!({
                "client_id": client_id,
                "template_id": template["template_id"],
                "start_date": "2024-01-15",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(timeline["end_date"], "2024-07-15");
    assert_eq!(timeline["items_created"], 3);

    let (status, timelines) = send(
        &app,
        request(
            "GET",
            &format!("/v1/clients/{}/timelines", client_id),
            &Caller::client(&client_id),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(timelines.as_array().unwrap().len(), 1);

    // The client refers a friend; an admin approves it.
    let (status, indication) = send(
        &app,
        request(
            "POST",
            "/v1/indications",
            &Caller::client(&client_id),
            Some(json!({ "referred_name": "Maria Souza" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(indication["status"], "pending");

    let (status, approved) = send(
        &app,
        request(
            "POST",
            "/v1/functions/approve-indication",
            &admin,
            Some(json!({ "indication_id": indication["id"] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["points_awarded"], 50);
    assert_eq!(approved["new_balance"], 50);

    // Approving twice conflicts.
    let (status, _) = send(
        &app,
        request(
            "POST",
            "/v1/functions/approve-indication",
            &admin,
            Some(json!({ "indication_id": indication["id"] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, balance) = send(
        &app,
        request("GET", &format!("/v1/profiles/{}", client_id), &admin, None),
    )
    .await;
    assert_eq!(balance["points"], 50);
}

#[tokio::test]
async fn progress_update_awards_points_once() {
    let app = app();
    let admin = Caller::admin();

    let (_, profile) = send(
        &app,
        request(
            "POST",
            "/v1/functions/create-client",
            &admin,
            Some(json!({
                "full_name": "Ana Lima",
                "email": "ana@example.com",
                "password": "secret1",
            })),
        ),
    )
    .await;
    let client_id = profile["user_id"].as_str().unwrap().to_string();

    let (_, template) = send(
        &app,
        request(
            "POST",
            "/v1/functions/import-timeline",
            &admin,
            Some(json!({
                "name": "Plan",
                "duration_months": 2,
                "items": ["Only item"],
            })),
        ),
    )
    .await;
    let (_, _timeline) = send(
        &app,
        request(
            "POST",
            "/v1/functions/assign-timeline",
            &admin,
            Some(json!({
                "client_id": client_id,
                "template_id": template["template_id"],
                "start_date": "2024-03-01",
            })),
        ),
    )
    .await;

    // Find the instantiated item through the assigned timeline.
    let (_, timelines) = send(
        &app,
        request(
            "GET",
            &format!("/v1/clients/{}/timelines", client_id),
            &admin,
            None,
        ),
    )
    .await;
    let timeline_id = timelines[0]["id"].as_str().unwrap().to_string();
    let (status, items) = send(
        &app,
        request(
            "GET",
            &format!("/v1/timelines/{}/items", timeline_id),
            &admin,
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let item_id = items[0]["id"].as_str().unwrap().to_string();

    let (status, result) = send(
        &app,
        request(
            "POST",
            "/v1/functions/update-timeline-progress",
            &admin,
            Some(json!({ "item_id": item_id, "status": "NO_PRAZO" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["pointsAdded"], 25);

    let (_, balance) = send(
        &app,
        request("GET", &format!("/v1/profiles/{}", client_id), &admin, None),
    )
    .await;
    assert_eq!(balance["points"], 25);

    // An item is evaluated at most once.
    let (status, _) = send(
        &app,
        request(
            "POST",
            "/v1/functions/update-timeline-progress",
            &admin,
            Some(json!({ "item_id": item_id, "status": "ADIANTADO", "extra_points": 10 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
