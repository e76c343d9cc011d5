//! Business function endpoints, plus the client-facing indication and
//! profile reads they operate on.

use axum::{
    extract::{Json, Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use timeline_core::domain::timeline::{
    ClientTimeline, Indication, Profile, ProgressStatus, TimelineItem,
};
use timeline_core::types::{ClientTimelineId, IndicationId, TemplateId, TimelineItemId, UserId};

use crate::server::TimelineServer;

use super::errors::ApiResult;

pub fn routes() -> Router<Arc<TimelineServer>> {
    Router::new()
        .route("/v1/indications", post(create_indication))
        .route("/v1/profiles/:user_id", get(get_profile))
        .route("/v1/clients/:user_id/timelines", get(list_client_timelines))
        .route("/v1/timelines/:timeline_id/items", get(list_timeline_items))
        .route(
            "/v1/functions/approve-indication",
            post(approve_indication),
        )
        .route("/v1/functions/assign-timeline", post(assign_timeline))
        .route("/v1/functions/create-client", post(create_client))
        .route("/v1/functions/import-timeline", post(import_timeline))
        .route(
            "/v1/functions/update-timeline-progress",
            post(update_timeline_progress),
        )
}

#[derive(Debug, Deserialize)]
struct CreateIndicationRequest {
    referred_name: String,
}

/// Clients submit referrals under their own identity
async fn create_indication(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Json(body): Json<CreateIndicationRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = server.auth(&headers)?;
    let indication = Indication::new(auth.user_id, body.referred_name);
    server
        .repos
        .indications
        .create_indication(&indication)
        .await?;
    Ok((StatusCode::CREATED, Json(indication)))
}

async fn get_profile(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path(user_id): Path<UserId>,
) -> ApiResult<Json<Profile>> {
    server.auth(&headers)?;
    Ok(Json(server.repos.profiles.get_profile(user_id).await?))
}

async fn list_client_timelines(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path(user_id): Path<UserId>,
) -> ApiResult<Json<Vec<ClientTimeline>>> {
    server.auth(&headers)?;
    Ok(Json(
        server
            .repos
            .timelines
            .list_timelines_for_client(user_id)
            .await?,
    ))
}

async fn list_timeline_items(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path(timeline_id): Path<ClientTimelineId>,
) -> ApiResult<Json<Vec<TimelineItem>>> {
    server.auth(&headers)?;
    Ok(Json(server.repos.timelines.list_items(timeline_id).await?))
}

#[derive(Debug, Deserialize)]
struct ApproveIndicationRequest {
    indication_id: IndicationId,
}

async fn approve_indication(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Json(body): Json<ApproveIndicationRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = server.auth(&headers)?;
    let result = server
        .functions
        .approve_indication(&auth, body.indication_id)
        .await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
struct AssignTimelineRequest {
    client_id: UserId,
    template_id: TemplateId,
    start_date: chrono::NaiveDate,
}

#[derive(Debug, Serialize)]
struct AssignTimelineResponse {
    timeline_id: ClientTimelineId,
    items_created: usize,
    start_date: chrono::NaiveDate,
    end_date: chrono::NaiveDate,
}

async fn assign_timeline(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Json(body): Json<AssignTimelineRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = server.auth(&headers)?;
    let result = server
        .functions
        .assign_timeline(&auth, body.client_id, body.template_id, body.start_date)
        .await?;
    let response = AssignTimelineResponse {
        timeline_id: result.timeline.id,
        items_created: result.items_created,
        start_date: result.timeline.start_date,
        end_date: result.timeline.end_date,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

#[derive(Debug, Deserialize)]
struct CreateClientRequest {
    full_name: String,
    email: String,
    password: String,
}

async fn create_client(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Json(body): Json<CreateClientRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = server.auth(&headers)?;
    let profile = server
        .functions
        .create_client(&auth, &body.full_name, &body.email, &body.password)
        .await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

#[derive(Debug, Deserialize)]
struct ImportTimelineRequest {
    name: String,
    duration_months: u32,
    items: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ImportTimelineResponse {
    template_id: TemplateId,
    items_count: usize,
}

async fn import_timeline(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Json(body): Json<ImportTimelineRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = server.auth(&headers)?;
    let template = server
        .functions
        .import_timeline(&auth, &body.name, body.duration_months, &body.items)
        .await?;
    let response = ImportTimelineResponse {
        template_id: template.id,
        items_count: body.items.len(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

#[derive(Debug, Deserialize)]
struct UpdateProgressRequest {
    item_id: TimelineItemId,
    status: ProgressStatus,
    #[serde(default)]
    extra_points: i64,
}

async fn update_timeline_progress(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Json(body): Json<UpdateProgressRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = server.auth(&headers)?;
    let result = server
        .functions
        .update_timeline_progress(&auth, body.item_id, body.status, body.extra_points)
        .await?;
    Ok(Json(result))
}
