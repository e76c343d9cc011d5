//! Node sub-resource endpoints: the detail editor tabs over HTTP.
//!
//! Each handler opens a short-lived editor session on the node, so the
//! blob/metadata ordering rules and admin gates live in one place.

use axum::{
    extract::{Json, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use timeline_core::application::detail_editor::{DetailEditor, DetailTab};
use timeline_core::domain::kanban::BoardWithCards;
use timeline_core::domain::subresource::{Comment, DocumentMeta, Link};
use timeline_core::types::{BoardId, CardId, DocumentId, LinkId, NodeId};

use crate::server::TimelineServer;

use super::errors::{ApiError, ApiResult};

pub fn routes() -> Router<Arc<TimelineServer>> {
    Router::new()
        .route(
            "/v1/nodes/:node_id/comments",
            get(list_comments).post(add_comment),
        )
        .route(
            "/v1/nodes/:node_id/documents",
            get(list_documents).post(upload_document),
        )
        .route(
            "/v1/nodes/:node_id/documents/:document_id",
            get(download_document).delete(delete_document),
        )
        .route("/v1/nodes/:node_id/links", get(list_links).post(add_link))
        .route("/v1/nodes/:node_id/links/:link_id", delete(delete_link))
        .route(
            "/v1/nodes/:node_id/boards",
            get(list_boards).post(add_board),
        )
        .route("/v1/nodes/:node_id/boards/:board_id", delete(delete_board))
        .route("/v1/nodes/:node_id/boards/:board_id/cards", post(add_card))
        .route(
            "/v1/nodes/:node_id/cards/:card_id",
            patch(set_card_progress).delete(delete_card),
        )
}

async fn open_editor(server: &TimelineServer, node_id: NodeId) -> ApiResult<DetailEditor> {
    Ok(DetailEditor::open(server.repos.clone(), server.blob_store.clone(), node_id).await?)
}

// ---- comments ----

#[derive(Debug, Deserialize)]
struct AddCommentRequest {
    content: String,
}

async fn list_comments(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path(node_id): Path<NodeId>,
) -> ApiResult<Json<Vec<Comment>>> {
    server.auth(&headers)?;
    let mut editor = open_editor(&server, node_id).await?;
    editor.select_tab(DetailTab::Comments).await?;
    Ok(Json(editor.comments().map(<[_]>::to_vec).unwrap_or_default()))
}

async fn add_comment(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path(node_id): Path<NodeId>,
    Json(body): Json<AddCommentRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = server.auth(&headers)?;
    let mut editor = open_editor(&server, node_id).await?;
    let comment = editor.add_comment(&auth, body.content).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

// ---- documents ----

#[derive(Debug, Deserialize)]
struct UploadDocumentRequest {
    filename: String,
    mime_type: String,
    /// Payload bytes, base64-encoded
    content_base64: String,
}

async fn list_documents(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path(node_id): Path<NodeId>,
) -> ApiResult<Json<Vec<DocumentMeta>>> {
    server.auth(&headers)?;
    let mut editor = open_editor(&server, node_id).await?;
    editor.select_tab(DetailTab::Documents).await?;
    Ok(Json(
        editor.documents().map(<[_]>::to_vec).unwrap_or_default(),
    ))
}

async fn upload_document(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path(node_id): Path<NodeId>,
    Json(body): Json<UploadDocumentRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = server.auth(&headers)?;
    let bytes = base64::decode(&body.content_base64)
        .map_err(|err| ApiError::BadRequest(format!("invalid base64 payload: {}", err)))?;
    let mut editor = open_editor(&server, node_id).await?;
    let meta = editor
        .upload_document(&auth, &body.filename, &body.mime_type, bytes)
        .await?;
    Ok((StatusCode::CREATED, Json(meta)))
}

async fn download_document(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path((node_id, document_id)): Path<(NodeId, DocumentId)>,
) -> ApiResult<impl IntoResponse> {
    server.auth(&headers)?;
    let editor = open_editor(&server, node_id).await?;
    let download = editor.download_document(document_id).await?;
    let headers = [
        (header::CONTENT_TYPE, download.meta.mime_type.clone()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", download.meta.title),
        ),
    ];
    Ok((headers, download.bytes))
}

async fn delete_document(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path((node_id, document_id)): Path<(NodeId, DocumentId)>,
) -> ApiResult<StatusCode> {
    let auth = server.auth(&headers)?;
    let mut editor = open_editor(&server, node_id).await?;
    editor.delete_document(&auth, document_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- links ----

#[derive(Debug, Deserialize)]
struct AddLinkRequest {
    title: String,
    url: String,
    #[serde(default)]
    description: Option<String>,
}

async fn list_links(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path(node_id): Path<NodeId>,
) -> ApiResult<Json<Vec<Link>>> {
    server.auth(&headers)?;
    let mut editor = open_editor(&server, node_id).await?;
    editor.select_tab(DetailTab::Links).await?;
    Ok(Json(editor.links().map(<[_]>::to_vec).unwrap_or_default()))
}

async fn add_link(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path(node_id): Path<NodeId>,
    Json(body): Json<AddLinkRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = server.auth(&headers)?;
    let mut editor = open_editor(&server, node_id).await?;
    let link = editor
        .add_link(&auth, body.title, body.url, body.description)
        .await?;
    Ok((StatusCode::CREATED, Json(link)))
}

async fn delete_link(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path((node_id, link_id)): Path<(NodeId, LinkId)>,
) -> ApiResult<StatusCode> {
    let auth = server.auth(&headers)?;
    let mut editor = open_editor(&server, node_id).await?;
    editor.delete_link(&auth, link_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- kanban ----

#[derive(Debug, Deserialize)]
struct AddBoardRequest {
    title: String,
}

#[derive(Debug, Deserialize)]
struct AddCardRequest {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    progress: i64,
}

#[derive(Debug, Deserialize)]
struct SetProgressRequest {
    progress: i64,
}

async fn list_boards(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path(node_id): Path<NodeId>,
) -> ApiResult<Json<Vec<BoardWithCards>>> {
    server.auth(&headers)?;
    let mut editor = open_editor(&server, node_id).await?;
    editor.select_tab(DetailTab::Kanban).await?;
    Ok(Json(editor.boards().map(<[_]>::to_vec).unwrap_or_default()))
}

async fn add_board(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path(node_id): Path<NodeId>,
    Json(body): Json<AddBoardRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = server.auth(&headers)?;
    let mut editor = open_editor(&server, node_id).await?;
    let board = editor.add_board(&auth, body.title).await?;
    Ok((StatusCode::CREATED, Json(board)))
}

async fn delete_board(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path((node_id, board_id)): Path<(NodeId, BoardId)>,
) -> ApiResult<StatusCode> {
    let auth = server.auth(&headers)?;
    let mut editor = open_editor(&server, node_id).await?;
    editor.delete_board(&auth, board_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_card(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path((node_id, board_id)): Path<(NodeId, BoardId)>,
    Json(body): Json<AddCardRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = server.auth(&headers)?;
    let mut editor = open_editor(&server, node_id).await?;
    let card = editor
        .add_card(
            &auth,
            board_id,
            body.title,
            body.description,
            body.tags,
            body.progress,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(card)))
}

async fn set_card_progress(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path((node_id, card_id)): Path<(NodeId, CardId)>,
    Json(body): Json<SetProgressRequest>,
) -> ApiResult<impl IntoResponse> {
    let auth = server.auth(&headers)?;
    let mut editor = open_editor(&server, node_id).await?;
    let card = editor.set_card_progress(&auth, card_id, body.progress).await?;
    Ok(Json(card))
}

async fn delete_card(
    State(server): State<Arc<TimelineServer>>,
    headers: HeaderMap,
    Path((node_id, card_id)): Path<(NodeId, CardId)>,
) -> ApiResult<StatusCode> {
    let auth = server.auth(&headers)?;
    let mut editor = open_editor(&server, node_id).await?;
    editor.delete_card(&auth, card_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
