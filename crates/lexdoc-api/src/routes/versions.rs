//! # Versions
//!
//! - `POST /v1/documents/{id}/versions`: append a version (409 if another
//!   actor holds the lock)
//! - `POST /v1/documents/{id}/versions/upload`: the same from a raw
//!   `application/octet-stream` body
//! - `GET /v1/documents/{id}/versions`: history, newest first
//! - `GET /v1/versions/{id}`, `GET /v1/versions/{id}/content`,
//!   `GET /v1/versions/{id}/content/raw`
//! - `POST /v1/versions/{id}/restore`: append a copy of an old version
//! - `POST /v1/versions/{id}/archive`: admin only
//! - `GET /v1/versions/compare?from=&to=`

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use lexdoc_core::{DocumentId, VersionId};
use lexdoc_lifecycle::{Version, VersionComparison};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::documents::{raw_content, require_body, ContentResponse};
use crate::auth::Caller;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVersionRequest {
    pub content: String,
    #[serde(default)]
    pub change_note: Option<String>,
}

impl Validate for CreateVersionRequest {
    fn validate(&self) -> Result<(), String> {
        if self.content.is_empty() {
            return Err("content must not be empty".into());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UploadVersionQuery {
    pub change_note: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListVersionsQuery {
    #[serde(default)]
    pub include_archived: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CompareQuery {
    pub from: Uuid,
    pub to: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VersionResponse {
    pub id: Uuid,
    pub document_id: Uuid,
    pub version_number: u32,
    pub checksum: String,
    pub content_size: u64,
    pub created_by: Uuid,
    pub created_at: String,
    pub change_note: String,
    pub restored_from: Option<u32>,
    pub is_archived: bool,
    pub archived_at: Option<String>,
}

impl From<Version> for VersionResponse {
    fn from(v: Version) -> Self {
        Self {
            id: *v.id.as_uuid(),
            document_id: *v.document_id.as_uuid(),
            version_number: v.version_number,
            checksum: v.checksum.to_string(),
            content_size: v.content_size,
            created_by: *v.created_by.as_uuid(),
            created_at: v.created_at.to_iso8601(),
            change_note: v.change_note,
            restored_from: v.restored_from,
            is_archived: v.is_archived,
            archived_at: v.archived_at.map(|t| t.to_iso8601()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ComparisonResponse {
    pub document_id: Uuid,
    pub from: VersionResponse,
    pub to: VersionResponse,
    pub size_change: i64,
    pub elapsed_secs: i64,
    pub same_content: bool,
}

impl From<VersionComparison> for ComparisonResponse {
    fn from(c: VersionComparison) -> Self {
        Self {
            document_id: *c.document_id.as_uuid(),
            from: c.from.into(),
            to: c.to.into(),
            size_change: c.size_change,
            elapsed_secs: c.elapsed_secs,
            same_content: c.same_content,
        }
    }
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/documents/{id}/versions",
            get(list_versions).post(create_version),
        )
        .route("/v1/documents/{id}/versions/upload", post(upload_version))
        .route("/v1/versions/compare", get(compare_versions))
        .route("/v1/versions/{id}", get(get_version))
        .route("/v1/versions/{id}/content", get(get_version_content))
        .route("/v1/versions/{id}/content/raw", get(get_version_content_raw))
        .route("/v1/versions/{id}/restore", post(restore_version))
        .route("/v1/versions/{id}/archive", post(archive_version))
}

// ── Handlers ────────────────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/v1/documents/{id}/versions",
    params(("id" = Uuid, Path, description = "Document ID")),
    request_body = CreateVersionRequest,
    responses(
        (status = 200, description = "Version created", body = VersionResponse),
        (status = 404, description = "Document not found", body = crate::error::ErrorBody),
        (status = 409, description = "Locked by another actor, or archived", body = crate::error::ErrorBody),
    ),
    tag = "versions"
)]
pub(crate) async fn create_version(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    body: Result<Json<CreateVersionRequest>, JsonRejection>,
) -> Result<Json<VersionResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let version = state.lifecycle.versions.create_version(
        DocumentId(id),
        req.content.as_bytes(),
        req.change_note.as_deref(),
        &actor,
    )?;
    Ok(Json(version.into()))
}

#[utoipa::path(
    post,
    path = "/v1/documents/{id}/versions/upload",
    params(("id" = Uuid, Path, description = "Document ID"), UploadVersionQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Version created", body = VersionResponse),
        (status = 404, description = "Document not found", body = crate::error::ErrorBody),
        (status = 409, description = "Locked by another actor, or archived", body = crate::error::ErrorBody),
        (status = 422, description = "Empty body", body = crate::error::ErrorBody),
    ),
    tag = "versions"
)]
pub(crate) async fn upload_version(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    Query(query): Query<UploadVersionQuery>,
    body: Bytes,
) -> Result<Json<VersionResponse>, AppError> {
    require_body(&body)?;
    let version = state.lifecycle.versions.create_version(
        DocumentId(id),
        &body,
        query.change_note.as_deref(),
        &actor,
    )?;
    Ok(Json(version.into()))
}

#[utoipa::path(
    get,
    path = "/v1/documents/{id}/versions",
    params(("id" = Uuid, Path, description = "Document ID"), ListVersionsQuery),
    responses(
        (status = 200, description = "Versions, newest first", body = Vec<VersionResponse>),
        (status = 404, description = "Document not found", body = crate::error::ErrorBody),
    ),
    tag = "versions"
)]
pub(crate) async fn list_versions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ListVersionsQuery>,
) -> Result<Json<Vec<VersionResponse>>, AppError> {
    let versions = state
        .lifecycle
        .versions
        .list_versions(DocumentId(id), query.include_archived)?;
    Ok(Json(versions.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/v1/versions/{id}",
    params(("id" = Uuid, Path, description = "Version ID")),
    responses(
        (status = 200, description = "Version found", body = VersionResponse),
        (status = 404, description = "Version not found", body = crate::error::ErrorBody),
    ),
    tag = "versions"
)]
pub(crate) async fn get_version(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VersionResponse>, AppError> {
    Ok(Json(state.lifecycle.versions.get_version(VersionId(id))?.into()))
}

#[utoipa::path(
    get,
    path = "/v1/versions/{id}/content",
    params(("id" = Uuid, Path, description = "Version ID")),
    responses(
        (status = 200, description = "Version content", body = ContentResponse),
        (status = 404, description = "Version not found", body = crate::error::ErrorBody),
    ),
    tag = "versions"
)]
pub(crate) async fn get_version_content(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContentResponse>, AppError> {
    let version = state.lifecycle.versions.get_version(VersionId(id))?;
    let bytes = state.lifecycle.versions.version_content(version.id)?;
    Ok(Json(ContentResponse::new(&version, bytes)))
}

#[utoipa::path(
    get,
    path = "/v1/versions/{id}/content/raw",
    params(("id" = Uuid, Path, description = "Version ID")),
    responses(
        (status = 200, description = "Version content bytes", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "Version not found", body = crate::error::ErrorBody),
    ),
    tag = "versions"
)]
pub(crate) async fn get_version_content_raw(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let version = state.lifecycle.versions.get_version(VersionId(id))?;
    let bytes = state.lifecycle.versions.version_content(version.id)?;
    Ok(raw_content(&version, bytes))
}

#[utoipa::path(
    post,
    path = "/v1/versions/{id}/restore",
    params(("id" = Uuid, Path, description = "Version ID to restore")),
    responses(
        (status = 200, description = "New version carrying the old content", body = VersionResponse),
        (status = 403, description = "Not owner or admin", body = crate::error::ErrorBody),
        (status = 409, description = "Locked by another actor", body = crate::error::ErrorBody),
    ),
    tag = "versions"
)]
pub(crate) async fn restore_version(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<VersionResponse>, AppError> {
    let version = state.lifecycle.versions.restore_version(VersionId(id), &actor)?;
    Ok(Json(version.into()))
}

#[utoipa::path(
    post,
    path = "/v1/versions/{id}/archive",
    params(("id" = Uuid, Path, description = "Version ID")),
    responses(
        (status = 200, description = "Version archived", body = VersionResponse),
        (status = 403, description = "Admin only", body = crate::error::ErrorBody),
        (status = 422, description = "Current version", body = crate::error::ErrorBody),
    ),
    tag = "versions"
)]
pub(crate) async fn archive_version(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<VersionResponse>, AppError> {
    let version = state.lifecycle.versions.archive_version(VersionId(id), &actor)?;
    Ok(Json(version.into()))
}

#[utoipa::path(
    get,
    path = "/v1/versions/compare",
    params(CompareQuery),
    responses(
        (status = 200, description = "Comparison", body = ComparisonResponse),
        (status = 422, description = "Versions of different documents", body = crate::error::ErrorBody),
    ),
    tag = "versions"
)]
pub(crate) async fn compare_versions(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<ComparisonResponse>, AppError> {
    let cmp = state
        .lifecycle
        .versions
        .compare_versions(VersionId(query.from), VersionId(query.to))?;
    Ok(Json(cmp.into()))
}
