//! # Documents
//!
//! - `POST /v1/documents`: create a document with version 1
//! - `GET /v1/documents`: list documents, newest first
//! - `GET /v1/documents/{id}`: document record
//! - `POST /v1/documents/upload?title=`: create from a raw
//!   `application/octet-stream` body
//! - `GET /v1/documents/{id}/content`: current content
//! - `GET /v1/documents/{id}/content/raw`: current content as raw bytes
//! - `POST /v1/documents/{id}/archive`: soft-delete (423 while locked)
//!
//! The JSON routes carry text. Binary files (PDF, DOCX) go through the
//! `upload` and `raw` routes; their JSON `content` is `null`.

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use lexdoc_core::DocumentId;
use lexdoc_lifecycle::{DocumentRecord, Version};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::versions::VersionResponse;
use crate::auth::Caller;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDocumentRequest {
    pub title: String,
    /// Initial content.
    pub content: String,
}

impl Validate for CreateDocumentRequest {
    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".into());
        }
        if self.content.is_empty() {
            return Err("content must not be empty".into());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UploadDocumentQuery {
    pub title: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListDocumentsQuery {
    /// Include archived documents.
    #[serde(default)]
    pub include_archived: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub title: String,
    /// `draft`, `in_review`, `approved`, `rejected` or `archived`.
    pub status: String,
    pub created_by: Uuid,
    pub created_at: String,
    pub updated_at: String,
    pub current_version_id: Uuid,
    pub current_version_number: u32,
    /// `sha256:<hex>` of the current content.
    pub current_checksum: String,
    pub required_signers: Vec<Uuid>,
    pub signed_by: Vec<Uuid>,
    pub signature_deadline: Option<String>,
    pub approved_at: Option<String>,
}

impl From<DocumentRecord> for DocumentResponse {
    fn from(d: DocumentRecord) -> Self {
        Self {
            id: *d.id.as_uuid(),
            title: d.title.clone(),
            status: d.status().as_str().to_string(),
            created_by: *d.created_by.as_uuid(),
            created_at: d.created_at.to_iso8601(),
            updated_at: d.updated_at.to_iso8601(),
            current_version_id: *d.current_version_id.as_uuid(),
            current_version_number: d.current_version_number,
            current_checksum: d.current_checksum.to_string(),
            required_signers: d.required_signers.iter().map(|a| *a.as_uuid()).collect(),
            signed_by: d.signed_by.iter().map(|a| *a.as_uuid()).collect(),
            signature_deadline: d.signature_deadline.map(|t| t.to_iso8601()),
            approved_at: d.lifecycle.approved_at.map(|t| t.to_iso8601()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateDocumentResponse {
    pub document: DocumentResponse,
    pub version: VersionResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContentResponse {
    pub version_id: Uuid,
    pub version_number: u32,
    pub checksum: String,
    pub content_size: u64,
    /// The content as text, or `null` when it is not UTF-8. Use the `raw`
    /// route for binary content.
    pub content: Option<String>,
}

impl ContentResponse {
    pub(crate) fn new(version: &Version, bytes: Vec<u8>) -> Self {
        Self {
            version_id: *version.id.as_uuid(),
            version_number: version.version_number,
            checksum: version.checksum.to_string(),
            content_size: bytes.len() as u64,
            content: String::from_utf8(bytes).ok(),
        }
    }
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/documents", get(list_documents).post(create_document))
        .route("/v1/documents/upload", post(upload_document))
        .route("/v1/documents/{id}", get(get_document))
        .route("/v1/documents/{id}/content", get(get_current_content))
        .route("/v1/documents/{id}/content/raw", get(get_current_content_raw))
        .route("/v1/documents/{id}/archive", post(archive_document))
}

/// Raw bytes with the version checksum as a strong `ETag`.
pub(crate) fn raw_content(version: &Version, bytes: Vec<u8>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::ETAG, format!("\"{}\"", version.checksum)),
        ],
        bytes,
    )
}

pub(crate) fn require_body(body: &Bytes) -> Result<(), AppError> {
    if body.is_empty() {
        return Err(AppError::Validation("content must not be empty".into()));
    }
    Ok(())
}

// ── Handlers ────────────────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/v1/documents",
    request_body = CreateDocumentRequest,
    responses(
        (status = 201, description = "Document created", body = CreateDocumentResponse),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "documents"
)]
pub(crate) async fn create_document(
    State(state): State<AppState>,
    Caller(actor): Caller,
    body: Result<Json<CreateDocumentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateDocumentResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let (doc, version) = state
        .lifecycle
        .versions
        .create_document(&req.title, req.content.as_bytes(), &actor)?;
    Ok((
        StatusCode::CREATED,
        Json(CreateDocumentResponse {
            document: doc.into(),
            version: version.into(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/v1/documents/upload",
    params(UploadDocumentQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Document created", body = CreateDocumentResponse),
        (status = 400, description = "Missing title", body = crate::error::ErrorBody),
        (status = 422, description = "Empty body or blank title", body = crate::error::ErrorBody),
    ),
    tag = "documents"
)]
pub(crate) async fn upload_document(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Query(query): Query<UploadDocumentQuery>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreateDocumentResponse>), AppError> {
    if query.title.trim().is_empty() {
        return Err(AppError::Validation("title must not be empty".into()));
    }
    require_body(&body)?;
    let (doc, version) = state
        .lifecycle
        .versions
        .create_document(&query.title, &body, &actor)?;
    Ok((
        StatusCode::CREATED,
        Json(CreateDocumentResponse {
            document: doc.into(),
            version: version.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/v1/documents",
    params(ListDocumentsQuery),
    responses(
        (status = 200, description = "Documents, newest first", body = Vec<DocumentResponse>),
    ),
    tag = "documents"
)]
pub(crate) async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<ListDocumentsQuery>,
) -> Json<Vec<DocumentResponse>> {
    Json(
        state
            .lifecycle
            .documents
            .list(query.include_archived)
            .into_iter()
            .map(Into::into)
            .collect(),
    )
}

#[utoipa::path(
    get,
    path = "/v1/documents/{id}",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document found", body = DocumentResponse),
        (status = 404, description = "Document not found", body = crate::error::ErrorBody),
    ),
    tag = "documents"
)]
pub(crate) async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentResponse>, AppError> {
    let doc = state.lifecycle.documents.get(DocumentId(id))?;
    Ok(Json(doc.into()))
}

#[utoipa::path(
    get,
    path = "/v1/documents/{id}/content",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Current content", body = ContentResponse),
        (status = 404, description = "Document not found", body = crate::error::ErrorBody),
    ),
    tag = "documents"
)]
pub(crate) async fn get_current_content(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContentResponse>, AppError> {
    let (version, bytes) = state.lifecycle.versions.current_content(DocumentId(id))?;
    Ok(Json(ContentResponse::new(&version, bytes)))
}

#[utoipa::path(
    get,
    path = "/v1/documents/{id}/content/raw",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Current content bytes", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "Document not found", body = crate::error::ErrorBody),
    ),
    tag = "documents"
)]
pub(crate) async fn get_current_content_raw(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let (version, bytes) = state.lifecycle.versions.current_content(DocumentId(id))?;
    Ok(raw_content(&version, bytes))
}

#[utoipa::path(
    post,
    path = "/v1/documents/{id}/archive",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document archived", body = DocumentResponse),
        (status = 403, description = "Not owner or admin", body = crate::error::ErrorBody),
        (status = 423, description = "Document is locked", body = crate::error::ErrorBody),
    ),
    tag = "documents"
)]
pub(crate) async fn archive_document(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentResponse>, AppError> {
    let doc = state
        .lifecycle
        .versions
        .archive_document(DocumentId(id), &actor)?;
    Ok(Json(doc.into()))
}
