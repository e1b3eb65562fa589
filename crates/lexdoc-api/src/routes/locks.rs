//! # Edit Locks
//!
//! - `PUT /v1/documents/{id}/lock`: acquire (423 if held by another actor)
//! - `DELETE /v1/documents/{id}/lock`: release (holder or admin)
//! - `GET /v1/documents/{id}/lock`: current holder, if any

use axum::extract::{Path, State};
use axum::routing::put;
use axum::{Json, Router};
use lexdoc_core::DocumentId;
use lexdoc_state::Lease;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::Caller;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct LockResponse {
    pub document_id: Uuid,
    pub holder: Uuid,
    pub acquired_at: String,
    /// Set only when a lock TTL is configured.
    pub expires_at: Option<String>,
}

impl LockResponse {
    fn new(document_id: Uuid, lease: Lease) -> Self {
        Self {
            document_id,
            holder: *lease.holder.as_uuid(),
            acquired_at: lease.acquired_at.to_iso8601(),
            expires_at: lease.expires_at.map(|t| t.to_iso8601()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LockStatusResponse {
    pub document_id: Uuid,
    pub locked: bool,
    pub lock: Option<LockResponse>,
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/v1/documents/{id}/lock",
        put(acquire_lock).delete(release_lock).get(lock_status),
    )
}

#[utoipa::path(
    put,
    path = "/v1/documents/{id}/lock",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Lock held by caller", body = LockResponse),
        (status = 404, description = "Document not found", body = crate::error::ErrorBody),
        (status = 409, description = "Document archived", body = crate::error::ErrorBody),
        (status = 423, description = "Locked by another actor", body = crate::error::ErrorBody),
    ),
    tag = "locks"
)]
pub(crate) async fn acquire_lock(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<LockResponse>, AppError> {
    let lease = state.lifecycle.locks.acquire(DocumentId(id), &actor)?;
    Ok(Json(LockResponse::new(id, lease)))
}

#[utoipa::path(
    delete,
    path = "/v1/documents/{id}/lock",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Released lease", body = LockResponse),
        (status = 403, description = "Neither holder nor admin", body = crate::error::ErrorBody),
        (status = 409, description = "Not locked", body = crate::error::ErrorBody),
    ),
    tag = "locks"
)]
pub(crate) async fn release_lock(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<LockResponse>, AppError> {
    let lease = state.lifecycle.locks.release(DocumentId(id), &actor)?;
    Ok(Json(LockResponse::new(id, lease)))
}

#[utoipa::path(
    get,
    path = "/v1/documents/{id}/lock",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Lock status", body = LockStatusResponse),
        (status = 404, description = "Document not found", body = crate::error::ErrorBody),
    ),
    tag = "locks"
)]
pub(crate) async fn lock_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LockStatusResponse>, AppError> {
    state.lifecycle.documents.get(DocumentId(id))?;
    let lock = state
        .lifecycle
        .locks
        .holder(DocumentId(id))
        .map(|lease| LockResponse::new(id, lease));
    Ok(Json(LockStatusResponse {
        document_id: id,
        locked: lock.is_some(),
        lock,
    }))
}
