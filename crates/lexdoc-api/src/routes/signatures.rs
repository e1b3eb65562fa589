//! # Signatures
//!
//! - `POST /v1/documents/{id}/signatures/request`: add required signers
//! - `POST /v1/documents/{id}/signatures`: sign the current content as the caller
//! - `GET /v1/documents/{id}/signatures`: signatures in signing order
//! - `GET /v1/documents/{id}/verify`: re-check every signature against the
//!   current content
//! - `GET /v1/signers/{id}/public-key`

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use lexdoc_core::{ActorId, DocumentId, Timestamp};
use lexdoc_lifecycle::{SignatureRecord, SignerVerification, VerificationReport};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::documents::DocumentResponse;
use crate::auth::Caller;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct RequestSignaturesRequest {
    pub signers: Vec<Uuid>,
    /// RFC 3339 UTC.
    #[serde(default)]
    pub deadline: Option<String>,
}

impl Validate for RequestSignaturesRequest {
    fn validate(&self) -> Result<(), String> {
        if self.signers.is_empty() {
            return Err("at least one signer is required".into());
        }
        if let Some(deadline) = &self.deadline {
            Timestamp::parse(deadline).map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignatureResponse {
    pub signer_id: Uuid,
    pub document_id: Uuid,
    /// `sha256:<hex>` of the content that was signed.
    pub content_hash: String,
    pub version_number: u32,
    /// Hex-encoded Ed25519 signature.
    pub signature: String,
    /// Hex-encoded Ed25519 public key.
    pub public_key: String,
    pub timestamp: String,
}

impl From<SignatureRecord> for SignatureResponse {
    fn from(r: SignatureRecord) -> Self {
        Self {
            signer_id: *r.signer_id.as_uuid(),
            document_id: *r.document_id.as_uuid(),
            content_hash: r.content_hash.to_string(),
            version_number: r.version_number,
            signature: r.signature.to_hex(),
            public_key: r.public_key.to_hex(),
            timestamp: r.timestamp.to_iso8601(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignerVerificationResponse {
    pub signer_id: Uuid,
    pub timestamp: String,
    pub signature_valid: bool,
    pub document_intact: bool,
    pub verified: bool,
}

impl From<SignerVerification> for SignerVerificationResponse {
    fn from(v: SignerVerification) -> Self {
        Self {
            signer_id: *v.signer_id.as_uuid(),
            timestamp: v.timestamp.to_iso8601(),
            signature_valid: v.signature_valid,
            document_intact: v.document_intact,
            verified: v.verified,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerificationResponse {
    pub document_id: Uuid,
    /// True only when there is at least one signature and all verify.
    pub verified: bool,
    pub signatures: Vec<SignerVerificationResponse>,
    pub total_signatures: usize,
    pub required_signatures: usize,
}

impl From<VerificationReport> for VerificationResponse {
    fn from(r: VerificationReport) -> Self {
        Self {
            document_id: *r.document_id.as_uuid(),
            verified: r.verified,
            signatures: r.signatures.into_iter().map(Into::into).collect(),
            total_signatures: r.total_signatures,
            required_signatures: r.required_signatures,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PublicKeyResponse {
    pub signer_id: Uuid,
    pub public_key: String,
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/documents/{id}/signatures/request",
            post(request_signatures),
        )
        .route(
            "/v1/documents/{id}/signatures",
            get(list_signatures).post(sign_document),
        )
        .route("/v1/documents/{id}/verify", get(verify_document))
        .route("/v1/signers/{id}/public-key", get(get_public_key))
}

// ── Handlers ────────────────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/v1/documents/{id}/signatures/request",
    params(("id" = Uuid, Path, description = "Document ID")),
    request_body = RequestSignaturesRequest,
    responses(
        (status = 200, description = "Signers added", body = DocumentResponse),
        (status = 403, description = "Not owner or admin", body = crate::error::ErrorBody),
        (status = 404, description = "Document not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "signatures"
)]
pub(crate) async fn request_signatures(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
    body: Result<Json<RequestSignaturesRequest>, JsonRejection>,
) -> Result<Json<DocumentResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let deadline = req
        .deadline
        .as_deref()
        .map(Timestamp::parse)
        .transpose()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let signers: Vec<ActorId> = req.signers.into_iter().map(ActorId).collect();
    let doc = state.lifecycle.signatures.request_signatures(
        DocumentId(id),
        &signers,
        deadline,
        &actor,
    )?;
    Ok(Json(doc.into()))
}

#[utoipa::path(
    post,
    path = "/v1/documents/{id}/signatures",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Signature recorded", body = SignatureResponse),
        (status = 400, description = "Caller is not a required signer", body = crate::error::ErrorBody),
        (status = 409, description = "Already signed, or document archived", body = crate::error::ErrorBody),
    ),
    tag = "signatures"
)]
pub(crate) async fn sign_document(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<SignatureResponse>, AppError> {
    let record = state.lifecycle.signatures.sign(DocumentId(id), &actor)?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    get,
    path = "/v1/documents/{id}/signatures",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Signatures in signing order", body = Vec<SignatureResponse>),
        (status = 404, description = "Document not found", body = crate::error::ErrorBody),
    ),
    tag = "signatures"
)]
pub(crate) async fn list_signatures(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<SignatureResponse>>, AppError> {
    state.lifecycle.documents.get(DocumentId(id))?;
    let records = state.lifecycle.signatures.signatures(DocumentId(id));
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/v1/documents/{id}/verify",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Verification report", body = VerificationResponse),
        (status = 404, description = "Document not found", body = crate::error::ErrorBody),
    ),
    tag = "signatures"
)]
pub(crate) async fn verify_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VerificationResponse>, AppError> {
    let report = state.lifecycle.signatures.verify(DocumentId(id))?;
    Ok(Json(report.into()))
}

#[utoipa::path(
    get,
    path = "/v1/signers/{id}/public-key",
    params(("id" = Uuid, Path, description = "Signer (actor) ID")),
    responses(
        (status = 200, description = "Signer's current public key", body = PublicKeyResponse),
        (status = 404, description = "Signer has no key", body = crate::error::ErrorBody),
    ),
    tag = "signatures"
)]
pub(crate) async fn get_public_key(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicKeyResponse>, AppError> {
    let key = state
        .lifecycle
        .signatures
        .public_key(ActorId(id))
        .ok_or_else(|| AppError::NotFound(format!("no public key for signer {id}")))?;
    Ok(Json(PublicKeyResponse {
        signer_id: id,
        public_key: key.to_hex(),
    }))
}
