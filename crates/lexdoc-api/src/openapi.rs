//! # OpenAPI Specification Assembly
//!
//! Collects every utoipa-documented handler into one OpenAPI 3.1 document,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "lexdoc API",
        version = "0.1.0",
        description = "Legal document lifecycle: versions, edit locks, approval workflows and signatures.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Documents
        crate::routes::documents::create_document,
        crate::routes::documents::list_documents,
        crate::routes::documents::get_document,
        crate::routes::documents::upload_document,
        crate::routes::documents::get_current_content,
        crate::routes::documents::get_current_content_raw,
        crate::routes::documents::archive_document,
        // Versions
        crate::routes::versions::create_version,
        crate::routes::versions::upload_version,
        crate::routes::versions::list_versions,
        crate::routes::versions::get_version,
        crate::routes::versions::get_version_content,
        crate::routes::versions::get_version_content_raw,
        crate::routes::versions::restore_version,
        crate::routes::versions::archive_version,
        crate::routes::versions::compare_versions,
        // Locks
        crate::routes::locks::acquire_lock,
        crate::routes::locks::release_lock,
        crate::routes::locks::lock_status,
        // Workflows
        crate::routes::workflows::create_workflow,
        crate::routes::workflows::list_workflows,
        crate::routes::workflows::get_workflow,
        crate::routes::workflows::advance_workflow,
        crate::routes::workflows::cancel_workflow,
        // Signatures
        crate::routes::signatures::request_signatures,
        crate::routes::signatures::sign_document,
        crate::routes::signatures::list_signatures,
        crate::routes::signatures::verify_document,
        crate::routes::signatures::get_public_key,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::documents::CreateDocumentRequest,
        crate::routes::documents::CreateDocumentResponse,
        crate::routes::documents::DocumentResponse,
        crate::routes::documents::ContentResponse,
        crate::routes::versions::CreateVersionRequest,
        crate::routes::versions::VersionResponse,
        crate::routes::versions::ComparisonResponse,
        crate::routes::locks::LockResponse,
        crate::routes::locks::LockStatusResponse,
        crate::routes::workflows::CreateWorkflowRequest,
        crate::routes::workflows::StepInput,
        crate::routes::workflows::AdvanceRequest,
        crate::routes::workflows::CancelRequest,
        crate::routes::workflows::WorkflowResponse,
        crate::routes::workflows::StepResponse,
        crate::routes::signatures::RequestSignaturesRequest,
        crate::routes::signatures::SignatureResponse,
        crate::routes::signatures::SignerVerificationResponse,
        crate::routes::signatures::VerificationResponse,
        crate::routes::signatures::PublicKeyResponse,
    )),
    tags(
        (name = "documents", description = "Document records and current content"),
        (name = "versions", description = "Immutable version history"),
        (name = "locks", description = "Exclusive edit locks"),
        (name = "workflows", description = "Sequential approval workflows"),
        (name = "signatures", description = "Ed25519 signatures and integrity verification"),
    )
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_area_is_documented() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/v1/documents",
            "/v1/documents/{id}/versions",
            "/v1/documents/{id}/lock",
            "/v1/workflows/{id}/advance",
            "/v1/documents/{id}/verify",
            "/v1/signers/{id}/public-key",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected}"
            );
        }
    }
}
