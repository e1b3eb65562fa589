//! # API Error Types
//!
//! `AppError` implements `IntoResponse`. Lifecycle errors map onto it
//! category by category; storage, crypto and canonicalization failures
//! become 500s whose details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lexdoc_lifecycle::LifecycleError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// JSON error envelope used by every non-2xx response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable code, e.g. `NOT_FOUND`, `LOCKED`.
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    /// Business-rule validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed request, or a signer that was never requested (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("conflict: {0}")]
    Conflict(String),

    /// Another actor holds the edit lock (423).
    #[error("locked: {0}")]
    Locked(String),

    /// Logged, but not returned to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Locked(_) => (StatusCode::LOCKED, "LOCKED"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => {
                tracing::error!(error = %self, "internal server error");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::Validation(msg) => Self::Validation(msg),
            LifecycleError::NotFound { .. } => Self::NotFound(err.to_string()),
            LifecycleError::Conflict(msg) => Self::Conflict(msg),
            LifecycleError::Locked { .. } => Self::Locked(err.to_string()),
            LifecycleError::Permission(msg) => Self::Forbidden(msg),
            LifecycleError::NotRequiredSigner { .. } => Self::BadRequest(err.to_string()),
            LifecycleError::Storage(_)
            | LifecycleError::Crypto(_)
            | LifecycleError::Canonicalization(_) => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use lexdoc_core::{ActorId, DocumentId};

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn lifecycle_errors_map_to_statuses() {
        let cases = [
            (LifecycleError::Validation("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (
                LifecycleError::not_found("document", DocumentId::new()),
                StatusCode::NOT_FOUND,
            ),
            (LifecycleError::Conflict("x".into()), StatusCode::CONFLICT),
            (
                LifecycleError::Locked {
                    document_id: DocumentId::new(),
                    holder: ActorId::new(),
                },
                StatusCode::LOCKED,
            ),
            (LifecycleError::Permission("x".into()), StatusCode::FORBIDDEN),
            (
                LifecycleError::NotRequiredSigner {
                    signer: ActorId::new(),
                },
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, expected) in cases {
            let (status, _) = AppError::from(err).status_and_code();
            assert_eq!(status, expected);
        }
    }

    #[tokio::test]
    async fn locked_response_body() {
        let (status, body) = response_parts(AppError::Locked("held by someone".into())).await;
        assert_eq!(status, StatusCode::LOCKED);
        assert_eq!(body.error.code, "LOCKED");
        assert!(body.error.message.contains("held by someone"));
    }

    #[tokio::test]
    async fn internal_details_are_hidden() {
        let (status, body) = response_parts(AppError::Internal("disk on fire".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.error.message.contains("disk"));
    }

    #[test]
    fn details_skipped_when_absent() {
        let body = ErrorBody {
            error: ErrorDetail {
                code: "CONFLICT".into(),
                message: "m".into(),
                details: None,
            },
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("details"));
    }
}
