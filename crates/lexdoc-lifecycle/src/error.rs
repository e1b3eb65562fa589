//! # Lifecycle Errors
//!
//! One error enum for every component. Each variant is a category the
//! HTTP layer maps to a status code; none of them is returned after a
//! partial mutation.

use lexdoc_core::{ActorId, CanonicalizationError, CryptoError, DocumentId};
use lexdoc_crypto::StoreError;
use lexdoc_state::{DocumentStatusError, LeaseError, WorkflowError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LifecycleError {
    /// Malformed input, rejected before any mutation.
    #[error("validation error: {0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// State changed underneath the caller, or the request conflicts with
    /// current state (duplicate signature, stale step, foreign lock).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A live edit lock held by another actor.
    #[error("document {document_id} is locked by {holder}")]
    Locked {
        document_id: DocumentId,
        holder: ActorId,
    },

    #[error("permission denied: {0}")]
    Permission(String),

    #[error("{signer} is not a required signer for this document")]
    NotRequiredSigner { signer: ActorId },

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

impl LifecycleError {
    pub fn not_found(kind: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<WorkflowError> for LifecycleError {
    fn from(e: WorkflowError) -> Self {
        match e {
            WorkflowError::EmptySteps => Self::Validation(e.to_string()),
            WorkflowError::NotInProgress { .. }
            | WorkflowError::NotAssignee { .. }
            | WorkflowError::NotInitiator => Self::Permission(e.to_string()),
            WorkflowError::StaleStep { .. } | WorkflowError::Terminal { .. } => {
                Self::Conflict(e.to_string())
            }
        }
    }
}

impl From<DocumentStatusError> for LifecycleError {
    fn from(e: DocumentStatusError) -> Self {
        Self::Conflict(e.to_string())
    }
}

/// Lease errors need the document id for the `Locked` variant, so they are
/// converted through this helper rather than `From`.
pub(crate) fn lease_error(document_id: DocumentId, e: LeaseError) -> LifecycleError {
    match e {
        LeaseError::HeldBy { holder } => LifecycleError::Locked {
            document_id,
            holder,
        },
        LeaseError::NotHolder { .. } => LifecycleError::Permission(e.to_string()),
        LeaseError::NotHeld => LifecycleError::Conflict(e.to_string()),
    }
}

/// Result alias for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;
