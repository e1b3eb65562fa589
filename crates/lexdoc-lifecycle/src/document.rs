//! # Document Records
//!
//! The aggregate root. Each component writes only its own fields:
//!
//! | Field group                          | Writer            |
//! |--------------------------------------|-------------------|
//! | `current_*`, `updated_at`            | `VersionChain`    |
//! | `required_signers`, `signed_by`, ... | `SignatureLedger` |
//! | `lifecycle` (status)                 | workflow/signature completion, archive |
//!
//! The edit lock is not stored here; `LockManager` keeps leases separately.

use std::collections::BTreeSet;

use lexdoc_core::{ActorId, ContentDigest, DocumentId, Timestamp, VersionId};
use lexdoc_crypto::ContentLocator;
use lexdoc_state::{DocumentStatus, StatusMachine};
use serde::{Deserialize, Serialize};

use crate::error::{LifecycleError, LifecycleResult};
use crate::ports::IndexFields;
use crate::store::Store;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub title: String,
    pub created_by: ActorId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub current_version_id: VersionId,
    pub current_version_number: u32,
    pub current_checksum: ContentDigest,
    pub current_locator: ContentLocator,
    pub lifecycle: StatusMachine,
    pub required_signers: BTreeSet<ActorId>,
    pub signed_by: BTreeSet<ActorId>,
    pub signature_deadline: Option<Timestamp>,
}

impl DocumentRecord {
    pub fn status(&self) -> DocumentStatus {
        self.lifecycle.status
    }

    pub fn is_archived(&self) -> bool {
        self.lifecycle.status == DocumentStatus::Archived
    }

    /// Every required signer has signed (and at least one was required).
    pub fn signatures_complete(&self) -> bool {
        !self.required_signers.is_empty() && self.signed_by.is_superset(&self.required_signers)
    }

    pub fn index_fields(&self) -> IndexFields {
        IndexFields {
            title: self.title.clone(),
            status: self.status(),
            current_version_number: self.current_version_number,
            checksum: self.current_checksum.to_string(),
        }
    }

    pub(crate) fn require_active(&self) -> LifecycleResult<()> {
        if self.is_archived() {
            return Err(LifecycleError::Conflict(format!(
                "document {} is archived",
                self.id
            )));
        }
        Ok(())
    }
}

/// Shared handle to all document records.
#[derive(Debug, Clone, Default)]
pub struct DocumentRegistry {
    records: Store<DocumentId, DocumentRecord>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: DocumentId) -> LifecycleResult<DocumentRecord> {
        self.records
            .get(&id)
            .ok_or_else(|| LifecycleError::not_found("document", id))
    }

    /// Documents newest first; archived ones only on request.
    pub fn list(&self, include_archived: bool) -> Vec<DocumentRecord> {
        let mut docs = self
            .records
            .filter(|d| include_archived || !d.is_archived());
        docs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        docs
    }

    pub(crate) fn insert(&self, record: DocumentRecord) {
        self.records.insert(record.id, record);
    }

    /// Atomic read-validate-update of one record.
    pub(crate) fn try_update<R>(
        &self,
        id: DocumentId,
        f: impl FnOnce(&mut DocumentRecord) -> LifecycleResult<R>,
    ) -> LifecycleResult<R> {
        self.records
            .try_update(&id, f)
            .unwrap_or_else(|| Err(LifecycleError::not_found("document", id)))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
