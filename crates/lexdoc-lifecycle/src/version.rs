//! # Version Chain
//!
//! Append-only, per-document history of immutable versions. Each version
//! carries the SHA-256 of its content and a locator into the content store.
//!
//! ## Numbering
//!
//! Version numbers start at 1 and are allocated inside the document gate:
//! "read current number, store content, insert number + 1, move the
//! document's current pointer" is one critical section. Concurrent writers
//! on one document therefore get consecutive numbers with no gaps or
//! duplicates.
//!
//! ## Restore
//!
//! Restoring version N appends a new version with N's content and the note
//! `restored from version N`. Version N itself is never modified.
//!
//! ## Retention
//!
//! [`VersionChain::run_retention`] archives versions past the age window or
//! beyond the newest `max_versions`, never the current one, and reclaims a
//! blob once no live version anywhere references its locator.

use std::sync::Arc;

use lexdoc_core::{sha256_content, ActorId, ContentDigest, DocumentId, Timestamp, VersionId};
use lexdoc_crypto::{ContentLocator, ContentStore, StoreError};
use lexdoc_state::StatusMachine;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::actor::Actor;
use crate::config::RetentionPolicy;
use crate::document::{DocumentRecord, DocumentRegistry};
use crate::error::{LifecycleError, LifecycleResult};
use crate::jobs::JobReport;
use crate::lock::LockManager;
use crate::ports::{publish, Clock, EventPublisher, LifecycleEvent, SearchIndexer};
use crate::store::{DocumentGate, Store};

const MAX_TITLE_LEN: usize = 500;
const MAX_NOTE_LEN: usize = 2000;

/// One immutable snapshot of a document's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub id: VersionId,
    pub document_id: DocumentId,
    pub version_number: u32,
    pub checksum: ContentDigest,
    pub content_locator: ContentLocator,
    pub content_size: u64,
    pub created_by: ActorId,
    pub created_at: Timestamp,
    pub change_note: String,
    /// Set when this version was produced by a restore.
    pub restored_from: Option<u32>,
    pub is_archived: bool,
    pub archived_at: Option<Timestamp>,
}

/// Result of comparing two versions of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionComparison {
    pub document_id: DocumentId,
    pub from: Version,
    pub to: Version,
    /// `to.content_size - from.content_size`.
    pub size_change: i64,
    /// Seconds from `from.created_at` to `to.created_at`.
    pub elapsed_secs: i64,
    pub same_content: bool,
}

#[derive(Clone)]
pub struct VersionChain {
    registry: DocumentRegistry,
    versions: Store<VersionId, Version>,
    chains: Store<DocumentId, Vec<VersionId>>,
    content: Arc<dyn ContentStore>,
    locks: LockManager,
    gate: DocumentGate,
    /// Serializes blob writes against blob reclamation across documents,
    /// since equal content shares one locator.
    blobs: Arc<Mutex<()>>,
    indexer: Arc<dyn SearchIndexer>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl VersionChain {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        registry: DocumentRegistry,
        content: Arc<dyn ContentStore>,
        locks: LockManager,
        gate: DocumentGate,
        indexer: Arc<dyn SearchIndexer>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            versions: Store::new(),
            chains: Store::new(),
            content,
            locks,
            gate,
            blobs: Arc::new(Mutex::new(())),
            indexer,
            publisher,
            clock,
        }
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Create a document in `draft` with version 1.
    pub fn create_document(
        &self,
        title: &str,
        content: &[u8],
        actor: &Actor,
    ) -> LifecycleResult<(DocumentRecord, Version)> {
        let title = title.trim();
        if title.is_empty() || title.chars().count() > MAX_TITLE_LEN {
            return Err(LifecycleError::Validation(format!(
                "title must be 1..={MAX_TITLE_LEN} characters"
            )));
        }
        validate_content(content)?;

        let document_id = DocumentId::new();
        self.gate.with(document_id, || {
            let now = self.clock.now();
            let version = self.store_version(
                document_id,
                1,
                content,
                "Initial version".to_string(),
                actor.id,
                None,
                now,
            )?;
            let record = DocumentRecord {
                id: document_id,
                title: title.to_string(),
                created_by: actor.id,
                created_at: now,
                updated_at: now,
                current_version_id: version.id,
                current_version_number: 1,
                current_checksum: version.checksum,
                current_locator: version.content_locator.clone(),
                lifecycle: StatusMachine::new(),
                required_signers: Default::default(),
                signed_by: Default::default(),
                signature_deadline: None,
            };
            self.registry.insert(record.clone());
            self.indexer.upsert(document_id, &record.index_fields());
            tracing::info!(document = %document_id, actor = %actor.id, "document created");
            metrics::counter!("lexdoc_documents_created_total").increment(1);
            Ok((record, version))
        })
    }

    /// Append a new version. The edit lock must be free or held by `actor`.
    pub fn create_version(
        &self,
        document_id: DocumentId,
        content: &[u8],
        change_note: Option<&str>,
        actor: &Actor,
    ) -> LifecycleResult<Version> {
        validate_content(content)?;
        let note = validate_note(change_note)?;
        self.gate
            .with(document_id, || self.append(document_id, content, note, actor.id, None))
    }

    /// Append a new version carrying an older version's content.
    pub fn restore_version(&self, version_id: VersionId, actor: &Actor) -> LifecycleResult<Version> {
        let target = self.get_version(version_id)?;
        let doc = self.registry.get(target.document_id)?;
        if !actor.owns_or_overrides(doc.created_by) {
            return Err(LifecycleError::Permission(
                "only the document owner or an admin may restore versions".into(),
            ));
        }
        let content = match self.content.get(&target.content_locator) {
            Err(StoreError::NotFound(_)) => {
                return Err(LifecycleError::Conflict(format!(
                    "content of version {} has been reclaimed",
                    target.version_number
                )))
            }
            other => other?,
        };
        let note = format!("restored from version {}", target.version_number);
        self.gate.with(target.document_id, || {
            self.append(
                target.document_id,
                &content,
                note,
                actor.id,
                Some(target.version_number),
            )
        })
    }

    /// Archive a non-current version. Admin only.
    pub fn archive_version(&self, version_id: VersionId, actor: &Actor) -> LifecycleResult<Version> {
        if !actor.has_override() {
            return Err(LifecycleError::Permission(
                "only an admin may archive versions".into(),
            ));
        }
        let version = self.get_version(version_id)?;
        self.gate.with(version.document_id, || {
            let doc = self.registry.get(version.document_id)?;
            if doc.current_version_id == version_id {
                return Err(LifecycleError::Validation(
                    "the current version cannot be archived".into(),
                ));
            }
            let now = self.clock.now();
            let archived = self.mark_archived(version_id, now)?;
            if let Err(e) = self.reclaim(&archived) {
                tracing::warn!(version = %version_id, error = %e, "blob reclamation failed");
            }
            tracing::info!(version = %version_id, actor = %actor.id, "version archived");
            Ok(archived)
        })
    }

    /// Soft-delete a document. Refused while anyone holds the edit lock.
    pub fn archive_document(
        &self,
        document_id: DocumentId,
        actor: &Actor,
    ) -> LifecycleResult<DocumentRecord> {
        let doc = self.registry.get(document_id)?;
        if !actor.owns_or_overrides(doc.created_by) {
            return Err(LifecycleError::Permission(
                "only the document owner or an admin may archive it".into(),
            ));
        }
        self.gate.with(document_id, || {
            self.locks.check_unlocked(document_id)?;
            let now = self.clock.now();
            let record = self.registry.try_update(document_id, |d| {
                d.lifecycle.archive(now, "archived")?;
                d.updated_at = now;
                Ok(d.clone())
            })?;
            self.indexer.remove(document_id);
            publish(
                self.publisher.as_ref(),
                LifecycleEvent::StatusChanged {
                    document_id,
                    status: record.status(),
                },
            );
            tracing::info!(document = %document_id, actor = %actor.id, "document archived");
            Ok(record)
        })
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn get_version(&self, version_id: VersionId) -> LifecycleResult<Version> {
        self.versions
            .get(&version_id)
            .ok_or_else(|| LifecycleError::not_found("version", version_id))
    }

    /// Versions of a document, newest first.
    pub fn list_versions(
        &self,
        document_id: DocumentId,
        include_archived: bool,
    ) -> LifecycleResult<Vec<Version>> {
        self.registry.get(document_id)?;
        let mut out: Vec<Version> = self
            .chains
            .get(&document_id)
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.versions.get(id))
            .filter(|v| include_archived || !v.is_archived)
            .collect();
        out.sort_by(|a, b| b.version_number.cmp(&a.version_number));
        Ok(out)
    }

    pub fn version_content(&self, version_id: VersionId) -> LifecycleResult<Vec<u8>> {
        let version = self.get_version(version_id)?;
        Ok(self.content.get(&version.content_locator)?)
    }

    /// The current version and its bytes.
    pub fn current_content(&self, document_id: DocumentId) -> LifecycleResult<(Version, Vec<u8>)> {
        let doc = self.registry.get(document_id)?;
        let version = self.get_version(doc.current_version_id)?;
        let bytes = self.content.get(&version.content_locator)?;
        Ok((version, bytes))
    }

    pub fn compare_versions(&self, a: VersionId, b: VersionId) -> LifecycleResult<VersionComparison> {
        let from = self.get_version(a)?;
        let to = self.get_version(b)?;
        if from.document_id != to.document_id {
            return Err(LifecycleError::Validation(
                "versions belong to different documents".into(),
            ));
        }
        let size_change = i64::try_from(to.content_size).unwrap_or(i64::MAX)
            - i64::try_from(from.content_size).unwrap_or(i64::MAX);
        Ok(VersionComparison {
            document_id: from.document_id,
            size_change,
            elapsed_secs: to.created_at.since(&from.created_at).num_seconds(),
            same_content: from.checksum == to.checksum,
            from,
            to,
        })
    }

    // ── Retention ────────────────────────────────────────────────────

    /// Archive versions outside the retention policy. Each document is
    /// handled on its own; a failure is counted and the job moves on.
    pub fn run_retention(&self, policy: &RetentionPolicy, now: Timestamp) -> JobReport {
        let mut report = JobReport::new("version_retention");
        let max_age = policy.max_age();

        for document_id in self.chains.keys() {
            let result = self.gate.with(document_id, || {
                let doc = self.registry.get(document_id)?;
                let live = self.list_versions(document_id, false)?;
                let mut archived = 0usize;
                for (rank, v) in live.iter().enumerate() {
                    report.examined += 1;
                    if v.id == doc.current_version_id {
                        continue;
                    }
                    let too_old = max_age.is_some_and(|age| now.since(&v.created_at) > age);
                    let too_many = policy.max_versions > 0 && rank >= policy.max_versions;
                    if !(too_old || too_many) {
                        continue;
                    }
                    match self.mark_archived(v.id, now).and_then(|a| {
                        self.reclaim(&a)?;
                        Ok(())
                    }) {
                        Ok(()) => archived += 1,
                        Err(e) => {
                            report.failures += 1;
                            tracing::warn!(version = %v.id, error = %e, "retention failed for version");
                        }
                    }
                }
                Ok::<_, LifecycleError>(archived)
            });
            match result {
                Ok(n) => report.affected += n,
                Err(e) => {
                    report.failures += 1;
                    tracing::warn!(document = %document_id, error = %e, "retention failed for document");
                }
            }
        }
        metrics::counter!("lexdoc_versions_archived_total").increment(report.affected as u64);
        report
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Allocate and store the next version. Call inside the gate.
    fn append(
        &self,
        document_id: DocumentId,
        content: &[u8],
        note: String,
        actor: ActorId,
        restored_from: Option<u32>,
    ) -> LifecycleResult<Version> {
        let doc = self.registry.get(document_id)?;
        doc.require_active()?;
        self.locks.check_writer(document_id, actor)?;

        let number = doc.current_version_number.checked_add(1).ok_or_else(|| {
            LifecycleError::Conflict("version number space exhausted".into())
        })?;
        let now = self.clock.now();
        let version =
            self.store_version(document_id, number, content, note, actor, restored_from, now)?;

        let record = self.registry.try_update(document_id, |d| {
            if d.current_version_number + 1 != number {
                return Err(LifecycleError::Conflict(format!(
                    "version {number} already allocated"
                )));
            }
            d.current_version_id = version.id;
            d.current_version_number = number;
            d.current_checksum = version.checksum;
            d.current_locator = version.content_locator.clone();
            d.updated_at = now;
            Ok(d.clone())
        })?;

        self.indexer.upsert(document_id, &record.index_fields());
        publish(
            self.publisher.as_ref(),
            LifecycleEvent::VersionCreated {
                document_id,
                version_id: version.id,
                version_number: number,
            },
        );
        tracing::info!(
            document = %document_id,
            version = number,
            checksum = %version.checksum,
            actor = %actor,
            "version created"
        );
        Ok(version)
    }

    #[allow(clippy::too_many_arguments)]
    fn store_version(
        &self,
        document_id: DocumentId,
        number: u32,
        content: &[u8],
        change_note: String,
        actor: ActorId,
        restored_from: Option<u32>,
        now: Timestamp,
    ) -> LifecycleResult<Version> {
        let _blobs = self.blobs.lock();
        let checksum = sha256_content(content);
        let locator = self.content.put(content)?;
        let version = Version {
            id: VersionId::new(),
            document_id,
            version_number: number,
            checksum,
            content_locator: locator,
            content_size: content.len() as u64,
            created_by: actor,
            created_at: now,
            change_note,
            restored_from,
            is_archived: false,
            archived_at: None,
        };
        self.versions.insert(version.id, version.clone());
        self.chains
            .upsert(document_id, Vec::new, |chain| chain.push(version.id));
        metrics::counter!("lexdoc_versions_created_total").increment(1);
        Ok(version)
    }

    fn mark_archived(&self, version_id: VersionId, now: Timestamp) -> LifecycleResult<Version> {
        self.versions
            .try_update(&version_id, |v| {
                if v.is_archived {
                    return Err(LifecycleError::Conflict(format!(
                        "version {} is already archived",
                        v.version_number
                    )));
                }
                v.is_archived = true;
                v.archived_at = Some(now);
                Ok(v.clone())
            })
            .unwrap_or_else(|| Err(LifecycleError::not_found("version", version_id)))
    }

    /// Remove an archived version's blob unless a live version still uses it.
    fn reclaim(&self, archived: &Version) -> LifecycleResult<bool> {
        let _blobs = self.blobs.lock();
        let locator = &archived.content_locator;
        let in_use = !self
            .versions
            .filter(|v| !v.is_archived && &v.content_locator == locator)
            .is_empty();
        if in_use {
            return Ok(false);
        }
        Ok(self.content.remove(locator)?)
    }
}

fn validate_content(content: &[u8]) -> LifecycleResult<()> {
    if content.is_empty() {
        return Err(LifecycleError::Validation("content must not be empty".into()));
    }
    Ok(())
}

fn validate_note(note: Option<&str>) -> LifecycleResult<String> {
    let note = note.map(str::trim).unwrap_or_default();
    if note.chars().count() > MAX_NOTE_LEN {
        return Err(LifecycleError::Validation(format!(
            "change note exceeds {MAX_NOTE_LEN} characters"
        )));
    }
    Ok(note.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use lexdoc_core::sha256_content;
    use lexdoc_crypto::ContentStore;

    use crate::testkit::{admin, harness, harness_with, member};
    use crate::{Clock, LifecycleConfig, LifecycleError, RetentionPolicy};

    #[test]
    fn create_document_starts_at_version_one() {
        let h = harness();
        let alice = member();
        let (doc, v1) = h.lc.versions.create_document("  Lease  ", b"v1", &alice).unwrap();
        assert_eq!(doc.title, "Lease");
        assert_eq!(v1.version_number, 1);
        assert_eq!(v1.change_note, "Initial version");
        assert_eq!(v1.checksum, sha256_content(b"v1"));
        assert_eq!(doc.current_version_id, v1.id);
        assert_eq!(doc.status(), lexdoc_state::DocumentStatus::Draft);
    }

    #[test]
    fn create_document_validates_input() {
        let h = harness();
        let alice = member();
        let long = "x".repeat(501);
        for (title, content) in [("", &b"v1"[..]), (long.as_str(), &b"v1"[..]), ("ok", &b""[..])] {
            assert!(matches!(
                h.lc.versions.create_document(title, content, &alice),
                Err(LifecycleError::Validation(_))
            ));
        }
        assert!(h.lc.documents.is_empty());
    }

    #[test]
    fn versions_are_numbered_consecutively() {
        let h = harness();
        let alice = member();
        let (doc, _) = h.lc.versions.create_document("NDA", b"v1", &alice).unwrap();
        let v2 = h.lc.versions.create_version(doc.id, b"v2", Some("edits"), &alice).unwrap();
        let v3 = h.lc.versions.create_version(doc.id, b"v3", None, &alice).unwrap();
        assert_eq!((v2.version_number, v3.version_number), (2, 3));

        let listed: Vec<u32> = h
            .lc
            .versions
            .list_versions(doc.id, false)
            .unwrap()
            .iter()
            .map(|v| v.version_number)
            .collect();
        assert_eq!(listed, vec![3, 2, 1]);
        let doc = h.lc.documents.get(doc.id).unwrap();
        assert_eq!(doc.current_version_number, 3);
        assert_eq!(doc.current_checksum, sha256_content(b"v3"));
    }

    #[test]
    fn foreign_lock_blocks_new_versions() {
        let h = harness();
        let (alice, bob) = (member(), member());
        let (doc, _) = h.lc.versions.create_document("NDA", b"v1", &alice).unwrap();
        h.lc.locks.acquire(doc.id, &alice).unwrap();

        assert!(matches!(
            h.lc.versions.create_version(doc.id, b"v2", None, &bob),
            Err(LifecycleError::Conflict(_))
        ));
        h.lc.versions.create_version(doc.id, b"v2", None, &alice).unwrap();
        assert_eq!(h.lc.documents.get(doc.id).unwrap().current_version_number, 2);
    }

    #[test]
    fn restore_appends_a_copy() {
        let h = harness();
        let (alice, bob) = (member(), member());
        let (doc, v1) = h.lc.versions.create_document("NDA", b"original", &alice).unwrap();
        h.lc.versions.create_version(doc.id, b"changed", None, &alice).unwrap();

        assert!(matches!(
            h.lc.versions.restore_version(v1.id, &bob),
            Err(LifecycleError::Permission(_))
        ));
        let v3 = h.lc.versions.restore_version(v1.id, &alice).unwrap();
        assert_eq!(v3.version_number, 3);
        assert_eq!(v3.checksum, v1.checksum);
        assert_eq!(v3.change_note, "restored from version 1");
        assert_eq!(v3.restored_from, Some(1));
        assert_eq!(h.lc.versions.get_version(v1.id).unwrap(), v1);

        let (current, bytes) = h.lc.versions.current_content(doc.id).unwrap();
        assert_eq!(current.id, v3.id);
        assert_eq!(bytes, b"original");
    }

    #[test]
    fn compare_reports_size_and_identity() {
        let h = harness();
        let alice = member();
        let (doc, v1) = h.lc.versions.create_document("NDA", b"abc", &alice).unwrap();
        h.clock.advance(Duration::minutes(5));
        let v2 = h.lc.versions.create_version(doc.id, b"abcdef", None, &alice).unwrap();

        let cmp = h.lc.versions.compare_versions(v1.id, v2.id).unwrap();
        assert_eq!(cmp.size_change, 3);
        assert_eq!(cmp.elapsed_secs, 300);
        assert!(!cmp.same_content);

        let (other, w1) = h.lc.versions.create_document("Other", b"abc", &alice).unwrap();
        assert_ne!(other.id, doc.id);
        assert!(matches!(
            h.lc.versions.compare_versions(v1.id, w1.id),
            Err(LifecycleError::Validation(_))
        ));
    }

    #[test]
    fn archive_version_rules() {
        let h = harness();
        let (alice, root) = (member(), admin());
        let (doc, v1) = h.lc.versions.create_document("NDA", b"v1", &alice).unwrap();
        let v2 = h.lc.versions.create_version(doc.id, b"v2", None, &alice).unwrap();

        assert!(matches!(
            h.lc.versions.archive_version(v1.id, &alice),
            Err(LifecycleError::Permission(_))
        ));
        assert!(matches!(
            h.lc.versions.archive_version(v2.id, &root),
            Err(LifecycleError::Validation(_))
        ));
        let archived = h.lc.versions.archive_version(v1.id, &root).unwrap();
        assert!(archived.is_archived);
        assert!(!h.content.contains(&v1.content_locator));
        assert!(matches!(
            h.lc.versions.archive_version(v1.id, &root),
            Err(LifecycleError::Conflict(_))
        ));
        assert_eq!(h.lc.versions.list_versions(doc.id, false).unwrap().len(), 1);
        assert_eq!(h.lc.versions.list_versions(doc.id, true).unwrap().len(), 2);
    }

    #[test]
    fn shared_blob_survives_archival() {
        let h = harness();
        let (alice, root) = (member(), admin());
        let (doc, v1) = h.lc.versions.create_document("NDA", b"same", &alice).unwrap();
        h.lc.versions.create_version(doc.id, b"same", None, &alice).unwrap();
        h.lc.versions.archive_version(v1.id, &root).unwrap();
        assert!(h.content.contains(&v1.content_locator));
    }

    #[test]
    fn archived_document_refuses_writes() {
        let h = harness();
        let (alice, bob) = (member(), member());
        let (doc, _) = h.lc.versions.create_document("NDA", b"v1", &alice).unwrap();

        h.lc.locks.acquire(doc.id, &alice).unwrap();
        assert!(matches!(
            h.lc.versions.archive_document(doc.id, &alice),
            Err(LifecycleError::Locked { .. })
        ));
        h.lc.locks.release(doc.id, &alice).unwrap();
        assert!(matches!(
            h.lc.versions.archive_document(doc.id, &bob),
            Err(LifecycleError::Permission(_))
        ));

        let archived = h.lc.versions.archive_document(doc.id, &alice).unwrap();
        assert!(archived.is_archived());
        assert!(matches!(
            h.lc.versions.create_version(doc.id, b"v2", None, &alice),
            Err(LifecycleError::Conflict(_))
        ));
        assert!(h.lc.documents.list(false).is_empty());
        assert_eq!(h.lc.documents.list(true).len(), 1);
    }

    #[test]
    fn retention_keeps_current_and_newest() {
        let h = harness_with(LifecycleConfig {
            retention: RetentionPolicy {
                max_age_days: 0,
                max_versions: 2,
            },
            ..LifecycleConfig::default()
        });
        let alice = member();
        let (doc, _) = h.lc.versions.create_document("NDA", b"v1", &alice).unwrap();
        for body in [&b"v2"[..], b"v3", b"v4"] {
            h.lc.versions.create_version(doc.id, body, None, &alice).unwrap();
        }

        let report = h.lc.versions.run_retention(&h.lc.config.retention, h.clock.now());
        assert_eq!(report.affected, 2);
        assert_eq!(report.failures, 0);
        let live: Vec<u32> = h
            .lc
            .versions
            .list_versions(doc.id, false)
            .unwrap()
            .iter()
            .map(|v| v.version_number)
            .collect();
        assert_eq!(live, vec![4, 3]);

        let again = h.lc.versions.run_retention(&h.lc.config.retention, h.clock.now());
        assert_eq!(again.affected, 0);
    }

    #[test]
    fn retention_archives_by_age() {
        let h = harness();
        let alice = member();
        let (doc, v1) = h.lc.versions.create_document("NDA", b"v1", &alice).unwrap();
        h.clock.advance(Duration::days(100));
        h.lc.versions.create_version(doc.id, b"v2", None, &alice).unwrap();

        let report = h.lc.versions.run_retention(&RetentionPolicy::default(), h.clock.now());
        assert_eq!(report.affected, 1);
        assert!(h.lc.versions.get_version(v1.id).unwrap().is_archived);
    }

    #[test]
    fn content_reads_detect_corruption() {
        let h = harness();
        let alice = member();
        let (_, v1) = h.lc.versions.create_document("NDA", b"v1", &alice).unwrap();
        h.content.corrupt(&v1.content_locator, b"tampered".to_vec());
        assert!(matches!(
            h.lc.versions.version_content(v1.id),
            Err(LifecycleError::Storage(_))
        ));
    }
}
