//! # Signature Ledger
//!
//! Collects one Ed25519 signature per required signer and verifies them
//! later against the document's current content.
//!
//! ## Signed payload
//!
//! ```json
//! {"content_hash":"sha256:…","document_id":"…","signer_id":"…","timestamp":"…Z"}
//! ```
//!
//! serialized with `CanonicalBytes` (sorted keys, no whitespace). The same
//! bytes are rebuilt from the stored record during verification.
//!
//! `verify` checks each record against the key ring's current key for the
//! signer. A signer with no key in custody, or whose key was rotated,
//! reports `signature_valid = false`.
//!
//! ## Exactly-once approval
//!
//! Signing runs inside the document gate, so `(document, signer)` is
//! checked and recorded atomically, and the approval triggered by the last
//! signer happens once even if that signer's requests race.

use std::collections::BTreeSet;
use std::sync::Arc;

use lexdoc_core::{sha256_content, ActorId, CanonicalBytes, ContentDigest, DocumentId, Timestamp};
use lexdoc_crypto::{verify_with_public_key, Ed25519PublicKey, Ed25519Signature};
use lexdoc_state::DocumentStatus;
use serde::{Deserialize, Serialize};

use crate::actor::Actor;
use crate::document::{DocumentRecord, DocumentRegistry};
use crate::error::{LifecycleError, LifecycleResult};
use crate::keyring::KeyRing;
use crate::ports::{
    notify_quietly, publish, Clock, EventPublisher, LifecycleEvent, NotificationKind, Notifier,
};
use crate::store::{DocumentGate, Store};
use crate::version::VersionChain;

/// A stored signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    pub signer_id: ActorId,
    pub document_id: DocumentId,
    /// Digest of the document content at signing time.
    pub content_hash: ContentDigest,
    /// Version that was current when signed.
    pub version_number: u32,
    pub signature: Ed25519Signature,
    /// Signer's public key at signing time.
    pub public_key: Ed25519PublicKey,
    pub timestamp: Timestamp,
}

impl SignatureRecord {
    /// Check the signature against the public key stored in the record,
    /// without consulting any key ring.
    pub fn verify_detached(&self) -> LifecycleResult<()> {
        let canonical = CanonicalBytes::new(&self.payload())?;
        verify_with_public_key(&canonical, &self.signature, &self.public_key)?;
        Ok(())
    }

    fn payload(&self) -> SignaturePayload {
        SignaturePayload {
            signer_id: self.signer_id,
            document_id: self.document_id,
            content_hash: self.content_hash.to_string(),
            timestamp: self.timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
struct SignaturePayload {
    signer_id: ActorId,
    document_id: DocumentId,
    content_hash: String,
    timestamp: Timestamp,
}

/// Per-signer verification outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignerVerification {
    pub signer_id: ActorId,
    pub timestamp: Timestamp,
    pub signature_valid: bool,
    pub document_intact: bool,
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub document_id: DocumentId,
    /// True only if there is at least one signature and all verify.
    pub verified: bool,
    pub signatures: Vec<SignerVerification>,
    pub total_signatures: usize,
    pub required_signatures: usize,
}

#[derive(Clone)]
pub struct SignatureLedger {
    ledger: Store<DocumentId, Vec<SignatureRecord>>,
    registry: DocumentRegistry,
    versions: VersionChain,
    keyring: Arc<dyn KeyRing>,
    gate: DocumentGate,
    notifier: Arc<dyn Notifier>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl SignatureLedger {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        registry: DocumentRegistry,
        versions: VersionChain,
        keyring: Arc<dyn KeyRing>,
        gate: DocumentGate,
        notifier: Arc<dyn Notifier>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ledger: Store::new(),
            registry,
            versions,
            keyring,
            gate,
            notifier,
            publisher,
            clock,
        }
    }

    /// Add signers to the document's required set and notify the new ones.
    /// Owner or admin only.
    pub fn request_signatures(
        &self,
        document_id: DocumentId,
        signers: &[ActorId],
        deadline: Option<Timestamp>,
        actor: &Actor,
    ) -> LifecycleResult<DocumentRecord> {
        if signers.is_empty() {
            return Err(LifecycleError::Validation(
                "at least one signer is required".into(),
            ));
        }
        let doc = self.registry.get(document_id)?;
        if !actor.owns_or_overrides(doc.created_by) {
            return Err(LifecycleError::Permission(
                "only the document owner or an admin may request signatures".into(),
            ));
        }

        let now = self.clock.now();
        let (record, added) = self.gate.with(document_id, || {
            self.registry.try_update(document_id, |d| {
                d.require_active()?;
                let added: BTreeSet<ActorId> = signers
                    .iter()
                    .copied()
                    .filter(|s| !d.required_signers.contains(s))
                    .collect();
                d.required_signers.extend(added.iter().copied());
                if deadline.is_some() {
                    d.signature_deadline = deadline;
                }
                d.lifecycle.begin_review(now, "signatures requested");
                d.updated_at = now;
                Ok((d.clone(), added))
            })
        })?;

        for signer in &added {
            notify_quietly(
                self.notifier.as_ref(),
                *signer,
                NotificationKind::SignatureRequested,
                serde_json::json!({
                    "document_id": document_id,
                    "title": record.title,
                    "deadline": record.signature_deadline,
                    "requested_by": actor.id,
                }),
            );
        }
        tracing::info!(
            document = %document_id,
            added = added.len(),
            required = record.required_signers.len(),
            "signatures requested"
        );
        Ok(record)
    }

    /// Sign the document's current content as `signer`.
    pub fn sign(&self, document_id: DocumentId, signer: &Actor) -> LifecycleResult<SignatureRecord> {
        let (record, doc, approved) = self.gate.with(document_id, || {
            let doc = self.registry.get(document_id)?;
            doc.require_active()?;
            if !doc.required_signers.contains(&signer.id) {
                return Err(LifecycleError::NotRequiredSigner { signer: signer.id });
            }
            if doc.signed_by.contains(&signer.id) {
                return Err(LifecycleError::Conflict(format!(
                    "{} has already signed this document",
                    signer.id
                )));
            }

            let (version, content) = self.versions.current_content(document_id)?;
            let now = self.clock.now();
            let payload = SignaturePayload {
                signer_id: signer.id,
                document_id,
                content_hash: sha256_content(&content).to_string(),
                timestamp: now,
            };
            let canonical = CanonicalBytes::new(&payload)?;
            let (signature, public_key) = self.keyring.sign(signer.id, &canonical)?;
            let record = SignatureRecord {
                signer_id: signer.id,
                document_id,
                content_hash: sha256_content(&content),
                version_number: version.version_number,
                signature,
                public_key,
                timestamp: now,
            };

            let (doc, approved) = self.registry.try_update(document_id, |d| {
                d.signed_by.insert(signer.id);
                let approved = if d.signatures_complete() {
                    d.lifecycle.approve(now, "all required signatures collected")?
                } else {
                    false
                };
                d.updated_at = now;
                Ok((d.clone(), approved))
            })?;
            self.ledger
                .upsert(document_id, Vec::new, |sigs| sigs.push(record.clone()));
            Ok((record, doc, approved))
        })?;

        publish(
            self.publisher.as_ref(),
            LifecycleEvent::SignatureAdded {
                document_id,
                signer_id: signer.id,
                signed: doc.signed_by.len(),
                required: doc.required_signers.len(),
            },
        );
        if approved {
            publish(
                self.publisher.as_ref(),
                LifecycleEvent::StatusChanged {
                    document_id,
                    status: DocumentStatus::Approved,
                },
            );
            metrics::counter!("lexdoc_documents_approved_total").increment(1);
            tracing::info!(document = %document_id, "document approved by signatures");
        }
        tracing::info!(
            document = %document_id,
            signer = %signer.id,
            signed = doc.signed_by.len(),
            required = doc.required_signers.len(),
            "document signed"
        );
        metrics::counter!("lexdoc_signatures_total").increment(1);
        Ok(record)
    }

    /// Check every stored signature against the current content and the
    /// signer's key. Failed checks are reported as `false`, never as errors;
    /// only an unknown document is an error.
    pub fn verify(&self, document_id: DocumentId) -> LifecycleResult<VerificationReport> {
        let doc = self.registry.get(document_id)?;
        let records = self.signatures(document_id);

        let current_hash = match self.versions.current_content(document_id) {
            Ok((_, bytes)) => Some(sha256_content(&bytes)),
            Err(e) => {
                tracing::warn!(document = %document_id, error = %e, "current content unreadable during verification");
                None
            }
        };

        let signatures: Vec<SignerVerification> = records
            .iter()
            .map(|r| {
                let document_intact = current_hash == Some(r.content_hash);
                let signature_valid = self.check_signature(r);
                SignerVerification {
                    signer_id: r.signer_id,
                    timestamp: r.timestamp,
                    signature_valid,
                    document_intact,
                    verified: signature_valid && document_intact,
                }
            })
            .collect();

        let verified = !signatures.is_empty() && signatures.iter().all(|s| s.verified);
        metrics::counter!("lexdoc_verifications_total").increment(1);
        Ok(VerificationReport {
            document_id,
            verified,
            total_signatures: signatures.len(),
            required_signatures: doc.required_signers.len(),
            signatures,
        })
    }

    /// Signatures on a document in signing order.
    pub fn signatures(&self, document_id: DocumentId) -> Vec<SignatureRecord> {
        self.ledger.get(&document_id).unwrap_or_default()
    }

    pub fn public_key(&self, signer: ActorId) -> Option<Ed25519PublicKey> {
        self.keyring.public_key(signer)
    }

    fn check_signature(&self, record: &SignatureRecord) -> bool {
        // Only a key held in custody counts; the key embedded in the record
        // cannot vouch for itself.
        match self.keyring.public_key(record.signer_id) {
            Some(current) if current == record.public_key => record.verify_detached().is_ok(),
            Some(_) => false,
            None => {
                tracing::warn!(signer = %record.signer_id, "no custody key for signer");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testkit::{admin, harness, member};
    use crate::{Lifecycle, MemoryKeyRing};

    #[test]
    fn request_validates_and_notifies_new_signers_only() {
        let h = harness();
        let (owner, s1, s2, stranger) = (member(), member(), member(), member());
        let (doc, _) = h.lc.versions.create_document("NDA", b"v1", &owner).unwrap();

        assert!(matches!(
            h.lc.signatures.request_signatures(doc.id, &[], None, &owner),
            Err(LifecycleError::Validation(_))
        ));
        assert!(matches!(
            h.lc.signatures.request_signatures(doc.id, &[s1.id], None, &stranger),
            Err(LifecycleError::Permission(_))
        ));

        h.lc.signatures.request_signatures(doc.id, &[s1.id], None, &owner).unwrap();
        let record = h
            .lc
            .signatures
            .request_signatures(doc.id, &[s1.id, s2.id], None, &admin())
            .unwrap();
        assert_eq!(record.required_signers.len(), 2);
        assert_eq!(record.status(), DocumentStatus::InReview);
        assert_eq!(h.notifier.sent_to(s1.id, NotificationKind::SignatureRequested), 1);
        assert_eq!(h.notifier.sent_to(s2.id, NotificationKind::SignatureRequested), 1);
    }

    #[test]
    fn last_signature_approves() {
        let h = harness();
        let (owner, s1, s2) = (member(), member(), member());
        let (doc, _) = h.lc.versions.create_document("NDA", b"v1", &owner).unwrap();
        h.lc.signatures
            .request_signatures(doc.id, &[s1.id, s2.id], None, &owner)
            .unwrap();

        let sig = h.lc.signatures.sign(doc.id, &s1).unwrap();
        assert_eq!(sig.content_hash, sha256_content(b"v1"));
        assert_eq!(sig.version_number, 1);
        assert_eq!(h.lc.documents.get(doc.id).unwrap().status(), DocumentStatus::InReview);

        h.lc.signatures.sign(doc.id, &s2).unwrap();
        assert_eq!(h.lc.documents.get(doc.id).unwrap().status(), DocumentStatus::Approved);
        assert_eq!(h.lc.signatures.signatures(doc.id).len(), 2);

        let report = h.lc.signatures.verify(doc.id).unwrap();
        assert!(report.verified);
        assert_eq!(report.total_signatures, 2);
        assert_eq!(report.required_signatures, 2);
    }

    #[test]
    fn sign_rejects_outsiders_and_duplicates() {
        let h = harness();
        let (owner, s1, outsider) = (member(), member(), member());
        let (doc, _) = h.lc.versions.create_document("NDA", b"v1", &owner).unwrap();
        h.lc.signatures.request_signatures(doc.id, &[s1.id], None, &owner).unwrap();

        assert!(matches!(
            h.lc.signatures.sign(doc.id, &outsider),
            Err(LifecycleError::NotRequiredSigner { .. })
        ));
        h.lc.signatures.sign(doc.id, &s1).unwrap();
        assert!(matches!(
            h.lc.signatures.sign(doc.id, &s1),
            Err(LifecycleError::Conflict(_))
        ));
        assert_eq!(h.lc.signatures.signatures(doc.id).len(), 1);
    }

    #[test]
    fn new_version_breaks_integrity() {
        let h = harness();
        let (owner, s1, s2) = (member(), member(), member());
        let (doc, _) = h.lc.versions.create_document("NDA", b"v1", &owner).unwrap();
        h.lc.signatures
            .request_signatures(doc.id, &[s1.id, s2.id], None, &owner)
            .unwrap();
        h.lc.signatures.sign(doc.id, &s1).unwrap();
        h.lc.versions.create_version(doc.id, b"v2", None, &owner).unwrap();

        let report = h.lc.signatures.verify(doc.id).unwrap();
        assert!(!report.verified);
        let s = &report.signatures[0];
        assert!(s.signature_valid);
        assert!(!s.document_intact);
        assert!(!s.verified);
    }

    #[test]
    fn exported_record_verifies_offline() {
        let h = harness();
        let (owner, s1) = (member(), member());
        let (doc, _) = h.lc.versions.create_document("NDA", b"v1", &owner).unwrap();
        h.lc.signatures.request_signatures(doc.id, &[s1.id], None, &owner).unwrap();
        let sig = h.lc.signatures.sign(doc.id, &s1).unwrap();

        let json = serde_json::to_string(&sig).unwrap();
        let back: SignatureRecord = serde_json::from_str(&json).unwrap();
        back.verify_detached().unwrap();

        let mut forged = back.clone();
        forged.document_id = DocumentId::new();
        assert!(matches!(
            forged.verify_detached(),
            Err(LifecycleError::Crypto(_))
        ));
    }

    #[test]
    fn unsigned_document_is_not_verified() {
        let h = harness();
        let owner = member();
        let (doc, _) = h.lc.versions.create_document("NDA", b"v1", &owner).unwrap();
        let report = h.lc.signatures.verify(doc.id).unwrap();
        assert!(!report.verified);
        assert_eq!(report.total_signatures, 0);
        assert!(matches!(
            h.lc.signatures.verify(DocumentId::new()),
            Err(LifecycleError::NotFound { .. })
        ));
    }

    #[test]
    fn rotated_key_invalidates_signature() {
        let keyring = MemoryKeyRing::new();
        let lc = Lifecycle::builder().keyring(Arc::new(keyring.clone())).build();
        let (owner, s1) = (member(), member());
        let (doc, _) = lc.versions.create_document("NDA", b"v1", &owner).unwrap();
        lc.signatures.request_signatures(doc.id, &[s1.id], None, &owner).unwrap();
        let sig = lc.signatures.sign(doc.id, &s1).unwrap();
        assert_eq!(lc.signatures.public_key(s1.id), Some(sig.public_key));

        keyring.insert_seed(s1.id, &[7u8; 32]);
        let report = lc.signatures.verify(doc.id).unwrap();
        assert!(!report.signatures[0].signature_valid);
        assert!(report.signatures[0].document_intact);
        assert!(!report.verified);
    }

    #[test]
    fn signer_without_custody_key_is_not_valid() {
        let keyring = MemoryKeyRing::new();
        let lc = Lifecycle::builder().keyring(Arc::new(keyring.clone())).build();
        let (owner, s1) = (member(), member());
        let (doc, _) = lc.versions.create_document("NDA", b"v1", &owner).unwrap();
        lc.signatures.request_signatures(doc.id, &[s1.id], None, &owner).unwrap();
        let sig = lc.signatures.sign(doc.id, &s1).unwrap();
        assert!(lc.signatures.verify(doc.id).unwrap().verified);

        assert!(keyring.revoke(s1.id));
        assert_eq!(lc.signatures.public_key(s1.id), None);
        assert!(sig.verify_detached().is_ok());
        let report = lc.signatures.verify(doc.id).unwrap();
        assert!(!report.signatures[0].signature_valid);
        assert!(report.signatures[0].document_intact);
        assert!(!report.verified);
    }

    #[test]
    fn concurrent_signing_records_once() {
        let h = harness();
        let (owner, s1) = (member(), member());
        let (doc, _) = h.lc.versions.create_document("NDA", b"v1", &owner).unwrap();
        h.lc.signatures.request_signatures(doc.id, &[s1.id], None, &owner).unwrap();

        let ok = std::thread::scope(|s| {
            let handles: Vec<_> = (0..6)
                .map(|_| {
                    let ledger = &h.lc.signatures;
                    s.spawn(move || ledger.sign(doc.id, &s1).is_ok())
                })
                .collect();
            handles
                .into_iter()
                .map(|j| j.join().unwrap())
                .filter(|ok| *ok)
                .count()
        });
        assert_eq!(ok, 1);
        assert_eq!(h.lc.signatures.signatures(doc.id).len(), 1);
        let approvals = h
            .publisher
            .events()
            .into_iter()
            .filter(|e| {
                matches!(
                    e,
                    LifecycleEvent::StatusChanged {
                        status: DocumentStatus::Approved,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(approvals, 1);
    }
}
