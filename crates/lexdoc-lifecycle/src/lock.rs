//! # Lock Manager
//!
//! Advisory single-holder edit locks. A client acquires the lock, writes
//! new versions, then releases. Acquisition and release run inside the
//! document gate, so they serialize with version creation on the same
//! document.
//!
//! Leases never expire unless `lock_ttl_secs` is configured. An admin can
//! always force-release.

use std::sync::Arc;

use chrono::Duration;
use lexdoc_core::{ActorId, DocumentId};
use lexdoc_state::Lease;

use crate::actor::Actor;
use crate::document::DocumentRegistry;
use crate::error::{lease_error, LifecycleError, LifecycleResult};
use crate::ports::{publish, Clock, EventPublisher, LifecycleEvent};
use crate::store::{DocumentGate, Store};

#[derive(Clone)]
pub struct LockManager {
    leases: Store<DocumentId, Lease>,
    registry: DocumentRegistry,
    gate: DocumentGate,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
    ttl: Option<Duration>,
}

impl LockManager {
    pub(crate) fn new(
        registry: DocumentRegistry,
        gate: DocumentGate,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
        ttl: Option<Duration>,
    ) -> Self {
        Self {
            leases: Store::new(),
            registry,
            gate,
            publisher,
            clock,
            ttl,
        }
    }

    /// Take the edit lock. Re-acquiring a lock you already hold is a no-op
    /// that returns the existing lease.
    pub fn acquire(&self, document_id: DocumentId, actor: &Actor) -> LifecycleResult<Lease> {
        self.gate.with(document_id, || {
            // Checked under the gate so a concurrent archive cannot slip in.
            self.registry.get(document_id)?.require_active()?;
            let now = self.clock.now();
            let current = self.leases.get(&document_id);
            let (lease, fresh) = Lease::acquire(current.as_ref(), actor.id, now, self.ttl)
                .map_err(|e| lease_error(document_id, e))?;
            if fresh {
                self.leases.insert(document_id, lease.clone());
                tracing::info!(document = %document_id, holder = %actor.id, "lock acquired");
                metrics::counter!("lexdoc_locks_acquired_total").increment(1);
                publish(
                    self.publisher.as_ref(),
                    LifecycleEvent::LockAcquired {
                        document_id,
                        holder: actor.id,
                    },
                );
            }
            Ok(lease)
        })
    }

    /// Release the lock. Only the holder or an admin may release.
    pub fn release(&self, document_id: DocumentId, actor: &Actor) -> LifecycleResult<Lease> {
        self.registry.get(document_id)?;
        self.gate.with(document_id, || {
            let now = self.clock.now();
            let current = self.leases.get(&document_id);
            let lease = Lease::release(current.as_ref(), actor.id, actor.has_override(), now)
                .map_err(|e| lease_error(document_id, e))?;
            self.leases.remove(&document_id);
            if lease.holder != actor.id {
                tracing::warn!(
                    document = %document_id,
                    holder = %lease.holder,
                    released_by = %actor.id,
                    "lock force-released"
                );
            } else {
                tracing::info!(document = %document_id, holder = %lease.holder, "lock released");
            }
            publish(
                self.publisher.as_ref(),
                LifecycleEvent::LockReleased {
                    document_id,
                    holder: lease.holder,
                    released_by: actor.id,
                },
            );
            Ok(lease)
        })
    }

    /// The live lease on a document, if any.
    pub fn holder(&self, document_id: DocumentId) -> Option<Lease> {
        let now = self.clock.now();
        self.leases
            .get(&document_id)
            .filter(|lease| lease.is_live(now))
    }

    /// Reject writers other than the live holder. Call inside the gate.
    pub(crate) fn check_writer(
        &self,
        document_id: DocumentId,
        writer: ActorId,
    ) -> LifecycleResult<()> {
        match self.holder(document_id) {
            Some(lease) if lease.holder != writer => Err(LifecycleError::Conflict(format!(
                "document {document_id} is locked by {}",
                lease.holder
            ))),
            _ => Ok(()),
        }
    }

    /// Reject any live lock. Call inside the gate.
    pub(crate) fn check_unlocked(&self, document_id: DocumentId) -> LifecycleResult<()> {
        match self.holder(document_id) {
            Some(lease) => Err(LifecycleError::Locked {
                document_id,
                holder: lease.holder,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use crate::testkit::{admin, harness, harness_with, member};
    use crate::{LifecycleConfig, LifecycleError, LifecycleEvent};

    #[test]
    fn acquire_is_idempotent_for_holder() {
        let h = harness();
        let alice = member();
        let (doc, _) = h.lc.versions.create_document("NDA", b"v1", &alice).unwrap();

        let first = h.lc.locks.acquire(doc.id, &alice).unwrap();
        let again = h.lc.locks.acquire(doc.id, &alice).unwrap();
        assert_eq!(first, again);
        let acquired = h
            .publisher
            .events()
            .into_iter()
            .filter(|e| matches!(e, LifecycleEvent::LockAcquired { .. }))
            .count();
        assert_eq!(acquired, 1);
    }

    #[test]
    fn second_actor_is_locked_out() {
        let h = harness();
        let (alice, bob) = (member(), member());
        let (doc, _) = h.lc.versions.create_document("NDA", b"v1", &alice).unwrap();
        h.lc.locks.acquire(doc.id, &alice).unwrap();

        match h.lc.locks.acquire(doc.id, &bob) {
            Err(LifecycleError::Locked { holder, .. }) => assert_eq!(holder, alice.id),
            other => panic!("expected Locked, got {other:?}"),
        }
    }

    #[test]
    fn release_rules() {
        let h = harness();
        let (alice, bob, root) = (member(), member(), admin());
        let (doc, _) = h.lc.versions.create_document("NDA", b"v1", &alice).unwrap();

        assert!(matches!(
            h.lc.locks.release(doc.id, &alice),
            Err(LifecycleError::Conflict(_))
        ));
        h.lc.locks.acquire(doc.id, &alice).unwrap();
        assert!(matches!(
            h.lc.locks.release(doc.id, &bob),
            Err(LifecycleError::Permission(_))
        ));

        let lease = h.lc.locks.release(doc.id, &root).unwrap();
        assert_eq!(lease.holder, alice.id);
        assert!(h.lc.locks.holder(doc.id).is_none());
        h.lc.locks.acquire(doc.id, &bob).unwrap();
    }

    #[test]
    fn unknown_document_is_not_found() {
        let h = harness();
        let err = h
            .lc
            .locks
            .acquire(lexdoc_core::DocumentId::new(), &member())
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound { kind: "document", .. }));
    }

    #[test]
    fn archive_and_acquire_never_both_win() {
        for _ in 0..50 {
            let h = harness();
            let alice = member();
            let (doc, _) = h.lc.versions.create_document("NDA", b"v1", &alice).unwrap();
            let (archived, acquired) = std::thread::scope(|s| {
                let archive = s.spawn(|| h.lc.versions.archive_document(doc.id, &alice).is_ok());
                let acquire = s.spawn(|| h.lc.locks.acquire(doc.id, &alice).is_ok());
                (archive.join().unwrap(), acquire.join().unwrap())
            });
            assert!(archived != acquired, "archived={archived} acquired={acquired}");
            let status = h.lc.documents.get(doc.id).unwrap().status();
            if archived {
                assert_eq!(status, lexdoc_state::DocumentStatus::Archived);
                assert!(h.lc.locks.holder(doc.id).is_none());
            } else {
                assert!(h.lc.locks.holder(doc.id).is_some());
            }
        }
    }

    #[test]
    fn ttl_expires_lease_lazily() {
        let h = harness_with(LifecycleConfig {
            lock_ttl_secs: Some(60),
            ..LifecycleConfig::default()
        });
        let (alice, bob) = (member(), member());
        let (doc, _) = h.lc.versions.create_document("NDA", b"v1", &alice).unwrap();
        h.lc.locks.acquire(doc.id, &alice).unwrap();
        assert!(h.lc.locks.acquire(doc.id, &bob).is_err());

        h.clock.advance(Duration::seconds(61));
        assert!(h.lc.locks.holder(doc.id).is_none());
        let lease = h.lc.locks.acquire(doc.id, &bob).unwrap();
        assert_eq!(lease.holder, bob.id);
    }
}
