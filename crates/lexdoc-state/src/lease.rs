//! # Edit-Lock Lease
//!
//! A lease is the single-holder lock a user takes before editing a
//! document. It is separate from the document record. Without a TTL a
//! lease lasts until released; only the holder or an override-privileged
//! actor can release it. With a TTL, an expired lease counts as absent.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lexdoc_core::{ActorId, Timestamp};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LeaseError {
    /// Another actor holds a live lease.
    #[error("document is locked by {holder}")]
    HeldBy { holder: ActorId },

    /// Release attempted by someone who is neither holder nor override.
    #[error("lock is held by {holder}; only the holder or an admin may release it")]
    NotHolder { holder: ActorId },

    /// Release attempted on a document with no live lease.
    #[error("document is not locked")]
    NotHeld,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    pub holder: ActorId,
    pub acquired_at: Timestamp,
    /// `None` means the lease never expires on its own.
    pub expires_at: Option<Timestamp>,
}

impl Lease {
    pub fn new(holder: ActorId, now: Timestamp, ttl: Option<Duration>) -> Self {
        Self {
            holder,
            acquired_at: now,
            expires_at: ttl.map(|d| now.plus(d)),
        }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }

    pub fn is_live(&self, now: Timestamp) -> bool {
        !self.is_expired(now)
    }

    /// Decide an acquisition against the current lease.
    ///
    /// Returns the lease that should be stored and whether it is new.
    /// Re-acquisition by the live holder returns the existing lease
    /// unchanged.
    pub fn acquire(
        current: Option<&Lease>,
        actor: ActorId,
        now: Timestamp,
        ttl: Option<Duration>,
    ) -> Result<(Lease, bool), LeaseError> {
        match current {
            Some(lease) if lease.is_live(now) && lease.holder == actor => {
                Ok((lease.clone(), false))
            }
            Some(lease) if lease.is_live(now) => Err(LeaseError::HeldBy {
                holder: lease.holder,
            }),
            _ => Ok((Lease::new(actor, now, ttl), true)),
        }
    }

    /// Decide a release against the current lease.
    ///
    /// Returns the lease being released.
    pub fn release(
        current: Option<&Lease>,
        actor: ActorId,
        is_override: bool,
        now: Timestamp,
    ) -> Result<Lease, LeaseError> {
        match current {
            Some(lease) if lease.is_live(now) => {
                if lease.holder == actor || is_override {
                    Ok(lease.clone())
                } else {
                    Err(LeaseError::NotHolder {
                        holder: lease.holder,
                    })
                }
            }
            _ => Err(LeaseError::NotHeld),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn t(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn actor(n: u128) -> ActorId {
        ActorId(Uuid::from_u128(n))
    }

    #[test]
    fn acquire_free_document() {
        let now = t("2026-01-01T00:00:00Z");
        let (lease, fresh) = Lease::acquire(None, actor(1), now, None).unwrap();
        assert!(fresh);
        assert_eq!(lease.holder, actor(1));
        assert_eq!(lease.expires_at, None);
    }

    #[test]
    fn reacquire_by_holder_is_idempotent() {
        let t0 = t("2026-01-01T00:00:00Z");
        let t1 = t("2026-01-01T01:00:00Z");
        let (lease, _) = Lease::acquire(None, actor(1), t0, None).unwrap();
        let (again, fresh) = Lease::acquire(Some(&lease), actor(1), t1, None).unwrap();
        assert!(!fresh);
        assert_eq!(again.acquired_at, t0);
    }

    #[test]
    fn other_actor_blocked() {
        let now = t("2026-01-01T00:00:00Z");
        let (lease, _) = Lease::acquire(None, actor(1), now, None).unwrap();
        assert_eq!(
            Lease::acquire(Some(&lease), actor(2), now, None),
            Err(LeaseError::HeldBy { holder: actor(1) })
        );
    }

    #[test]
    fn no_ttl_never_expires() {
        let lease = Lease::new(actor(1), t("2020-01-01T00:00:00Z"), None);
        assert!(lease.is_live(t("2099-01-01T00:00:00Z")));
    }

    #[test]
    fn expired_lease_can_be_taken_over() {
        let t0 = t("2026-01-01T00:00:00Z");
        let lease = Lease::new(actor(1), t0, Some(Duration::minutes(30)));
        let later = t("2026-01-01T00:30:00Z");
        assert!(lease.is_expired(later));
        let (taken, fresh) = Lease::acquire(Some(&lease), actor(2), later, None).unwrap();
        assert!(fresh);
        assert_eq!(taken.holder, actor(2));
    }

    #[test]
    fn release_rules() {
        let now = t("2026-01-01T00:00:00Z");
        let lease = Lease::new(actor(1), now, None);
        assert_eq!(
            Lease::release(Some(&lease), actor(2), false, now),
            Err(LeaseError::NotHolder { holder: actor(1) })
        );
        assert!(Lease::release(Some(&lease), actor(2), true, now).is_ok());
        assert!(Lease::release(Some(&lease), actor(1), false, now).is_ok());
        assert_eq!(
            Lease::release(None, actor(1), false, now),
            Err(LeaseError::NotHeld)
        );
    }

    #[test]
    fn releasing_expired_lease_reports_not_held() {
        let t0 = t("2026-01-01T00:00:00Z");
        let lease = Lease::new(actor(1), t0, Some(Duration::seconds(10)));
        assert_eq!(
            Lease::release(Some(&lease), actor(1), false, t("2026-01-01T00:01:00Z")),
            Err(LeaseError::NotHeld)
        );
    }
}
