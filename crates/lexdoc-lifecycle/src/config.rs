//! # Lifecycle Configuration
//!
//! Tunables for retention and the periodic jobs. Every field has a serde
//! default, so a partial YAML section (or none at all) yields a working
//! configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Version retention policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionPolicy {
    /// Versions older than this are archived. `0` disables the age rule.
    pub max_age_days: u32,
    /// Newest versions kept per document. `0` disables the count rule.
    pub max_versions: usize,
}

impl RetentionPolicy {
    pub fn max_age(&self) -> Option<Duration> {
        (self.max_age_days > 0).then(|| Duration::days(i64::from(self.max_age_days)))
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_age_days: 90,
            max_versions: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    pub retention: RetentionPolicy,
    /// Deadlines within this window escalate to urgent.
    pub escalation_lookahead_hours: u32,
    /// A current step pending longer than this is reported as stalled.
    pub stall_threshold_days: u32,
    /// Terminal workflows older than this are archived.
    pub workflow_archive_after_days: u32,
    /// Lease TTL for edit locks. Unset means locks never expire.
    pub lock_ttl_secs: Option<u64>,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            retention: RetentionPolicy::default(),
            escalation_lookahead_hours: 24,
            stall_threshold_days: 30,
            workflow_archive_after_days: 90,
            lock_ttl_secs: None,
        }
    }
}

impl LifecycleConfig {
    pub fn escalation_lookahead(&self) -> Duration {
        Duration::hours(i64::from(self.escalation_lookahead_hours))
    }

    pub fn stall_threshold(&self) -> Duration {
        Duration::days(i64::from(self.stall_threshold_days))
    }

    pub fn workflow_archive_after(&self) -> Duration {
        Duration::days(i64::from(self.workflow_archive_after_days))
    }

    pub fn lock_ttl(&self) -> Option<Duration> {
        self.lock_ttl_secs
            .map(|s| Duration::seconds(i64::try_from(s).unwrap_or(i64::MAX).min(i64::MAX / 1000)))
    }
}
