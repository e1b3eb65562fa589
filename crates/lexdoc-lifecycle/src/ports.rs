//! # External Collaborators
//!
//! Traits for everything outside the integrity core: notification
//! delivery, the live event channel, the search index and the clock. They
//! are injected as `Arc<dyn _>` when the [`Lifecycle`](crate::Lifecycle)
//! is built.
//!
//! Notifications and events are best-effort. A failing notifier is logged
//! and never fails or rolls back the operation that triggered it.

use std::sync::Arc;

use lexdoc_core::{ActorId, DocumentId, Timestamp, VersionId, WorkflowId};
use lexdoc_state::{DocumentStatus, StepAction, WorkflowStatus};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

// ─── Notifier ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    WorkflowStepAssigned,
    WorkflowDeadlineApproaching,
    WorkflowStalled,
    SignatureRequested,
}

#[derive(Debug, thiserror::Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Delivers a message to a user (mail, SMS, in-app; not our concern).
pub trait Notifier: Send + Sync {
    fn notify(
        &self,
        user: ActorId,
        kind: NotificationKind,
        payload: &serde_json::Value,
    ) -> Result<(), NotifyError>;
}

/// Send and swallow. Failures are logged with the recipient and kind.
pub(crate) fn notify_quietly(
    notifier: &dyn Notifier,
    user: ActorId,
    kind: NotificationKind,
    payload: serde_json::Value,
) {
    if let Err(e) = notifier.notify(user, kind, &payload) {
        tracing::warn!(user = %user, kind = ?kind, error = %e, "notification failed");
        metrics::counter!("lexdoc_notification_failures_total").increment(1);
    }
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(
        &self,
        user: ActorId,
        kind: NotificationKind,
        payload: &serde_json::Value,
    ) -> Result<(), NotifyError> {
        tracing::info!(user = %user, kind = ?kind, payload = %payload, "notification");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub user: ActorId,
    pub kind: NotificationKind,
    pub payload: serde_json::Value,
}

/// Keeps every notification in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<SentNotification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().clone()
    }

    pub fn sent_to(&self, user: ActorId, kind: NotificationKind) -> usize {
        self.sent
            .lock()
            .iter()
            .filter(|n| n.user == user && n.kind == kind)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(
        &self,
        user: ActorId,
        kind: NotificationKind,
        payload: &serde_json::Value,
    ) -> Result<(), NotifyError> {
        self.sent.lock().push(SentNotification {
            user,
            kind,
            payload: payload.clone(),
        });
        Ok(())
    }
}

// ─── Event channel ───────────────────────────────────────────────────

/// Events pushed to live subscribers of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    LockAcquired {
        document_id: DocumentId,
        holder: ActorId,
    },
    LockReleased {
        document_id: DocumentId,
        holder: ActorId,
        released_by: ActorId,
    },
    VersionCreated {
        document_id: DocumentId,
        version_id: VersionId,
        version_number: u32,
    },
    StepAdvanced {
        workflow_id: WorkflowId,
        document_id: DocumentId,
        step_number: u32,
        action: StepAction,
        status: WorkflowStatus,
    },
    WorkflowCancelled {
        workflow_id: WorkflowId,
        document_id: DocumentId,
    },
    SignatureAdded {
        document_id: DocumentId,
        signer_id: ActorId,
        signed: usize,
        required: usize,
    },
    StatusChanged {
        document_id: DocumentId,
        status: DocumentStatus,
    },
}

impl LifecycleEvent {
    pub fn document_id(&self) -> DocumentId {
        match self {
            Self::LockAcquired { document_id, .. }
            | Self::LockReleased { document_id, .. }
            | Self::VersionCreated { document_id, .. }
            | Self::StepAdvanced { document_id, .. }
            | Self::WorkflowCancelled { document_id, .. }
            | Self::SignatureAdded { document_id, .. }
            | Self::StatusChanged { document_id, .. } => *document_id,
        }
    }

    /// Channel name subscribers of a document listen on.
    pub fn topic(&self) -> String {
        format!("document:{}", self.document_id().as_uuid())
    }
}

/// Best-effort publication to live subscribers.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, topic: &str, event: &LifecycleEvent);
}

pub(crate) fn publish(publisher: &dyn EventPublisher, event: LifecycleEvent) {
    publisher.publish(&event.topic(), &event);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPublisher;

impl EventPublisher for TracingPublisher {
    fn publish(&self, topic: &str, event: &LifecycleEvent) {
        tracing::debug!(topic, event = ?event, "event published");
    }
}

/// Keeps every event in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    events: Arc<Mutex<Vec<(String, LifecycleEvent)>>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events.lock().iter().map(|(_, e)| e.clone()).collect()
    }

    pub fn topics(&self) -> Vec<String> {
        self.events.lock().iter().map(|(t, _)| t.clone()).collect()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, topic: &str, event: &LifecycleEvent) {
        self.events.lock().push((topic.to_string(), event.clone()));
    }
}

// ─── Search index ────────────────────────────────────────────────────

/// Fields pushed to the search index after version or status changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexFields {
    pub title: String,
    pub status: DocumentStatus,
    pub current_version_number: u32,
    pub checksum: String,
}

/// Eventually-consistent search index.
pub trait SearchIndexer: Send + Sync {
    fn upsert(&self, document_id: DocumentId, fields: &IndexFields);
    fn remove(&self, document_id: DocumentId);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopIndexer;

impl SearchIndexer for NoopIndexer {
    fn upsert(&self, _document_id: DocumentId, _fields: &IndexFields) {}
    fn remove(&self, _document_id: DocumentId) {}
}

// ─── Clock ───────────────────────────────────────────────────────────

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<RwLock<Timestamp>>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(RwLock::new(start)),
        }
    }

    pub fn set(&self, to: Timestamp) {
        *self.now.write() = to;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.write();
        *now = now.plus(by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingNotifier;

    impl Notifier for FailingNotifier {
        fn notify(
            &self,
            _user: ActorId,
            _kind: NotificationKind,
            _payload: &serde_json::Value,
        ) -> Result<(), NotifyError> {
            Err(NotifyError("smtp down".into()))
        }
    }

    #[test]
    fn failing_notifier_is_swallowed() {
        notify_quietly(
            &FailingNotifier,
            ActorId::new(),
            NotificationKind::SignatureRequested,
            serde_json::json!({}),
        );
    }

    #[test]
    fn recording_notifier_counts_by_user_and_kind() {
        let n = RecordingNotifier::new();
        let u = ActorId::new();
        notify_quietly(&n, u, NotificationKind::WorkflowStalled, serde_json::json!({}));
        notify_quietly(&n, u, NotificationKind::WorkflowStalled, serde_json::json!({}));
        assert_eq!(n.sent_to(u, NotificationKind::WorkflowStalled), 2);
        assert_eq!(n.sent_to(u, NotificationKind::SignatureRequested), 0);
    }

    #[test]
    fn events_are_topic_scoped_and_tagged() {
        let p = RecordingPublisher::new();
        let doc = DocumentId::new();
        publish(
            &p,
            LifecycleEvent::LockAcquired {
                document_id: doc,
                holder: ActorId::new(),
            },
        );
        assert_eq!(p.topics(), vec![format!("document:{}", doc.as_uuid())]);
        let json = serde_json::to_value(&p.events()[0]).unwrap();
        assert_eq!(json["type"], "lock_acquired");
    }

    #[test]
    fn manual_clock_moves_only_when_told() {
        let start = Timestamp::parse("2026-01-01T00:00:00Z").unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);
        clock.advance(chrono::Duration::days(1));
        assert_eq!(clock.now().to_iso8601(), "2026-01-02T00:00:00Z");
    }
}
