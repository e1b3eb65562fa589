//! # lexdoc-lifecycle: Document Lifecycle Integrity Core
//!
//! Four cooperating components over one shared document registry:
//!
//! - **LockManager** (`lock.rs`): advisory single-holder edit locks.
//! - **VersionChain** (`version.rs`): append-only, content-addressed
//!   version history with restore, comparison and retention.
//! - **WorkflowEngine** (`workflow.rs`): ordered multi-step approvals with
//!   optimistic step advancement.
//! - **SignatureLedger** (`signature.rs`): Ed25519 signatures over the
//!   current content, with tamper detection.
//!
//! Collaborators outside the core (notifications, event fan-out, search
//! indexing, key custody, time) are traits in `ports.rs` and `keyring.rs`,
//! injected through [`LifecycleBuilder`].
//!
//! ## Concurrency
//!
//! Records live in `parking_lot`-guarded stores. Multi-step mutations on a
//! single document run inside a per-document gate; nothing here is async
//! and no lock is held across `.await` by callers.

pub mod actor;
pub mod config;
pub mod document;
pub mod error;
pub mod jobs;
pub mod keyring;
pub mod lock;
pub mod ports;
pub mod signature;
pub mod store;
pub mod version;
pub mod workflow;

use std::sync::Arc;

use lexdoc_crypto::{ContentStore, MemoryContentStore};

// ─── Re-exports ─────────────────────────────────────────────────────

pub use actor::{Actor, Role};
pub use config::{LifecycleConfig, RetentionPolicy};
pub use document::{DocumentRecord, DocumentRegistry};
pub use error::{LifecycleError, LifecycleResult};
pub use jobs::{JobKind, JobReport};
pub use keyring::{KeyRing, MemoryKeyRing};
pub use lock::LockManager;
pub use ports::{
    Clock, EventPublisher, IndexFields, LifecycleEvent, ManualClock, NoopIndexer,
    NotificationKind, Notifier, NotifyError, RecordingNotifier, RecordingPublisher,
    SearchIndexer, SentNotification, SystemClock, TracingNotifier, TracingPublisher,
};
pub use signature::{SignatureLedger, SignatureRecord, SignerVerification, VerificationReport};
pub use store::{DocumentGate, Store};
pub use version::{Version, VersionChain, VersionComparison};
pub use workflow::{NewWorkflow, WorkflowEngine, WorkflowFilter};

// ─── Facade ─────────────────────────────────────────────────────────

/// All components wired to one registry, one gate and one set of ports.
/// Cloning is cheap and shares state.
#[derive(Clone)]
pub struct Lifecycle {
    pub documents: DocumentRegistry,
    pub locks: LockManager,
    pub versions: VersionChain,
    pub workflows: WorkflowEngine,
    pub signatures: SignatureLedger,
    pub config: LifecycleConfig,
}

impl Lifecycle {
    /// In-memory lifecycle with default ports.
    pub fn new(config: LifecycleConfig) -> Self {
        LifecycleBuilder::new().config(config).build()
    }

    pub fn builder() -> LifecycleBuilder {
        LifecycleBuilder::new()
    }
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("documents", &self.documents.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Lifecycle`]. Unset ports fall back to in-memory or
/// log-only implementations.
#[derive(Default)]
pub struct LifecycleBuilder {
    config: LifecycleConfig,
    content: Option<Arc<dyn ContentStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    publisher: Option<Arc<dyn EventPublisher>>,
    indexer: Option<Arc<dyn SearchIndexer>>,
    keyring: Option<Arc<dyn KeyRing>>,
    clock: Option<Arc<dyn Clock>>,
}

impl LifecycleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: LifecycleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn content_store(mut self, store: Arc<dyn ContentStore>) -> Self {
        self.content = Some(store);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn indexer(mut self, indexer: Arc<dyn SearchIndexer>) -> Self {
        self.indexer = Some(indexer);
        self
    }

    pub fn keyring(mut self, keyring: Arc<dyn KeyRing>) -> Self {
        self.keyring = Some(keyring);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Lifecycle {
        let content = self
            .content
            .unwrap_or_else(|| Arc::new(MemoryContentStore::new()));
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier));
        let publisher = self.publisher.unwrap_or_else(|| Arc::new(TracingPublisher));
        let indexer = self.indexer.unwrap_or_else(|| Arc::new(NoopIndexer));
        let keyring = self
            .keyring
            .unwrap_or_else(|| Arc::new(MemoryKeyRing::new()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let documents = DocumentRegistry::new();
        let gate = DocumentGate::new();
        let locks = LockManager::new(
            documents.clone(),
            gate.clone(),
            Arc::clone(&publisher),
            Arc::clone(&clock),
            self.config.lock_ttl(),
        );
        let versions = VersionChain::new(
            documents.clone(),
            content,
            locks.clone(),
            gate.clone(),
            indexer,
            Arc::clone(&publisher),
            Arc::clone(&clock),
        );
        let workflows = WorkflowEngine::new(
            documents.clone(),
            Arc::clone(&notifier),
            Arc::clone(&publisher),
            Arc::clone(&clock),
        );
        let signatures = SignatureLedger::new(
            documents.clone(),
            versions.clone(),
            keyring,
            gate,
            notifier,
            publisher,
            clock,
        );

        Lifecycle {
            documents,
            locks,
            versions,
            workflows,
            signatures,
            config: self.config,
        }
    }
}

#[cfg(test)]
pub(crate) mod testkit {
    //! Shared fixtures for unit tests.

    use std::sync::Arc;

    use lexdoc_core::{ActorId, Timestamp};

    use super::*;

    pub(crate) struct Harness {
        pub lc: Lifecycle,
        pub clock: ManualClock,
        pub notifier: RecordingNotifier,
        pub publisher: RecordingPublisher,
        pub content: Arc<MemoryContentStore>,
    }

    pub(crate) fn start() -> Timestamp {
        Timestamp::parse("2026-01-05T09:00:00Z").unwrap()
    }

    pub(crate) fn harness() -> Harness {
        harness_with(LifecycleConfig::default())
    }

    pub(crate) fn harness_with(config: LifecycleConfig) -> Harness {
        let clock = ManualClock::new(start());
        let notifier = RecordingNotifier::new();
        let publisher = RecordingPublisher::new();
        let content = Arc::new(MemoryContentStore::new());
        let lc = Lifecycle::builder()
            .config(config)
            .clock(Arc::new(clock.clone()))
            .notifier(Arc::new(notifier.clone()))
            .publisher(Arc::new(publisher.clone()))
            .content_store(content.clone())
            .build();
        Harness {
            lc,
            clock,
            notifier,
            publisher,
            content,
        }
    }

    pub(crate) fn member() -> Actor {
        Actor::member(ActorId::new())
    }

    pub(crate) fn admin() -> Actor {
        Actor::admin(ActorId::new())
    }
}
