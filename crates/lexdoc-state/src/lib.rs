//! # lexdoc-state: Lifecycle State Machines
//!
//! Pure, clock-free state machines. Every transition takes `now` from the
//! caller and either mutates the value and appends to its transition log,
//! or returns an error and leaves the value untouched. Storage, locking
//! and notification live in `lexdoc-lifecycle`.
//!
//! - **Document status** (`document.rs`):
//!   `Draft → InReview → {Approved | Rejected}`, anything `→ Archived`.
//!   Approval happens at most once.
//!
//! - **Workflow** (`workflow.rs`): ordered multi-step approval,
//!   `Pending → InProgress → {Completed | Rejected | Cancelled}`.
//!
//! - **Lease** (`lease.rs`): single-holder edit lock with optional TTL.

pub mod document;
pub mod lease;
pub mod workflow;

// ─── Document re-exports ────────────────────────────────────────────

pub use document::{DocumentStatus, DocumentStatusError, StatusMachine, StatusTransitionRecord};

// ─── Lease re-exports ───────────────────────────────────────────────

pub use lease::{Lease, LeaseError};

// ─── Workflow re-exports ────────────────────────────────────────────

pub use workflow::{
    AdvanceOutcome, Priority, StepAction, StepSpec, StepStatus, StalledStep, TransitionKind,
    Workflow, WorkflowError, WorkflowStatus, WorkflowStep, WorkflowTransitionRecord,
};
