//! # Document Status
//!
//! ```text
//! Draft ──▶ InReview ──▶ Approved
//!   │          │
//!   │          └──▶ Rejected ──▶ InReview (new review round)
//!   │
//!   └──▶ Approved (signatures complete without a review round)
//!
//! any ──▶ Archived (terminal)
//! ```
//!
//! Approval is recorded once. A second approval trigger (the last signer
//! racing a completing workflow, or a repeated completion) reports
//! `Ok(false)` instead of transitioning again.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use lexdoc_core::Timestamp;

// ─── Status ──────────────────────────────────────────────────────────

/// Lifecycle status of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Draft,
    InReview,
    Approved,
    Rejected,
    Archived,
}

impl DocumentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Archived)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InReview => "in_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Archived => "archived",
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentStatusError {
    /// The document is archived; no further status changes.
    #[error("document is archived")]
    Archived,
}

// ─── Transition log ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusTransitionRecord {
    pub from_status: DocumentStatus,
    pub to_status: DocumentStatus,
    pub timestamp: Timestamp,
    pub reason: String,
}

// ─── Machine ─────────────────────────────────────────────────────────

/// Current status plus its history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusMachine {
    pub status: DocumentStatus,
    /// Set on the single approval transition.
    pub approved_at: Option<Timestamp>,
    pub transitions: Vec<StatusTransitionRecord>,
}

impl StatusMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `Draft` or `Rejected` into review. Returns whether the status
    /// changed; other statuses are left alone.
    pub fn begin_review(&mut self, now: Timestamp, reason: &str) -> bool {
        if matches!(self.status, DocumentStatus::Draft | DocumentStatus::Rejected) {
            self.do_transition(DocumentStatus::InReview, now, reason);
            true
        } else {
            false
        }
    }

    /// Approve the document. `Ok(true)` on the transition, `Ok(false)` if
    /// it was already approved.
    pub fn approve(&mut self, now: Timestamp, reason: &str) -> Result<bool, DocumentStatusError> {
        match self.status {
            DocumentStatus::Archived => Err(DocumentStatusError::Archived),
            DocumentStatus::Approved => Ok(false),
            _ if self.approved_at.is_some() => Ok(false),
            _ => {
                self.approved_at = Some(now);
                self.do_transition(DocumentStatus::Approved, now, reason);
                Ok(true)
            }
        }
    }

    /// Reject an in-review document. Returns whether the status changed.
    pub fn reject(&mut self, now: Timestamp, reason: &str) -> bool {
        if self.status == DocumentStatus::InReview {
            self.do_transition(DocumentStatus::Rejected, now, reason);
            true
        } else {
            false
        }
    }

    /// Archive (soft-delete). Lock checks belong to the caller.
    pub fn archive(&mut self, now: Timestamp, reason: &str) -> Result<(), DocumentStatusError> {
        if self.status.is_terminal() {
            return Err(DocumentStatusError::Archived);
        }
        self.do_transition(DocumentStatus::Archived, now, reason);
        Ok(())
    }

    fn do_transition(&mut self, to: DocumentStatus, now: Timestamp, reason: &str) {
        self.transitions.push(StatusTransitionRecord {
            from_status: self.status,
            to_status: to,
            timestamp: now,
            reason: reason.to_string(),
        });
        self.status = to;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
