//! # Approval Workflow State Machine
//!
//! ```text
//! Pending ──▶ InProgress ──▶ Completed
//!    │            │
//!    │            ├──▶ Rejected
//!    │            │
//!    └────────────┴──▶ Cancelled
//! ```
//!
//! Steps are fixed at creation and numbered from 1. While the workflow is
//! `InProgress`, the step at `current_step_index` is the only `Pending`
//! step that has started, every earlier step is `Completed`, and later
//! steps are untouched. [`Workflow::check_invariants`] asserts exactly that.
//!
//! Every mutation appends a [`WorkflowTransitionRecord`], so the history of
//! a workflow can be read without replaying requests.
//!
//! Escalation and stall detection live here so the periodic jobs only
//! decide *which* workflows to touch. Each records when it last notified,
//! which keeps a repeated tick from notifying twice. Neither one changes
//! `status`.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lexdoc_core::{ActorId, DocumentId, Timestamp, WorkflowId};

// ─── Status enums ────────────────────────────────────────────────────

/// Workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Pending,
    InProgress,
    Completed,
    Rejected,
    Cancelled,
}

impl WorkflowStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected | Self::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Completed,
    Rejected,
}

/// Escalation priority. Ordered: `Low < Normal < High < Urgent`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome chosen by the assignee of the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Approve,
    Reject,
}

// ─── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("a workflow needs at least one step")]
    EmptySteps,

    #[error("workflow is {status}, not in_progress")]
    NotInProgress { status: WorkflowStatus },

    #[error("step {step_number} is assigned to {assignee}")]
    NotAssignee {
        step_number: u32,
        assignee: ActorId,
    },

    /// The caller targeted a step that is no longer current.
    #[error("step {expected} is no longer current (current step is {actual})")]
    StaleStep { expected: u32, actual: u32 },

    #[error("only the initiator or an admin may cancel this workflow")]
    NotInitiator,

    #[error("workflow is already {status}")]
    Terminal { status: WorkflowStatus },
}

// ─── Steps ───────────────────────────────────────────────────────────

/// What a caller supplies per step at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSpec {
    pub assignee: ActorId,
    /// Free-form label, e.g. "legal review".
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// 1-based position.
    pub step_number: u32,
    pub assignee: ActorId,
    pub label: Option<String>,
    pub status: StepStatus,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub comments: Option<String>,
    /// Last stall reminder sent for this step.
    #[serde(default)]
    pub stall_reminded_at: Option<Timestamp>,
}

// ─── Transition log ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Started,
    StepApproved,
    StepRejected,
    Cancelled,
    Escalated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowTransitionRecord {
    pub kind: TransitionKind,
    pub from_status: WorkflowStatus,
    pub to_status: WorkflowStatus,
    pub step_number: Option<u32>,
    pub actor: Option<ActorId>,
    pub comments: Option<String>,
    pub timestamp: Timestamp,
}

/// Result of a successful `advance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved to the next step; its assignee should be notified.
    Advanced { step_number: u32, assignee: ActorId },
    /// The final step was approved.
    Completed,
    /// The current step was rejected.
    Rejected,
}

/// A workflow whose current step has waited past the stall threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StalledStep {
    pub step_number: u32,
    pub assignee: ActorId,
    pub pending_since: Timestamp,
}

// ─── Workflow ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub document_id: DocumentId,
    pub name: String,
    pub steps: Vec<WorkflowStep>,
    pub current_step_index: usize,
    pub status: WorkflowStatus,
    pub deadline: Option<Timestamp>,
    pub priority: Priority,
    /// Set once the deadline-approaching notice has gone out.
    #[serde(default)]
    pub deadline_notified_at: Option<Timestamp>,
    pub initiated_by: ActorId,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub cancel_reason: Option<String>,
    pub cancelled_by: Option<ActorId>,
    /// Hidden from default listings once set by the archival job.
    pub archived: bool,
    pub transitions: Vec<WorkflowTransitionRecord>,
}

impl Workflow {
    /// Build a `Pending` workflow. Call [`Workflow::start`] to begin.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: WorkflowId,
        document_id: DocumentId,
        name: String,
        steps: Vec<StepSpec>,
        deadline: Option<Timestamp>,
        priority: Priority,
        initiated_by: ActorId,
        now: Timestamp,
    ) -> Result<Self, WorkflowError> {
        if steps.is_empty() {
            return Err(WorkflowError::EmptySteps);
        }
        let steps = steps
            .into_iter()
            .zip(1u32..)
            .map(|(spec, step_number)| WorkflowStep {
                step_number,
                assignee: spec.assignee,
                label: spec.label,
                status: StepStatus::Pending,
                started_at: None,
                completed_at: None,
                comments: None,
                stall_reminded_at: None,
            })
            .collect();
        Ok(Self {
            id,
            document_id,
            name,
            steps,
            current_step_index: 0,
            status: WorkflowStatus::Pending,
            deadline,
            priority,
            deadline_notified_at: None,
            initiated_by,
            created_at: now,
            completed_at: None,
            cancel_reason: None,
            cancelled_by: None,
            archived: false,
            transitions: Vec::new(),
        })
    }

    /// `Pending → InProgress`; starts step 1 and returns its assignee.
    pub fn start(&mut self, now: Timestamp) -> Result<ActorId, WorkflowError> {
        if self.status != WorkflowStatus::Pending {
            return Err(WorkflowError::Terminal {
                status: self.status,
            });
        }
        let step = self.steps.first_mut().ok_or(WorkflowError::EmptySteps)?;
        step.started_at = Some(now);
        let assignee = step.assignee;
        self.record(
            TransitionKind::Started,
            WorkflowStatus::InProgress,
            Some(1),
            Some(self.initiated_by),
            None,
            now,
        );
        Ok(assignee)
    }

    pub fn current_step(&self) -> Option<&WorkflowStep> {
        self.steps.get(self.current_step_index)
    }

    /// 1-based number of the current step.
    pub fn current_step_number(&self) -> u32 {
        self.current_step().map(|s| s.step_number).unwrap_or(0)
    }

    pub fn is_participant(&self, actor: ActorId) -> bool {
        self.initiated_by == actor || self.steps.iter().any(|s| s.assignee == actor)
    }

    /// Validate an advance without mutating. Shared by `advance` and by
    /// callers that want to reject early against a snapshot.
    pub fn check_advance(
        &self,
        actor: ActorId,
        expected_step: Option<u32>,
    ) -> Result<(), WorkflowError> {
        if self.status != WorkflowStatus::InProgress {
            return Err(WorkflowError::NotInProgress {
                status: self.status,
            });
        }
        let current = self.current_step_number();
        if let Some(expected) = expected_step {
            if expected != current {
                return Err(WorkflowError::StaleStep {
                    expected,
                    actual: current,
                });
            }
        }
        let step = self.current_step().ok_or(WorkflowError::NotInProgress {
            status: self.status,
        })?;
        if step.assignee != actor {
            return Err(WorkflowError::NotAssignee {
                step_number: step.step_number,
                assignee: step.assignee,
            });
        }
        Ok(())
    }

    /// Apply the current assignee's decision.
    ///
    /// On error nothing changes.
    pub fn advance(
        &mut self,
        actor: ActorId,
        action: StepAction,
        comments: Option<String>,
        expected_step: Option<u32>,
        now: Timestamp,
    ) -> Result<AdvanceOutcome, WorkflowError> {
        self.check_advance(actor, expected_step)?;
        let idx = self.current_step_index;
        let last = idx + 1 == self.steps.len();
        let step_number = self.current_step_number();

        let step = &mut self.steps[idx];
        step.completed_at = Some(now);
        step.comments = comments.clone();

        match action {
            StepAction::Reject => {
                step.status = StepStatus::Rejected;
                self.completed_at = Some(now);
                self.record(
                    TransitionKind::StepRejected,
                    WorkflowStatus::Rejected,
                    Some(step_number),
                    Some(actor),
                    comments,
                    now,
                );
                Ok(AdvanceOutcome::Rejected)
            }
            StepAction::Approve if last => {
                step.status = StepStatus::Completed;
                self.completed_at = Some(now);
                self.record(
                    TransitionKind::StepApproved,
                    WorkflowStatus::Completed,
                    Some(step_number),
                    Some(actor),
                    comments,
                    now,
                );
                Ok(AdvanceOutcome::Completed)
            }
            StepAction::Approve => {
                step.status = StepStatus::Completed;
                self.current_step_index = idx + 1;
                let next = &mut self.steps[idx + 1];
                next.started_at = Some(now);
                let outcome = AdvanceOutcome::Advanced {
                    step_number: next.step_number,
                    assignee: next.assignee,
                };
                self.record(
                    TransitionKind::StepApproved,
                    WorkflowStatus::InProgress,
                    Some(step_number),
                    Some(actor),
                    comments,
                    now,
                );
                Ok(outcome)
            }
        }
    }

    /// Cancel a pending or running workflow.
    pub fn cancel(
        &mut self,
        actor: ActorId,
        is_override: bool,
        reason: Option<String>,
        now: Timestamp,
    ) -> Result<(), WorkflowError> {
        if self.status.is_terminal() {
            return Err(WorkflowError::Terminal {
                status: self.status,
            });
        }
        if actor != self.initiated_by && !is_override {
            return Err(WorkflowError::NotInitiator);
        }
        self.completed_at = Some(now);
        self.cancel_reason = reason.clone();
        self.cancelled_by = Some(actor);
        let step = Some(self.current_step_number());
        self.record(
            TransitionKind::Cancelled,
            WorkflowStatus::Cancelled,
            step,
            Some(actor),
            reason,
            now,
        );
        Ok(())
    }

    /// Raise priority to `Urgent` if the deadline is still ahead of `now`
    /// but within `lookahead`. Returns the assignee to notify, or `None`
    /// if nothing changed. The notice goes out once per workflow whatever
    /// the starting priority.
    pub fn escalate(&mut self, now: Timestamp, lookahead: Duration) -> Option<ActorId> {
        if self.status != WorkflowStatus::InProgress || self.deadline_notified_at.is_some() {
            return None;
        }
        let deadline = self.deadline?;
        if deadline < now || deadline > now.plus(lookahead) {
            return None;
        }
        let assignee = self.current_step()?.assignee;
        self.priority = Priority::Urgent;
        self.deadline_notified_at = Some(now);
        let step = Some(self.current_step_number());
        self.record(
            TransitionKind::Escalated,
            self.status,
            step,
            None,
            Some(format!("deadline {deadline}")),
            now,
        );
        Some(assignee)
    }

    /// Report the current step if it has been pending longer than
    /// `threshold` and no reminder went out within the last `threshold`.
    pub fn stalled(&self, now: Timestamp, threshold: Duration) -> Option<StalledStep> {
        if self.status != WorkflowStatus::InProgress {
            return None;
        }
        let step = self.current_step()?;
        let since = step.started_at?;
        let quiet_since = step.stall_reminded_at.unwrap_or(since);
        if now.since(&since) > threshold && now.since(&quiet_since) > threshold {
            Some(StalledStep {
                step_number: step.step_number,
                assignee: step.assignee,
                pending_since: since,
            })
        } else {
            None
        }
    }

    /// Claim the stall reminder for the current step. Returns the stalled
    /// step only to the first caller per threshold window.
    pub fn claim_stall_reminder(
        &mut self,
        now: Timestamp,
        threshold: Duration,
    ) -> Option<StalledStep> {
        let stalled = self.stalled(now, threshold)?;
        let idx = self.current_step_index;
        self.steps[idx].stall_reminded_at = Some(now);
        Some(stalled)
    }

    /// Mark a terminal workflow archived once it has been finished for
    /// longer than `after`. Returns whether the flag changed.
    pub fn archive_if_stale(&mut self, now: Timestamp, after: Duration) -> bool {
        if self.archived || !self.status.is_terminal() {
            return false;
        }
        match self.completed_at {
            Some(done) if now.since(&done) > after => {
                self.archived = true;
                true
            }
            _ => false,
        }
    }

    /// Structural invariants for the current status.
    pub fn check_invariants(&self) -> bool {
        let idx = self.current_step_index;
        if idx >= self.steps.len() {
            return false;
        }
        let numbering = self
            .steps
            .iter()
            .zip(1u32..)
            .all(|(s, n)| s.step_number == n);
        let before_done = self.steps[..idx]
            .iter()
            .all(|s| s.status == StepStatus::Completed);
        let after_untouched = self.steps[idx + 1..]
            .iter()
            .all(|s| s.status == StepStatus::Pending && s.started_at.is_none());
        let current = &self.steps[idx];
        let current_ok = match self.status {
            WorkflowStatus::Pending => current.started_at.is_none(),
            WorkflowStatus::InProgress => {
                current.status == StepStatus::Pending && current.started_at.is_some()
            }
            WorkflowStatus::Completed => {
                current.status == StepStatus::Completed && idx + 1 == self.steps.len()
            }
            WorkflowStatus::Rejected => current.status == StepStatus::Rejected,
            WorkflowStatus::Cancelled => current.status == StepStatus::Pending,
        };
        numbering && before_done && after_untouched && current_ok
    }

    fn record(
        &mut self,
        kind: TransitionKind,
        to: WorkflowStatus,
        step_number: Option<u32>,
        actor: Option<ActorId>,
        comments: Option<String>,
        now: Timestamp,
    ) {
        self.transitions.push(WorkflowTransitionRecord {
            kind,
            from_status: self.status,
            to_status: to,
            step_number,
            actor,
            comments,
            timestamp: now,
        });
        self.status = to;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn actor(n: u128) -> ActorId {
        ActorId(Uuid::from_u128(n))
    }

    fn t(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn t0() -> Timestamp {
        t("2026-03-01T09:00:00Z")
    }

    fn spec(n: u128) -> StepSpec {
        StepSpec {
            assignee: actor(n),
            label: None,
        }
    }

    fn make(assignees: &[u128]) -> Workflow {
        let mut wf = Workflow::new(
            WorkflowId::new(),
            DocumentId::new(),
            "contract review".into(),
            assignees.iter().map(|&n| spec(n)).collect(),
            Some(t("2026-03-10T09:00:00Z")),
            Priority::Normal,
            actor(100),
            t0(),
        )
        .unwrap();
        wf.start(t0()).unwrap();
        wf
    }

    // ── Creation ─────────────────────────────────────────────────────

    #[test]
    fn empty_steps_rejected() {
        let err = Workflow::new(
            WorkflowId::new(),
            DocumentId::new(),
            "x".into(),
            vec![],
            None,
            Priority::Low,
            actor(1),
            t0(),
        )
        .unwrap_err();
        assert_eq!(err, WorkflowError::EmptySteps);
    }

    #[test]
    fn start_numbers_steps_and_starts_first() {
        let wf = make(&[2, 3, 4]);
        assert_eq!(wf.status, WorkflowStatus::InProgress);
        assert_eq!(
            wf.steps.iter().map(|s| s.step_number).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(wf.steps[0].started_at, Some(t0()));
        assert!(wf.steps[1].started_at.is_none());
        assert!(wf.check_invariants());
        assert_eq!(wf.transitions.len(), 1);
    }

    #[test]
    fn start_twice_fails() {
        let mut wf = make(&[2]);
        assert!(wf.start(t0()).is_err());
    }

    // ── Advance ──────────────────────────────────────────────────────

    #[test]
    fn approve_moves_to_next_step() {
        let mut wf = make(&[2, 3]);
        let later = t("2026-03-02T09:00:00Z");
        let out = wf
            .advance(actor(2), StepAction::Approve, Some("ok".into()), None, later)
            .unwrap();
        assert_eq!(
            out,
            AdvanceOutcome::Advanced {
                step_number: 2,
                assignee: actor(3)
            }
        );
        assert_eq!(wf.current_step_index, 1);
        assert_eq!(wf.steps[0].status, StepStatus::Completed);
        assert_eq!(wf.steps[0].comments.as_deref(), Some("ok"));
        assert_eq!(wf.steps[1].started_at, Some(later));
        assert!(wf.check_invariants());
    }

    #[test]
    fn approve_last_step_completes() {
        let mut wf = make(&[2, 3]);
        wf.advance(actor(2), StepAction::Approve, None, None, t0())
            .unwrap();
        let out = wf
            .advance(actor(3), StepAction::Approve, None, Some(2), t0())
            .unwrap();
        assert_eq!(out, AdvanceOutcome::Completed);
        assert_eq!(wf.status, WorkflowStatus::Completed);
        assert_eq!(wf.completed_at, Some(t0()));
        assert!(wf.check_invariants());
    }

    #[test]
    fn reject_is_permanent() {
        let mut wf = make(&[2, 3]);
        wf.advance(actor(2), StepAction::Approve, None, None, t0())
            .unwrap();
        let out = wf
            .advance(actor(3), StepAction::Reject, Some("missing clause".into()), None, t0())
            .unwrap();
        assert_eq!(out, AdvanceOutcome::Rejected);
        assert_eq!(wf.status, WorkflowStatus::Rejected);
        assert_eq!(wf.steps[1].status, StepStatus::Rejected);
        assert!(wf.check_invariants());
        assert_eq!(
            wf.advance(actor(3), StepAction::Approve, None, None, t0()),
            Err(WorkflowError::NotInProgress {
                status: WorkflowStatus::Rejected
            })
        );
    }

    #[test]
    fn non_assignee_changes_nothing() {
        let mut wf = make(&[2, 3]);
        let before = wf.clone();
        let err = wf
            .advance(actor(3), StepAction::Approve, None, None, t0())
            .unwrap_err();
        assert_eq!(
            err,
            WorkflowError::NotAssignee {
                step_number: 1,
                assignee: actor(2)
            }
        );
        assert_eq!(wf.current_step_index, before.current_step_index);
        assert_eq!(wf.steps, before.steps);
        assert_eq!(wf.transitions, before.transitions);
    }

    #[test]
    fn stale_step_detected() {
        let mut wf = make(&[2, 2]);
        wf.advance(actor(2), StepAction::Approve, None, Some(1), t0())
            .unwrap();
        assert_eq!(
            wf.advance(actor(2), StepAction::Approve, None, Some(1), t0()),
            Err(WorkflowError::StaleStep {
                expected: 1,
                actual: 2
            })
        );
    }

    #[test]
    fn pending_workflow_cannot_advance() {
        let mut wf = Workflow::new(
            WorkflowId::new(),
            DocumentId::new(),
            "x".into(),
            vec![spec(2)],
            None,
            Priority::Normal,
            actor(1),
            t0(),
        )
        .unwrap();
        assert!(matches!(
            wf.advance(actor(2), StepAction::Approve, None, None, t0()),
            Err(WorkflowError::NotInProgress { .. })
        ));
    }

    // ── Cancel ───────────────────────────────────────────────────────

    #[test]
    fn initiator_cancels() {
        let mut wf = make(&[2]);
        wf.cancel(actor(100), false, Some("withdrawn".into()), t0())
            .unwrap();
        assert_eq!(wf.status, WorkflowStatus::Cancelled);
        assert_eq!(wf.cancel_reason.as_deref(), Some("withdrawn"));
        assert_eq!(wf.cancelled_by, Some(actor(100)));
        assert!(wf.check_invariants());
    }

    #[test]
    fn cancel_permissions_and_terminal_states() {
        let mut wf = make(&[2]);
        assert_eq!(
            wf.cancel(actor(2), false, None, t0()),
            Err(WorkflowError::NotInitiator)
        );
        wf.cancel(actor(9), true, None, t0()).unwrap();
        assert_eq!(
            wf.cancel(actor(100), false, None, t0()),
            Err(WorkflowError::Terminal {
                status: WorkflowStatus::Cancelled
            })
        );

        let mut done = make(&[2]);
        done.advance(actor(2), StepAction::Approve, None, None, t0())
            .unwrap();
        assert!(matches!(
            done.cancel(actor(100), false, None, t0()),
            Err(WorkflowError::Terminal { .. })
        ));
    }

    // ── Background queries ───────────────────────────────────────────

    #[test]
    fn escalation_window() {
        let mut wf = make(&[2]);
        let lookahead = Duration::hours(24);
        assert_eq!(wf.escalate(t("2026-03-08T09:00:00Z"), lookahead), None);
        assert_eq!(
            wf.escalate(t("2026-03-09T10:00:00Z"), lookahead),
            Some(actor(2))
        );
        assert_eq!(wf.priority, Priority::Urgent);
        assert_eq!(wf.status, WorkflowStatus::InProgress);
        assert_eq!(wf.escalate(t("2026-03-09T11:00:00Z"), lookahead), None);
        assert_eq!(wf.deadline_notified_at, Some(t("2026-03-09T10:00:00Z")));
    }

    #[test]
    fn urgent_workflow_still_gets_deadline_notice() {
        let mut wf = make(&[2]);
        wf.priority = Priority::Urgent;
        let lookahead = Duration::hours(24);
        assert_eq!(
            wf.escalate(t("2026-03-09T10:00:00Z"), lookahead),
            Some(actor(2))
        );
        assert_eq!(wf.priority, Priority::Urgent);
        assert_eq!(wf.escalate(t("2026-03-09T12:00:00Z"), lookahead), None);
    }

    #[test]
    fn stall_reminder_claimed_once_per_window() {
        let mut wf = make(&[2]);
        let threshold = Duration::days(3);
        let day4 = t("2026-03-05T09:00:00Z");
        assert!(wf.claim_stall_reminder(t("2026-03-02T09:00:00Z"), threshold).is_none());
        let first = wf.claim_stall_reminder(day4, threshold).unwrap();
        assert_eq!(first.assignee, actor(2));
        assert_eq!(first.pending_since, t0());
        assert!(wf.claim_stall_reminder(day4, threshold).is_none());
        assert!(wf.claim_stall_reminder(t("2026-03-07T09:00:00Z"), threshold).is_none());
        assert!(wf.claim_stall_reminder(t("2026-03-08T10:00:00Z"), threshold).is_some());
        assert_eq!(wf.status, WorkflowStatus::InProgress);
    }

    #[test]
    fn overdue_workflows_not_escalated() {
        let mut wf = make(&[2]);
        assert_eq!(wf.escalate(t("2026-03-11T00:00:00Z"), Duration::hours(24)), None);
        assert_eq!(wf.priority, Priority::Normal);
    }

    #[test]
    fn stalled_detection_is_read_only() {
        let wf = make(&[2]);
        let threshold = Duration::days(30);
        assert!(wf.stalled(t("2026-03-20T09:00:00Z"), threshold).is_none());
        let stalled = wf.stalled(t("2026-04-15T09:00:00Z"), threshold).unwrap();
        assert_eq!(stalled.assignee, actor(2));
        assert_eq!(stalled.pending_since, t0());
        assert_eq!(wf.status, WorkflowStatus::InProgress);
    }

    #[test]
    fn archival_after_completion() {
        let mut wf = make(&[2]);
        let after = Duration::days(90);
        assert!(!wf.archive_if_stale(t("2027-01-01T00:00:00Z"), after));
        wf.advance(actor(2), StepAction::Approve, None, None, t0())
            .unwrap();
        assert!(!wf.archive_if_stale(t("2026-04-01T00:00:00Z"), after));
        assert!(wf.archive_if_stale(t("2026-07-01T00:00:00Z"), after));
        assert!(!wf.archive_if_stale(t("2026-07-02T00:00:00Z"), after));
    }

    #[test]
    fn priority_ordering() {
        assert!(Priority::Low < Priority::Normal);
        assert!(Priority::High < Priority::Urgent);
        assert_eq!(Priority::default(), Priority::Normal);
    }

    #[test]
    fn participants() {
        let wf = make(&[2, 3]);
        assert!(wf.is_participant(actor(100)));
        assert!(wf.is_participant(actor(3)));
        assert!(!wf.is_participant(actor(7)));
    }

    #[test]
    fn serializes_with_snake_case_status() {
        let wf = make(&[2]);
        let json = serde_json::to_value(&wf).unwrap();
        assert_eq!(json["status"], "in_progress");
        assert_eq!(json["priority"], "normal");
        assert_eq!(json["steps"][0]["status"], "pending");
    }
}
