//! # Workflow Engine
//!
//! Stores workflows and drives the pure state machine in
//! `lexdoc_state::workflow`.
//!
//! `advance` is a compare-and-set on `(current_step_index, status)`: the
//! request is validated against a snapshot, then applied under the store's
//! write lock only if the snapshot still matches. Of two concurrent calls
//! on the same step, one succeeds and the other gets `Conflict`.
//!
//! Completion approves the document once; rejection moves an in-review
//! document to `rejected`.

use std::sync::Arc;

use chrono::Duration;
use lexdoc_core::{ActorId, DocumentId, Timestamp, WorkflowId};
use lexdoc_state::{
    AdvanceOutcome, Priority, StepAction, StepSpec, Workflow, WorkflowStatus,
};
use serde::Deserialize;

use crate::actor::Actor;
use crate::document::DocumentRegistry;
use crate::error::{LifecycleError, LifecycleResult};
use crate::jobs::JobReport;
use crate::ports::{
    notify_quietly, publish, Clock, EventPublisher, LifecycleEvent, NotificationKind, Notifier,
};
use crate::store::Store;

/// Parameters for [`WorkflowEngine::create`].
#[derive(Debug, Clone)]
pub struct NewWorkflow {
    pub document_id: DocumentId,
    pub name: String,
    pub steps: Vec<StepSpec>,
    pub deadline: Option<Timestamp>,
    pub priority: Priority,
}

/// Listing filter. All fields narrow the result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowFilter {
    pub status: Option<WorkflowStatus>,
    pub priority: Option<Priority>,
    pub document_id: Option<DocumentId>,
    /// Initiator or any step assignee.
    pub participant: Option<ActorId>,
    #[serde(default)]
    pub include_archived: bool,
}

impl WorkflowFilter {
    fn matches(&self, wf: &Workflow) -> bool {
        (self.include_archived || !wf.archived)
            && self.status.map_or(true, |s| wf.status == s)
            && self.priority.map_or(true, |p| wf.priority == p)
            && self.document_id.map_or(true, |d| wf.document_id == d)
            && self.participant.map_or(true, |a| wf.is_participant(a))
    }
}

#[derive(Clone)]
pub struct WorkflowEngine {
    workflows: Store<WorkflowId, Workflow>,
    registry: DocumentRegistry,
    notifier: Arc<dyn Notifier>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
}

impl WorkflowEngine {
    pub(crate) fn new(
        registry: DocumentRegistry,
        notifier: Arc<dyn Notifier>,
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            workflows: Store::new(),
            registry,
            notifier,
            publisher,
            clock,
        }
    }

    /// Create and start a workflow; step 1's assignee is notified.
    pub fn create(&self, request: NewWorkflow, actor: &Actor) -> LifecycleResult<Workflow> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(LifecycleError::Validation("workflow name is required".into()));
        }
        let doc = self.registry.get(request.document_id)?;
        doc.require_active()?;

        let now = self.clock.now();
        let mut wf = Workflow::new(
            WorkflowId::new(),
            request.document_id,
            name,
            request.steps,
            request.deadline,
            request.priority,
            actor.id,
            now,
        )?;
        let first = wf.start(now)?;
        self.workflows.insert(wf.id, wf.clone());

        self.registry.try_update(request.document_id, |d| {
            if d.lifecycle.begin_review(now, "workflow started") {
                d.updated_at = now;
            }
            Ok(())
        })?;

        notify_quietly(
            self.notifier.as_ref(),
            first,
            NotificationKind::WorkflowStepAssigned,
            step_payload(&wf),
        );
        tracing::info!(
            workflow = %wf.id,
            document = %wf.document_id,
            steps = wf.steps.len(),
            "workflow created"
        );
        metrics::counter!("lexdoc_workflows_created_total").increment(1);
        Ok(wf)
    }

    /// Apply the current assignee's decision.
    ///
    /// `expected_step` is the step number the caller believes is current;
    /// a mismatch is a `Conflict`.
    pub fn advance(
        &self,
        id: WorkflowId,
        actor: &Actor,
        action: StepAction,
        comments: Option<String>,
        expected_step: Option<u32>,
    ) -> LifecycleResult<Workflow> {
        let snapshot = self.get(id)?;
        snapshot.check_advance(actor.id, expected_step)?;

        let now = self.clock.now();
        let (wf, outcome) = self
            .workflows
            .try_update(&id, |wf| {
                if wf.current_step_index != snapshot.current_step_index
                    || wf.status != snapshot.status
                {
                    return Err(LifecycleError::Conflict(format!(
                        "step {} of workflow {id} was already decided",
                        snapshot.current_step_number()
                    )));
                }
                let outcome = wf.advance(actor.id, action, comments, expected_step, now)?;
                Ok((wf.clone(), outcome))
            })
            .unwrap_or_else(|| Err(LifecycleError::not_found("workflow", id)))?;

        match &outcome {
            AdvanceOutcome::Advanced { assignee, .. } => notify_quietly(
                self.notifier.as_ref(),
                *assignee,
                NotificationKind::WorkflowStepAssigned,
                step_payload(&wf),
            ),
            AdvanceOutcome::Completed => self.approve_document(&wf, now),
            AdvanceOutcome::Rejected => self.reject_document(&wf, now),
        }

        publish(
            self.publisher.as_ref(),
            LifecycleEvent::StepAdvanced {
                workflow_id: id,
                document_id: wf.document_id,
                step_number: snapshot.current_step_number(),
                action,
                status: wf.status,
            },
        );
        tracing::info!(
            workflow = %id,
            step = snapshot.current_step_number(),
            action = ?action,
            status = %wf.status,
            "workflow advanced"
        );
        metrics::counter!("lexdoc_workflow_steps_total").increment(1);
        Ok(wf)
    }

    /// Cancel a pending or running workflow. Initiator or admin only.
    pub fn cancel(
        &self,
        id: WorkflowId,
        actor: &Actor,
        reason: Option<String>,
    ) -> LifecycleResult<Workflow> {
        let now = self.clock.now();
        let wf = self
            .workflows
            .try_update(&id, |wf| {
                wf.cancel(actor.id, actor.has_override(), reason, now)?;
                Ok::<_, LifecycleError>(wf.clone())
            })
            .unwrap_or_else(|| Err(LifecycleError::not_found("workflow", id)))?;
        publish(
            self.publisher.as_ref(),
            LifecycleEvent::WorkflowCancelled {
                workflow_id: id,
                document_id: wf.document_id,
            },
        );
        tracing::info!(workflow = %id, actor = %actor.id, "workflow cancelled");
        Ok(wf)
    }

    pub fn get(&self, id: WorkflowId) -> LifecycleResult<Workflow> {
        self.workflows
            .get(&id)
            .ok_or_else(|| LifecycleError::not_found("workflow", id))
    }

    /// Matching workflows, newest first.
    pub fn list(&self, filter: &WorkflowFilter) -> Vec<Workflow> {
        let mut out = self.workflows.filter(|wf| filter.matches(wf));
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        out
    }

    // ── Periodic jobs ────────────────────────────────────────────────

    /// Raise running workflows with a near deadline to `urgent` and notify
    /// the current assignee. Each workflow is noticed once, including
    /// workflows that were already urgent.
    pub fn run_escalation(&self, lookahead: Duration, now: Timestamp) -> JobReport {
        let mut report = JobReport::new("deadline_escalation");
        for wf in self.running() {
            report.examined += 1;
            let escalated = self
                .workflows
                .modify(&wf.id, |w| w.escalate(now, lookahead).map(|a| (a, w.clone())))
                .flatten();
            let Some((assignee, wf)) = escalated else {
                continue;
            };
            report.affected += 1;
            notify_quietly(
                self.notifier.as_ref(),
                assignee,
                NotificationKind::WorkflowDeadlineApproaching,
                step_payload(&wf),
            );
            tracing::info!(workflow = %wf.id, deadline = ?wf.deadline, "workflow escalated to urgent");
        }
        report
    }

    /// Remind assignees whose step has been pending too long, at most once
    /// per `threshold` per step. Never transitions a workflow.
    pub fn run_stall_detection(&self, threshold: Duration, now: Timestamp) -> JobReport {
        let mut report = JobReport::new("stall_detection");
        for wf in self.running() {
            report.examined += 1;
            let claimed = self
                .workflows
                .modify(&wf.id, |w| {
                    w.claim_stall_reminder(now, threshold)
                        .map(|s| (s, w.clone()))
                })
                .flatten();
            let Some((stalled, wf)) = claimed else {
                continue;
            };
            report.affected += 1;
            tracing::warn!(
                workflow = %wf.id,
                document = %wf.document_id,
                step = stalled.step_number,
                assignee = %stalled.assignee,
                pending_since = %stalled.pending_since,
                "workflow stalled"
            );
            notify_quietly(
                self.notifier.as_ref(),
                stalled.assignee,
                NotificationKind::WorkflowStalled,
                step_payload(&wf),
            );
        }
        report
    }

    /// Flag terminal workflows finished longer than `after` ago as archived.
    pub fn run_archival(&self, after: Duration, now: Timestamp) -> JobReport {
        let mut report = JobReport::new("workflow_archival");
        for wf in self.workflows.filter(|w| w.status.is_terminal() && !w.archived) {
            report.examined += 1;
            if self
                .workflows
                .modify(&wf.id, |w| w.archive_if_stale(now, after))
                .unwrap_or(false)
            {
                report.affected += 1;
            }
        }
        report
    }

    fn running(&self) -> Vec<Workflow> {
        self.workflows
            .filter(|w| w.status == WorkflowStatus::InProgress)
    }

    fn approve_document(&self, wf: &Workflow, now: Timestamp) {
        let reason = format!("workflow {} completed", wf.id.as_uuid());
        let result = self.registry.try_update(wf.document_id, |d| {
            let changed = d.lifecycle.approve(now, &reason)?;
            if changed {
                d.updated_at = now;
            }
            Ok(changed)
        });
        match result {
            Ok(true) => {
                publish(
                    self.publisher.as_ref(),
                    LifecycleEvent::StatusChanged {
                        document_id: wf.document_id,
                        status: lexdoc_state::DocumentStatus::Approved,
                    },
                );
                metrics::counter!("lexdoc_documents_approved_total").increment(1);
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(document = %wf.document_id, error = %e, "document approval skipped")
            }
        }
    }

    fn reject_document(&self, wf: &Workflow, now: Timestamp) {
        let reason = format!("workflow {} rejected", wf.id.as_uuid());
        let changed = self
            .registry
            .try_update(wf.document_id, |d| {
                let changed = d.lifecycle.reject(now, &reason);
                if changed {
                    d.updated_at = now;
                }
                Ok(changed)
            })
            .unwrap_or(false);
        if changed {
            publish(
                self.publisher.as_ref(),
                LifecycleEvent::StatusChanged {
                    document_id: wf.document_id,
                    status: lexdoc_state::DocumentStatus::Rejected,
                },
            );
        }
    }
}

fn step_payload(wf: &Workflow) -> serde_json::Value {
    serde_json::json!({
        "workflow_id": wf.id,
        "document_id": wf.document_id,
        "workflow_name": wf.name,
        "step_number": wf.current_step_number(),
        "deadline": wf.deadline,
        "priority": wf.priority,
    })
}
