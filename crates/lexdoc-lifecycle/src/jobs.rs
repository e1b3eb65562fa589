//! # Periodic Jobs
//!
//! The four background sweeps and the report each tick produces. Jobs take
//! `now` from the caller, isolate failures per item, and are safe to re-run:
//! a second tick at the same instant changes nothing further (stall
//! reminders are resent, which is acceptable at-least-once delivery).

use serde::Serialize;

use lexdoc_core::Timestamp;

use crate::Lifecycle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    DeadlineEscalation,
    StallDetection,
    VersionRetention,
    WorkflowArchival,
}

impl JobKind {
    pub const ALL: [JobKind; 4] = [
        JobKind::DeadlineEscalation,
        JobKind::StallDetection,
        JobKind::VersionRetention,
        JobKind::WorkflowArchival,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeadlineEscalation => "deadline_escalation",
            Self::StallDetection => "stall_detection",
            Self::VersionRetention => "version_retention",
            Self::WorkflowArchival => "workflow_archival",
        }
    }
}

/// Outcome of one job tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobReport {
    pub job: &'static str,
    /// Items looked at.
    pub examined: usize,
    /// Items changed or flagged.
    pub affected: usize,
    /// Items that failed and were skipped.
    pub failures: usize,
}

impl JobReport {
    pub fn new(job: &'static str) -> Self {
        Self {
            job,
            examined: 0,
            affected: 0,
            failures: 0,
        }
    }

    pub fn log(&self) {
        if self.failures > 0 {
            tracing::warn!(
                job = self.job,
                examined = self.examined,
                affected = self.affected,
                failures = self.failures,
                "job finished with failures"
            );
        } else {
            tracing::info!(
                job = self.job,
                examined = self.examined,
                affected = self.affected,
                "job finished"
            );
        }
    }
}

impl Lifecycle {
    /// Run one tick of `kind` at `now`.
    pub fn run_job(&self, kind: JobKind, now: Timestamp) -> JobReport {
        let report = match kind {
            JobKind::DeadlineEscalation => self
                .workflows
                .run_escalation(self.config.escalation_lookahead(), now),
            JobKind::StallDetection => self
                .workflows
                .run_stall_detection(self.config.stall_threshold(), now),
            JobKind::VersionRetention => self.versions.run_retention(&self.config.retention, now),
            JobKind::WorkflowArchival => self
                .workflows
                .run_archival(self.config.workflow_archive_after(), now),
        };
        metrics::counter!("lexdoc_job_runs_total", "job" => kind.as_str()).increment(1);
        report
    }
}
