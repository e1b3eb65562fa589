//! # Background Jobs
//!
//! One tokio task per enabled [`JobKind`]. Each tick runs the job on the
//! blocking pool, since lifecycle operations take synchronous locks. Missed
//! ticks are skipped rather than replayed, and every job is safe to run
//! again after a crash.

use lexdoc_core::Timestamp;
use lexdoc_lifecycle::{JobKind, Lifecycle};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::state::JobSchedule;

/// Start every job whose interval is non-zero.
pub fn spawn(lifecycle: Lifecycle, schedule: &JobSchedule) -> Vec<JoinHandle<()>> {
    JobKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let period = schedule.interval(kind)?;
            tracing::info!(job = kind.as_str(), period_secs = period.as_secs(), "job scheduled");
            Some(tokio::spawn(run_every(lifecycle.clone(), kind, period)))
        })
        .collect()
}

async fn run_every(lifecycle: Lifecycle, kind: JobKind, period: std::time::Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let lc = lifecycle.clone();
        match tokio::task::spawn_blocking(move || lc.run_job(kind, Timestamp::now())).await {
            Ok(report) => report.log(),
            Err(e) => tracing::error!(job = kind.as_str(), error = %e, "job panicked"),
        }
    }
}
