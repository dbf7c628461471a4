//! In-process daily trigger for the batch scoring job.
//!
//! Stands in for an external orchestrator: runs the job on a fixed
//! interval, skips missed ticks instead of catching up and keeps going
//! after a failed run.

use crate::batch::BatchSummary;
use crate::config::SchedulerConfig;
use crate::error::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tracing::{error, info};
use uuid::Uuid;

/// The job to trigger; runs on a blocking thread
pub type BatchJob = Arc<dyn Fn() -> Result<BatchSummary> + Send + Sync>;

/// Result of one triggered run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub succeeded: bool,
    pub rows: Option<usize>,
    pub elapsed: Duration,
}

/// Triggers a batch job on a fixed interval
pub struct BatchScheduler {
    config: SchedulerConfig,
    job: BatchJob,
}

impl BatchScheduler {
    pub fn new(config: SchedulerConfig, job: BatchJob) -> Self {
        Self { config, job }
    }

    /// Run the job once and log its outcome
    pub async fn trigger(&self) -> RunOutcome {
        let run_id = Uuid::new_v4();
        let start = Instant::now();
        info!(job = %self.config.job_name, run_id = %run_id, "Batch run started");

        let job = Arc::clone(&self.job);
        let result = match tokio::task::spawn_blocking(move || job()).await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(e) => Err(format!("batch task panicked: {}", e)),
        };
        let elapsed = start.elapsed();

        match result {
            Ok(summary) => {
                info!(
                    job = %self.config.job_name,
                    run_id = %run_id,
                    rows = summary.rows,
                    positives = summary.positives,
                    output = %summary.output_path.display(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Batch run succeeded"
                );
                RunOutcome {
                    run_id,
                    succeeded: true,
                    rows: Some(summary.rows),
                    elapsed,
                }
            }
            Err(e) => {
                error!(
                    job = %self.config.job_name,
                    run_id = %run_id,
                    error = %e,
                    "Batch run failed"
                );
                RunOutcome {
                    run_id,
                    succeeded: false,
                    rows: None,
                    elapsed,
                }
            }
        }
    }

    /// Run on schedule; stops after `max_runs` runs when given
    pub async fn run(&self, max_runs: Option<usize>) -> Vec<RunOutcome> {
        let period = Duration::from_secs(self.config.interval_secs.max(1));
        let start = if self.config.run_on_start {
            tokio::time::Instant::now()
        } else {
            tokio::time::Instant::now() + period
        };

        let mut interval = tokio::time::interval_at(start, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            job = %self.config.job_name,
            interval_secs = period.as_secs(),
            run_on_start = self.config.run_on_start,
            "Scheduler started"
        );

        let mut outcomes = Vec::new();
        while max_runs.map_or(true, |max| outcomes.len() < max) {
            interval.tick().await;
            outcomes.push(self.trigger().await);
        }
        outcomes
    }
}
