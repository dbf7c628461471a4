//! Daily batch scheduler.
//!
//! Triggers the batch prediction job on the configured interval until
//! interrupted.

use anyhow::{Context, Result};
use loan_default_service::{
    batch,
    config::AppConfig,
    logging,
    scheduler::{BatchJob, BatchScheduler},
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init_tracing(&config.logging);

    let job_config = config.clone();
    let job: BatchJob = Arc::new(move || batch::run(&job_config));
    let scheduler = BatchScheduler::new(config.scheduler.clone(), job);

    tokio::select! {
        _ = scheduler.run(None) => {}
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for shutdown signal")?;
            info!("Scheduler shutting down");
        }
    }

    Ok(())
}
