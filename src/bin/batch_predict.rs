//! Batch prediction entry point.
//!
//! Takes no arguments: scores the configured input CSV once and exits
//! with a non-zero status on any failure.

use anyhow::{Context, Result};
use loan_default_service::{batch, config::AppConfig, logging};
use tracing::info;

fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init_tracing(&config.logging);

    info!(
        input = %config.batch.input_path,
        output = %config.batch.output_path,
        "Running batch prediction"
    );

    let summary = batch::run(&config).context("Batch prediction failed")?;

    info!(
        rows = summary.rows,
        positives = summary.positives,
        output = %summary.output_path.display(),
        "Batch prediction finished"
    );
    Ok(())
}
