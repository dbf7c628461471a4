//! Loan Default Risk Service - HTTP Entry Point
//!
//! Loads the model artifact once, then serves `/health`, `/predict` and
//! `/metrics`.

use anyhow::{Context, Result};
use loan_default_service::{
    api::{self, AppState},
    config::AppConfig,
    logging,
    metrics::MetricsReporter,
    pipeline::ScoringPipeline,
    prediction_log::PredictionLogger,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init_tracing(&config.logging);

    info!("Starting Loan Default Risk Service");

    // A missing or corrupt artifact must stop startup
    let pipeline =
        ScoringPipeline::load(&config.model).context("Failed to load model artifact")?;
    info!(
        model = pipeline.scorer().model_name(),
        version = pipeline.model_version(),
        features = pipeline.aligner().feature_count(),
        "Scoring pipeline ready"
    );

    let logger = PredictionLogger::to_file(&config.prediction_log.path);
    info!(path = %config.prediction_log.path, "Prediction log");

    let state = AppState::new(pipeline, logger);

    let reporter = MetricsReporter::new(
        state.metrics.clone(),
        config.metrics.report_interval_secs,
    );
    tokio::spawn(reporter.start());

    let app = api::router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Service shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
