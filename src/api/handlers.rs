//! Request handlers

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::metrics::MetricsSnapshot;
use crate::types::{LoanApplication, PredictionResponse};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Score one loan application
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<LoanApplication>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(loan) = payload.map_err(|rejection| {
        state.metrics.record_rejection();
        ApiError::from(rejection)
    })?;

    let start = Instant::now();
    let result = state.pipeline.score(&loan).map_err(|e| {
        state.metrics.record_failure();
        ApiError::from(e)
    })?;
    let latency = start.elapsed();

    state.metrics.record_prediction(latency, &result);
    state.logger.log_result(&loan, &result);

    debug!(
        probability = result.probability,
        decision = result.decision,
        label = %result.label,
        latency_us = latency.as_micros() as u64,
        "Prediction served"
    );

    Ok(Json(PredictionResponse::from(&result)))
}

pub async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
