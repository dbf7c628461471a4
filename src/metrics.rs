//! Serving metrics for the prediction endpoint.

use crate::types::{RiskLabel, ScoreResult};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector shared by request handlers
pub struct ServingMetrics {
    /// Successful predictions
    pub predictions_served: AtomicU64,
    /// Predictions with decision 1
    pub positive_decisions: AtomicU64,
    /// Requests rejected before scoring
    pub validation_rejections: AtomicU64,
    /// Requests that failed inside the model
    pub inference_failures: AtomicU64,
    by_label: RwLock<BTreeMap<RiskLabel, u64>>,
    /// Request latencies (in microseconds)
    latencies: RwLock<Vec<u64>>,
    /// Probability histogram, ten buckets of width 0.1
    score_buckets: RwLock<[u64; 10]>,
    start_time: Instant,
}

impl ServingMetrics {
    pub fn new() -> Self {
        Self {
            predictions_served: AtomicU64::new(0),
            positive_decisions: AtomicU64::new(0),
            validation_rejections: AtomicU64::new(0),
            inference_failures: AtomicU64::new(0),
            by_label: RwLock::new(BTreeMap::new()),
            latencies: RwLock::new(Vec::with_capacity(1000)),
            score_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a served prediction
    pub fn record_prediction(&self, latency: Duration, result: &ScoreResult) {
        self.predictions_served.fetch_add(1, Ordering::Relaxed);
        if result.decision == 1 {
            self.positive_decisions.fetch_add(1, Ordering::Relaxed);
        }

        *self.by_label.write().entry(result.label).or_insert(0) += 1;

        {
            let mut latencies = self.latencies.write();
            latencies.push(latency.as_micros() as u64);
            // Keep only the most recent samples
            if latencies.len() > 10_000 {
                latencies.drain(0..5_000);
            }
        }

        let bucket = ((result.probability * 10.0) as usize).min(9);
        self.score_buckets.write()[bucket] += 1;
    }

    pub fn record_rejection(&self) {
        self.validation_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.inference_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Latency percentiles over the retained samples
    pub fn latency_stats(&self) -> LatencyStats {
        let mut sorted = self.latencies.read().clone();
        if sorted.is_empty() {
            return LatencyStats::default();
        }
        sorted.sort_unstable();

        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();
        let percentile = |q: f64| sorted[((count as f64 * q) as usize).min(count - 1)];

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: percentile(0.50),
            p95_us: percentile(0.95),
            p99_us: percentile(0.99),
            max_us: sorted[count - 1],
        }
    }

    /// Predictions per second since startup
    pub fn throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.predictions_served.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn score_distribution(&self) -> [u64; 10] {
        *self.score_buckets.read()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let by_label = self.by_label.read();
        MetricsSnapshot {
            predictions_served: self.predictions_served.load(Ordering::Relaxed),
            positive_decisions: self.positive_decisions.load(Ordering::Relaxed),
            validation_rejections: self.validation_rejections.load(Ordering::Relaxed),
            inference_failures: self.inference_failures.load(Ordering::Relaxed),
            by_label: RiskLabel::ALL
                .iter()
                .map(|label| (label.as_str(), by_label.get(label).copied().unwrap_or(0)))
                .collect(),
            latency: self.latency_stats(),
            score_distribution: self.score_distribution(),
            throughput: self.throughput(),
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log a summary through tracing
    pub fn print_summary(&self) {
        let snapshot = self.snapshot();
        let positive_rate = if snapshot.predictions_served > 0 {
            snapshot.positive_decisions as f64 / snapshot.predictions_served as f64 * 100.0
        } else {
            0.0
        };

        info!(
            served = snapshot.predictions_served,
            positive_rate = format!("{:.1}%", positive_rate),
            rejected = snapshot.validation_rejections,
            failed = snapshot.inference_failures,
            throughput = format!("{:.2} req/s", snapshot.throughput),
            "Prediction summary"
        );
        info!(
            mean_us = snapshot.latency.mean_us,
            p50_us = snapshot.latency.p50_us,
            p95_us = snapshot.latency.p95_us,
            p99_us = snapshot.latency.p99_us,
            "Prediction latency"
        );
        for (label, count) in &snapshot.by_label {
            info!(label = %label, count, "Predictions by risk label");
        }
    }
}

impl Default for ServingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Latency statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Point-in-time view served at `GET /metrics`
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub predictions_served: u64,
    pub positive_decisions: u64,
    pub validation_rejections: u64,
    pub inference_failures: u64,
    pub by_label: BTreeMap<&'static str, u64>,
    pub latency: LatencyStats,
    pub score_distribution: [u64; 10],
    pub throughput: f64,
    pub uptime_secs: u64,
}

/// Prints a metrics summary on a fixed interval
pub struct MetricsReporter {
    metrics: Arc<ServingMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<ServingMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs.max(1)));
        // First tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}
