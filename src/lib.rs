//! Loan Default Risk Service Library
//!
//! Scores loan applications with a pre-trained default-risk classifier.
//! The same alignment and scoring pipeline backs the HTTP endpoint, the
//! batch CSV scorer and the scheduled batch job.

pub mod api;
pub mod batch;
pub mod config;
pub mod error;
pub mod feature_aligner;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod prediction_log;
pub mod scheduler;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use config::AppConfig;
pub use error::{Result, ServiceError};
pub use feature_aligner::{EncodedRecord, ExpectedColumns, FeatureAligner};
pub use models::{ProbabilityModel, RiskScorer};
pub use pipeline::ScoringPipeline;
pub use prediction_log::PredictionLogger;
pub use types::{LoanApplication, PredictionResponse, RiskLabel, ScoreResult};
