//! Trained estimator backends and risk scoring

pub mod linear;
pub mod loader;
pub mod onnx;
pub mod scorer;

use crate::error::Result;
use crate::feature_aligner::EncodedRecord;

pub use linear::LogisticModel;
pub use loader::{LoadedModel, ModelLoader};
pub use onnx::OnnxModel;
pub use scorer::RiskScorer;

/// A trained binary classifier.
///
/// Implementations are loaded once and shared read-only across request
/// handlers, so they must be `Send + Sync`.
pub trait ProbabilityModel: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Probability of the positive (default) class for each row, in order
    fn predict_proba(&self, rows: &[EncodedRecord]) -> Result<Vec<f64>>;
}
