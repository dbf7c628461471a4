//! Converts model probabilities into decisions and risk labels

use crate::error::{Result, ServiceError};
use crate::feature_aligner::EncodedRecord;
use crate::models::ProbabilityModel;
use crate::types::score::ScoreResult;
use std::sync::Arc;

/// Scores aligned records with a trained model and fixed thresholds
#[derive(Clone)]
pub struct RiskScorer {
    model: Arc<dyn ProbabilityModel>,
    model_version: String,
}

impl RiskScorer {
    pub fn new(model: Arc<dyn ProbabilityModel>, model_version: impl Into<String>) -> Self {
        Self {
            model,
            model_version: model_version.into(),
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    /// Score a single aligned record
    pub fn score(&self, encoded: &EncodedRecord) -> Result<ScoreResult> {
        let mut results = self.score_batch(std::slice::from_ref(encoded))?;
        results
            .pop()
            .ok_or_else(|| ServiceError::Inference("model returned no probability".to_string()))
    }

    /// Score aligned records in one model call, preserving order
    pub fn score_batch(&self, encoded: &[EncodedRecord]) -> Result<Vec<ScoreResult>> {
        let probabilities = self.model.predict_proba(encoded)?;

        if probabilities.len() != encoded.len() {
            return Err(ServiceError::Inference(format!(
                "model returned {} probabilities for {} rows",
                probabilities.len(),
                encoded.len()
            )));
        }

        probabilities
            .into_iter()
            .map(|p| {
                if !p.is_finite() {
                    return Err(ServiceError::Inference(format!(
                        "model returned non-finite probability {}",
                        p
                    )));
                }
                Ok(ScoreResult::from_probability(
                    p.clamp(0.0, 1.0),
                    &self.model_version,
                ))
            })
            .collect()
    }
}
