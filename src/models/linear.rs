//! Logistic regression model stored as a JSON artifact

use crate::error::{Result, ServiceError};
use crate::feature_aligner::EncodedRecord;
use crate::models::ProbabilityModel;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// On-disk form of a fitted logistic regression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticArtifact {
    /// Ordered feature names the model was trained on
    pub feature_names: Vec<String>,
    /// One coefficient per feature, same order
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Fixed-weight logistic model: `sigmoid(w . x + b)`
#[derive(Debug, Clone)]
pub struct LogisticModel {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LogisticModel {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    /// Load the artifact, returning the model and its trained feature names
    pub fn load<P: AsRef<Path>>(path: P) -> Result<(Self, Vec<String>)> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ServiceError::ModelLoad(format!("cannot read {}: {}", path.display(), e))
        })?;
        let artifact: LogisticArtifact = serde_json::from_str(&raw).map_err(|e| {
            ServiceError::ModelLoad(format!("cannot parse {}: {}", path.display(), e))
        })?;

        if artifact.coefficients.len() != artifact.feature_names.len() {
            return Err(ServiceError::ModelLoad(format!(
                "{} has {} coefficients for {} features",
                path.display(),
                artifact.coefficients.len(),
                artifact.feature_names.len()
            )));
        }

        info!(
            path = %path.display(),
            features = artifact.feature_names.len(),
            "Logistic model loaded"
        );

        Ok((
            Self::new(artifact.coefficients, artifact.intercept),
            artifact.feature_names,
        ))
    }

    fn probability(&self, values: &[f64]) -> f64 {
        let logit: f64 = self
            .coefficients
            .iter()
            .zip(values)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;
        1.0 / (1.0 + (-logit).exp())
    }
}

impl ProbabilityModel for LogisticModel {
    fn name(&self) -> &str {
        "logistic"
    }

    fn predict_proba(&self, rows: &[EncodedRecord]) -> Result<Vec<f64>> {
        rows.iter()
            .map(|row| {
                if row.values().len() != self.coefficients.len() {
                    return Err(ServiceError::Inference(format!(
                        "expected {} features, got {}",
                        self.coefficients.len(),
                        row.values().len()
                    )));
                }
                Ok(self.probability(row.values()))
            })
            .collect()
    }
}
