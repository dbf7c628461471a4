//! Request-to-score pipeline shared by the HTTP and batch paths

use crate::config::ModelConfig;
use crate::error::Result;
use crate::feature_aligner::{ExpectedColumns, FeatureAligner};
use crate::models::{LoadedModel, ModelLoader, ProbabilityModel, RiskScorer};
use crate::types::{LoanApplication, ScoreResult};
use std::sync::Arc;

/// Immutable scoring context: trained model plus its expected columns.
///
/// Built once at startup and shared behind an `Arc`; nothing in it is
/// mutated afterwards, so concurrent handlers read it without locking.
#[derive(Clone)]
pub struct ScoringPipeline {
    aligner: FeatureAligner,
    scorer: RiskScorer,
}

impl ScoringPipeline {
    pub fn new(
        model: Arc<dyn ProbabilityModel>,
        expected: Arc<ExpectedColumns>,
        model_version: impl Into<String>,
    ) -> Self {
        Self {
            aligner: FeatureAligner::new(expected),
            scorer: RiskScorer::new(model, model_version),
        }
    }

    /// Load the configured artifact and build the pipeline
    pub fn load(config: &ModelConfig) -> Result<Self> {
        Ok(Self::from(ModelLoader::new(config).load()?))
    }

    pub fn aligner(&self) -> &FeatureAligner {
        &self.aligner
    }

    pub fn scorer(&self) -> &RiskScorer {
        &self.scorer
    }

    pub fn model_version(&self) -> &str {
        self.scorer.model_version()
    }

    /// Align and score one application
    pub fn score(&self, loan: &LoanApplication) -> Result<ScoreResult> {
        let encoded = self.aligner.align(loan);
        self.scorer.score(&encoded)
    }

    /// Align and score a table of applications in row order
    pub fn score_batch(&self, loans: &[LoanApplication]) -> Result<Vec<ScoreResult>> {
        let encoded = self.aligner.align_batch(loans);
        self.scorer.score_batch(&encoded)
    }
}

impl From<LoadedModel> for ScoringPipeline {
    fn from(loaded: LoadedModel) -> Self {
        Self::new(
            loaded.model,
            Arc::new(loaded.expected_columns),
            loaded.version,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixed_pipeline;
    use crate::types::{PredictionResponse, RiskLabel};

    #[test]
    fn test_example_scenario() {
        let pipeline = fixed_pipeline(0.42);
        let result = pipeline.score(&LoanApplication::example()).unwrap();
        let response = PredictionResponse::from(&result);

        assert_eq!(response.default_probability, 0.42);
        assert_eq!(response.prediction, 0);
        assert_eq!(response.confidence_label, RiskLabel::Moderate);
        assert_eq!(response.model_version, "1.0.0");
    }

    #[test]
    fn test_unseen_category_scores_without_error() {
        let pipeline = fixed_pipeline(0.3);
        let mut loan = LoanApplication::example();
        loan.home_ownership = "CASTLE".to_string();
        loan.purpose = "spaceship".to_string();

        let result = pipeline.score(&loan).unwrap();
        assert_eq!(result.label, RiskLabel::Low);
    }

    #[test]
    fn test_batch_scoring_row_count() {
        let pipeline = fixed_pipeline(0.61);
        let loans = vec![LoanApplication::example(); 4];

        let results = pipeline.score_batch(&loans).unwrap();
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.decision == 1 && r.label == RiskLabel::High));
    }

    #[test]
    fn test_load_from_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(
            &path,
            r#"{"feature_names": ["loan_amnt", "home_ownership_RENT"], "coefficients": [0.0, 0.0], "intercept": 0.0}"#,
        )
        .unwrap();

        let config = ModelConfig {
            path: path.to_string_lossy().to_string(),
            version: "3.0.0".to_string(),
            ..ModelConfig::default()
        };
        let pipeline = ScoringPipeline::load(&config).unwrap();

        assert_eq!(pipeline.aligner().feature_count(), 2);
        let result = pipeline.score(&LoanApplication::example()).unwrap();
        assert_eq!(result.probability, 0.5);
        assert_eq!(result.model_version, "3.0.0");
    }
}
