//! Shared fixtures for unit tests

use crate::error::Result;
use crate::feature_aligner::{EncodedRecord, ExpectedColumns, FeatureAligner};
use crate::models::ProbabilityModel;
use crate::pipeline::ScoringPipeline;
use crate::types::LoanApplication;
use std::sync::Arc;

/// Returns the same probability for every row
pub struct FixedProbabilityModel {
    probability: f64,
}

impl FixedProbabilityModel {
    pub fn new(probability: f64) -> Self {
        Self { probability }
    }
}

impl ProbabilityModel for FixedProbabilityModel {
    fn name(&self) -> &str {
        "fixed"
    }

    fn predict_proba(&self, rows: &[EncodedRecord]) -> Result<Vec<f64>> {
        Ok(vec![self.probability; rows.len()])
    }
}

/// A small slice of the training feature layout
pub fn trained_columns() -> Vec<String> {
    [
        "loan_amnt",
        "funded_amnt",
        "int_rate",
        "annual_inc",
        "dti",
        "delinq_2yrs",
        "term_60_months",
        "emp_length_10plus_years",
        "emp_length_5_years",
        "emp_length_less_than_1_year",
        "home_ownership_OWN",
        "home_ownership_RENT",
        "verification_status_Source_Verified",
        "verification_status_Verified",
        "purpose_credit_card",
        "purpose_debt_consolidation",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn expected_columns() -> Arc<ExpectedColumns> {
    Arc::new(ExpectedColumns::new(trained_columns()).expect("valid columns"))
}

/// The example application, aligned
pub fn example_record() -> EncodedRecord {
    FeatureAligner::new(expected_columns()).align(&LoanApplication::example())
}

/// Pipeline backed by a fixed-probability model
pub fn fixed_pipeline(probability: f64) -> ScoringPipeline {
    ScoringPipeline::new(
        Arc::new(FixedProbabilityModel::new(probability)),
        expected_columns(),
        "1.0.0",
    )
}
