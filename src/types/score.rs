//! Score results and risk labels

use serde::{Deserialize, Serialize};
use std::fmt;

/// Probability at or above which a loan is predicted to default
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Lower (inclusive) edges of the risk label bands
pub const VERY_HIGH_RISK_THRESHOLD: f64 = 0.8;
pub const HIGH_RISK_THRESHOLD: f64 = 0.6;
pub const MODERATE_RISK_THRESHOLD: f64 = 0.4;

/// Human-readable risk bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLabel {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Moderate Risk")]
    Moderate,
    #[serde(rename = "High Risk")]
    High,
    #[serde(rename = "Very High Risk")]
    VeryHigh,
}

impl RiskLabel {
    pub const ALL: [RiskLabel; 4] = [
        RiskLabel::Low,
        RiskLabel::Moderate,
        RiskLabel::High,
        RiskLabel::VeryHigh,
    ];

    /// Bucket a probability; bands are checked high to low
    pub fn from_probability(probability: f64) -> Self {
        if probability >= VERY_HIGH_RISK_THRESHOLD {
            RiskLabel::VeryHigh
        } else if probability >= HIGH_RISK_THRESHOLD {
            RiskLabel::High
        } else if probability >= MODERATE_RISK_THRESHOLD {
            RiskLabel::Moderate
        } else {
            RiskLabel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::Low => "Low Risk",
            RiskLabel::Moderate => "Moderate Risk",
            RiskLabel::High => "High Risk",
            RiskLabel::VeryHigh => "Very High Risk",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary default decision from the unrounded probability
pub fn decision_from_probability(probability: f64) -> u8 {
    u8::from(probability >= DECISION_THRESHOLD)
}

/// Round to two decimal places for external reporting
pub fn round_probability(probability: f64) -> f64 {
    (probability * 100.0).round() / 100.0
}

/// Outcome of scoring one encoded record
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    /// Unrounded probability of default (0.0 - 1.0)
    pub probability: f64,
    /// 1 when the loan is predicted to default
    pub decision: u8,
    pub label: RiskLabel,
    pub model_version: String,
}

impl ScoreResult {
    pub fn from_probability(probability: f64, model_version: &str) -> Self {
        Self {
            probability,
            decision: decision_from_probability(probability),
            label: RiskLabel::from_probability(probability),
            model_version: model_version.to_string(),
        }
    }

    pub fn rounded_probability(&self) -> f64 {
        round_probability(self.probability)
    }
}

/// JSON body returned by `POST /predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub default_probability: f64,
    pub prediction: u8,
    pub confidence_label: RiskLabel,
    pub model_version: String,
}

impl From<&ScoreResult> for PredictionResponse {
    fn from(result: &ScoreResult) -> Self {
        Self {
            default_probability: result.rounded_probability(),
            prediction: result.decision,
            confidence_label: result.label,
            model_version: result.model_version.clone(),
        }
    }
}
