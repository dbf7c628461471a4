//! Type definitions for the loan default service

pub mod loan;
pub mod score;

pub use loan::LoanApplication;
pub use score::{PredictionResponse, RiskLabel, ScoreResult};
