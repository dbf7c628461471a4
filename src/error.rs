//! Error types shared by the scoring pipeline, batch job and HTTP layer

use thiserror::Error;

/// Result alias for library operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors raised by the loan default service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Configuration could not be loaded or is inconsistent
    #[error("configuration error: {0}")]
    Config(String),

    /// Model artifact missing, corrupt or inconsistent with its feature list
    #[error("failed to load model artifact: {0}")]
    ModelLoad(String),

    /// Estimator failed while producing probabilities
    #[error("inference failed: {0}")]
    Inference(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<config::ConfigError> for ServiceError {
    fn from(err: config::ConfigError) -> Self {
        ServiceError::Config(err.to_string())
    }
}
