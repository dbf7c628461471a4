//! Configuration management for the loan default service

use crate::error::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Default configuration file, overridable with `LOAN_RISK_CONFIG`
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Model artifact format
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Logistic regression weights in JSON
    #[default]
    Linear,
    /// ONNX export run through ONNX Runtime
    Onnx,
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub prediction_log: PredictionLogConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Trained model artifact
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub kind: ModelKind,
    /// Model file (JSON weights or .onnx graph)
    pub path: String,
    /// Feature-name sidecar, required for ONNX models
    pub feature_info: Option<String>,
    /// Version reported with every prediction
    pub version: String,
    /// Number of threads for ONNX inference (default: 1)
    pub onnx_threads: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            kind: ModelKind::Linear,
            path: "models/loan_default_logreg.json".to_string(),
            feature_info: None,
            version: "1.0.0".to_string(),
            onnx_threads: 1,
        }
    }
}

/// Append-only prediction audit log
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PredictionLogConfig {
    pub path: String,
}

impl Default for PredictionLogConfig {
    fn default() -> Self {
        Self {
            path: "inference.log".to_string(),
        }
    }
}

/// Batch scoring file locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub input_path: String,
    pub output_path: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_path: "batch/input/new_loans.csv".to_string(),
            output_path: "predictions.csv".to_string(),
        }
    }
}

/// In-process daily trigger for the batch job
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub job_name: String,
    /// Seconds between runs (default: one day)
    pub interval_secs: u64,
    /// Run once immediately instead of waiting a full interval
    pub run_on_start: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            job_name: "loan_default_batch_prediction".to_string(),
            interval_secs: 86_400,
            run_on_start: false,
        }
    }
}

/// Periodic metrics summary
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub report_interval_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            report_interval_secs: 300,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `LOAN_RISK_CONFIG` or the default path.
    ///
    /// A missing file is not an error: defaults plus `LOAN_RISK__*`
    /// environment overrides apply.
    pub fn load() -> Result<Self> {
        let path =
            std::env::var("LOAN_RISK_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from_path(path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(Environment::with_prefix("LOAN_RISK").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// `host:port` for the HTTP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            model: ModelConfig::default(),
            prediction_log: PredictionLogConfig::default(),
            batch: BatchConfig::default(),
            scheduler: SchedulerConfig::default(),
            metrics: MetricsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.model.kind, ModelKind::Linear);
        assert_eq!(config.model.version, "1.0.0");
        assert_eq!(config.prediction_log.path, "inference.log");
        assert_eq!(config.batch.output_path, "predictions.csv");
        assert_eq!(config.scheduler.interval_secs, 86_400);
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[server]
host = "127.0.0.1"
port = 9100

[model]
kind = "onnx"
path = "models/xgboost.onnx"
feature_info = "models/feature_info.json"
version = "2.1.0"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:9100");
        assert_eq!(config.model.kind, ModelKind::Onnx);
        assert_eq!(config.model.feature_info.as_deref(), Some("models/feature_info.json"));
        assert_eq!(config.model.version, "2.1.0");
        assert_eq!(config.model.onnx_threads, 1);
        // Sections absent from the file fall back to defaults
        assert_eq!(config.batch.input_path, "batch/input/new_loans.csv");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load_from_path("/nonexistent/config.toml").unwrap();
        assert_eq!(config.model.path, "models/loan_default_logreg.json");
    }

    #[test]
    fn test_partial_section_keeps_field_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[scheduler]\nrun_on_start = true\n").unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        assert!(config.scheduler.run_on_start);
        assert_eq!(config.scheduler.job_name, "loan_default_batch_prediction");
        assert_eq!(config.scheduler.interval_secs, 86_400);
    }
}
