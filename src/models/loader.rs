//! Model artifact loader

use crate::config::{ModelConfig, ModelKind};
use crate::error::{Result, ServiceError};
use crate::feature_aligner::ExpectedColumns;
use crate::models::onnx::FeatureInfo;
use crate::models::{LogisticModel, OnnxModel, ProbabilityModel};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// A loaded estimator together with the columns it was trained on
pub struct LoadedModel {
    pub model: Arc<dyn ProbabilityModel>,
    pub expected_columns: ExpectedColumns,
    pub version: String,
}

/// Loads the configured model artifact once at startup
pub struct ModelLoader {
    config: ModelConfig,
}

impl ModelLoader {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Load the artifact; any failure here must stop the process from serving
    pub fn load(&self) -> Result<LoadedModel> {
        let path = Path::new(&self.config.path);
        if !path.exists() {
            return Err(ServiceError::ModelLoad(format!(
                "model file not found: {}",
                path.display()
            )));
        }

        let (model, feature_names): (Arc<dyn ProbabilityModel>, Vec<String>) =
            match self.config.kind {
                ModelKind::Linear => {
                    let (model, names) = LogisticModel::load(path)?;
                    (Arc::new(model), names)
                }
                ModelKind::Onnx => {
                    let info_path = self.config.feature_info.as_deref().ok_or_else(|| {
                        ServiceError::ModelLoad(
                            "ONNX models need `model.feature_info` listing feature names"
                                .to_string(),
                        )
                    })?;
                    let info = FeatureInfo::load(info_path)?;
                    let model = OnnxModel::load(path, self.config.onnx_threads)?;
                    (Arc::new(model), info.feature_names)
                }
            };

        let expected_columns = ExpectedColumns::new(feature_names)?;

        info!(
            model = model.name(),
            path = %path.display(),
            features = expected_columns.len(),
            version = %self.config.version,
            "Model artifact loaded"
        );

        Ok(LoadedModel {
            model,
            expected_columns,
            version: self.config.version.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_linear_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(
            &path,
            r#"{"feature_names": ["loan_amnt", "dti"], "coefficients": [0.0, 0.1], "intercept": -1.0}"#,
        )
        .unwrap();

        let config = ModelConfig {
            path: path.to_string_lossy().to_string(),
            ..ModelConfig::default()
        };
        let loaded = ModelLoader::new(&config).load().unwrap();

        assert_eq!(loaded.model.name(), "logistic");
        assert_eq!(loaded.expected_columns.names(), ["loan_amnt", "dti"]);
        assert_eq!(loaded.version, "1.0.0");
    }

    #[test]
    fn test_missing_model_file_is_fatal() {
        let config = ModelConfig {
            path: "/nonexistent/model.json".to_string(),
            ..ModelConfig::default()
        };
        assert!(matches!(
            ModelLoader::new(&config).load(),
            Err(ServiceError::ModelLoad(_))
        ));
    }

    #[test]
    fn test_onnx_requires_feature_info() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        std::fs::write(&path, b"not a real graph").unwrap();

        let config = ModelConfig {
            kind: ModelKind::Onnx,
            path: path.to_string_lossy().to_string(),
            feature_info: None,
            ..ModelConfig::default()
        };
        let err = ModelLoader::new(&config).load().err().unwrap();
        assert!(err.to_string().contains("feature_info"));
    }

    #[test]
    fn test_duplicate_feature_names_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(
            &path,
            r#"{"feature_names": ["dti", "dti"], "coefficients": [0.1, 0.1], "intercept": 0.0}"#,
        )
        .unwrap();

        let config = ModelConfig {
            path: path.to_string_lossy().to_string(),
            ..ModelConfig::default()
        };
        assert!(ModelLoader::new(&config).load().is_err());
    }
}
