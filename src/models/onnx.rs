//! ONNX Runtime backend for exported gradient-boosted models

use crate::error::{Result, ServiceError};
use crate::feature_aligner::EncodedRecord;
use crate::models::ProbabilityModel;
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session, SessionOutputs};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, Tensor};
use serde::Deserialize;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Sidecar describing the exported model's input columns
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureInfo {
    pub feature_names: Vec<String>,
}

impl FeatureInfo {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ServiceError::ModelLoad(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            ServiceError::ModelLoad(format!("cannot parse {}: {}", path.display(), e))
        })
    }
}

/// Classifier exported to ONNX, e.g. an XGBoost model via onnxmltools
pub struct OnnxModel {
    /// Session runs need exclusive access
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

fn build_session(path: &Path, onnx_threads: usize) -> anyhow::Result<Session> {
    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(onnx_threads)?
        .commit_from_file(path)?;
    Ok(session)
}

impl OnnxModel {
    /// Load the model graph from file
    pub fn load<P: AsRef<Path>>(path: P, onnx_threads: usize) -> Result<Self> {
        let path = path.as_ref();

        info!(path = %path.display(), threads = onnx_threads, "Loading ONNX model");

        let session = build_session(path, onnx_threads).map_err(|e| {
            ServiceError::ModelLoad(format!("cannot load {}: {:#}", path.display(), e))
        })?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        // Classifiers export a label output and a probabilities output
        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "probabilities".to_string());

        info!(input = %input_name, output = %output_name, "ONNX model loaded");

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }

    fn run(&self, rows: &[EncodedRecord]) -> anyhow::Result<Vec<f64>> {
        let width = rows[0].values().len();
        let mut data = Vec::with_capacity(rows.len() * width);
        for row in rows {
            anyhow::ensure!(row.values().len() == width, "ragged feature rows");
            data.extend(row.values().iter().map(|&v| v as f32));
        }

        // Input tensor shape [rows, features]
        let shape = vec![rows.len() as i64, width as i64];
        let input = Tensor::from_array((shape, data))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow::anyhow!("session lock poisoned: {}", e))?;
        let outputs = session.run(ort::inputs![&self.input_name => input])?;

        let probabilities = extract_probabilities(&outputs, &self.output_name, rows.len())?;
        Ok(probabilities)
    }
}

impl ProbabilityModel for OnnxModel {
    fn name(&self) -> &str {
        "onnx"
    }

    fn predict_proba(&self, rows: &[EncodedRecord]) -> Result<Vec<f64>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        self.run(rows)
            .map_err(|e| ServiceError::Inference(format!("{:#}", e)))
    }
}

/// Pull positive-class probabilities out of the session outputs.
///
/// Tree ensembles export either a `[n, classes]` float tensor or a
/// `seq(map(int64, float))` with one map per row.
fn extract_probabilities(
    outputs: &SessionOutputs,
    output_name: &str,
    rows: usize,
) -> anyhow::Result<Vec<f64>> {
    if let Some(output) = outputs.get(output_name) {
        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let dims: Vec<i64> = shape.iter().copied().collect();
            return Ok(probabilities_from_tensor(&dims, data, rows)?);
        }

        if DynSequenceValueType::can_downcast(&output.dtype()) {
            return probabilities_from_sequence_map(output, rows);
        }
    }

    anyhow::bail!("model output `{}` has no readable probabilities", output_name)
}

/// `[n, 2]` -> column 1, `[n, 1]` or `[n]` -> the value itself
fn probabilities_from_tensor(dims: &[i64], data: &[f32], rows: usize) -> Result<Vec<f64>> {
    let columns = match dims {
        [n, c] if *n as usize == rows => *c as usize,
        [n] if *n as usize == rows => 1,
        _ => {
            return Err(ServiceError::Inference(format!(
                "unexpected probability tensor shape {:?} for {} rows",
                dims, rows
            )))
        }
    };

    if data.len() < rows * columns {
        return Err(ServiceError::Inference(format!(
            "probability tensor holds {} values for shape {:?}",
            data.len(),
            dims
        )));
    }

    let probabilities = (0..rows)
        .map(|i| {
            let offset = if columns >= 2 { i * columns + 1 } else { i * columns };
            data[offset] as f64
        })
        .collect();

    debug!(rows, columns, "Extracted probabilities from tensor");
    Ok(probabilities)
}

fn probabilities_from_sequence_map(
    output: &ort::value::DynValue,
    rows: usize,
) -> anyhow::Result<Vec<f64>> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| anyhow::anyhow!("output is not a sequence: {}", e))?;
    let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;

    anyhow::ensure!(
        maps.len() == rows,
        "expected {} probability maps, got {}",
        rows,
        maps.len()
    );

    let mut probabilities = Vec::with_capacity(rows);
    for map in &maps {
        let pairs = map.try_extract_key_values::<i64, f32>()?;
        probabilities.push(class_one_probability(&pairs)?);
    }

    debug!(rows, "Extracted probabilities from seq(map)");
    Ok(probabilities)
}

fn class_one_probability(pairs: &[(i64, f32)]) -> Result<f64> {
    if let Some((_, p)) = pairs.iter().find(|(class, _)| *class == 1) {
        return Ok(*p as f64);
    }
    if let Some((_, p)) = pairs.iter().find(|(class, _)| *class == 0) {
        return Ok(1.0 - *p as f64);
    }
    Err(ServiceError::Inference("no class probability in map".to_string()))
}
