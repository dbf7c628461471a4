//! Append-only audit log of served predictions

use crate::types::{LoanApplication, RiskLabel, ScoreResult};
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Destination for prediction log lines
pub trait PredictionSink: Send + Sync {
    /// Append one complete line (without trailing newline)
    fn append(&self, line: &str) -> std::io::Result<()>;
}

/// Appends to a file opened in append mode.
///
/// The file is opened on first write and reopened after a failed write,
/// so a missing directory at startup does not stop the service.
pub struct FileSink {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl FileSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            file: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PredictionSink for FileSink {
    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut guard = self.file.lock();

        if guard.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)?;
            *guard = Some(file);
        }

        let result = match guard.as_mut() {
            Some(file) => writeln!(file, "{}", line),
            None => Ok(()),
        };
        if result.is_err() {
            *guard = None;
        }
        result
    }
}

/// Keeps lines in memory
#[derive(Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl PredictionSink for MemorySink {
    fn append(&self, line: &str) -> std::io::Result<()> {
        self.lines.lock().push(line.to_string());
        Ok(())
    }
}

/// Format one entry:
/// `{timestamp} INFO Prediction: {decision} | Probability: {p} | Input: {input} | {label} | V{version}`
pub fn format_entry(
    timestamp: DateTime<Local>,
    input: &str,
    probability: f64,
    decision: u8,
    label: RiskLabel,
    version: &str,
) -> String {
    format!(
        "{} INFO Prediction: {} | Probability: {} | Input: {} | {} | V{}",
        timestamp.format("%Y-%m-%d %H:%M:%S,%3f"),
        decision,
        probability,
        input,
        label,
        version
    )
}

/// Best-effort prediction logger; failures never reach the caller
#[derive(Clone)]
pub struct PredictionLogger {
    sink: Arc<dyn PredictionSink>,
}

impl PredictionLogger {
    pub fn new(sink: Arc<dyn PredictionSink>) -> Self {
        Self { sink }
    }

    /// Logger writing to an append-only file
    pub fn to_file<P: AsRef<Path>>(path: P) -> Self {
        Self::new(Arc::new(FileSink::new(path)))
    }

    pub fn log(
        &self,
        input: &LoanApplication,
        probability: f64,
        decision: u8,
        label: RiskLabel,
        version: &str,
    ) {
        let line = format_entry(
            Local::now(),
            &input.to_log_string(),
            probability,
            decision,
            label,
            version,
        );

        match self.sink.append(&line) {
            Ok(()) => debug!(probability, decision, label = %label, "Prediction logged"),
            Err(e) => warn!(error = %e, "Failed to write prediction log entry"),
        }
    }

    pub fn log_result(&self, input: &LoanApplication, result: &ScoreResult) {
        self.log(
            input,
            result.probability,
            result.decision,
            result.label,
            &result.model_version,
        );
    }
}
