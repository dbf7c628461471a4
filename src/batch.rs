//! Whole-table batch scoring of loan application CSV files.
//!
//! Every row must deserialize; the first bad row aborts the run before
//! anything is written.

use crate::config::AppConfig;
use crate::error::Result;
use crate::pipeline::ScoringPipeline;
use crate::types::{LoanApplication, ScoreResult};
use csv::StringRecord;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Columns appended to every output row
pub const PROBABILITY_COLUMN: &str = "default_probability";
pub const PREDICTION_COLUMN: &str = "prediction";

/// Outcome of one batch run
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub rows: usize,
    pub positives: usize,
    pub output_path: PathBuf,
}

/// Input table held in memory: original cells plus parsed applications
#[derive(Debug, Clone)]
pub struct LoanTable {
    headers: StringRecord,
    records: Vec<StringRecord>,
    loans: Vec<LoanApplication>,
}

impl LoanTable {
    /// Parse a CSV with a header row
    pub fn read<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers = reader.headers()?.clone();

        let mut records = Vec::new();
        let mut loans = Vec::new();
        for record in reader.records() {
            let record = record?;
            let loan: LoanApplication = record.deserialize(Some(&headers))?;
            records.push(record);
            loans.push(loan);
        }

        Ok(Self {
            headers,
            records,
            loans,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn loans(&self) -> &[LoanApplication] {
        &self.loans
    }

    /// Write the original columns followed by the score columns.
    ///
    /// Score columns already present in the input are overwritten in place.
    pub fn write_scored<W: Write>(&self, writer: W, results: &[ScoreResult]) -> Result<()> {
        let mut header: Vec<String> = self.headers.iter().map(str::to_string).collect();
        let probability_at = column_position(&mut header, PROBABILITY_COLUMN);
        let prediction_at = column_position(&mut header, PREDICTION_COLUMN);

        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&header)?;

        for (record, result) in self.records.iter().zip(results) {
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(header.len(), String::new());
            row[probability_at] = result.probability.to_string();
            row[prediction_at] = result.decision.to_string();
            writer.write_record(&row)?;
        }

        writer.flush()?;
        Ok(())
    }
}

/// Index of `name` in the header, appending it when absent
fn column_position(header: &mut Vec<String>, name: &str) -> usize {
    match header.iter().position(|h| h == name) {
        Some(position) => position,
        None => {
            header.push(name.to_string());
            header.len() - 1
        }
    }
}

/// Score `input` and write the augmented table to `output`
pub fn score_file(
    pipeline: &ScoringPipeline,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<BatchSummary> {
    let (input, output) = (input.as_ref(), output.as_ref());
    let start = Instant::now();

    let table = LoanTable::read(File::open(input)?)?;
    info!(path = %input.display(), rows = table.len(), "Batch input loaded");

    let results = pipeline.score_batch(table.loans())?;
    table.write_scored(File::create(output)?, &results)?;

    let summary = BatchSummary {
        rows: results.len(),
        positives: results.iter().filter(|r| r.decision == 1).count(),
        output_path: output.to_path_buf(),
    };

    info!(
        rows = summary.rows,
        positives = summary.positives,
        output = %output.display(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Batch scoring complete"
    );

    Ok(summary)
}

/// Load the model and score the configured input file once
pub fn run(config: &AppConfig) -> Result<BatchSummary> {
    let pipeline = ScoringPipeline::load(&config.model)?;
    score_file(&pipeline, &config.batch.input_path, &config.batch.output_path)
}
