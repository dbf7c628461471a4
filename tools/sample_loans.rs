//! Sample Loan Generator
//!
//! Writes random loan applications to a CSV file for exercising the
//! batch scorer.
//!
//! Usage: sample-loans [output_path] [count] [risky_rate]

use anyhow::Context;
use loan_default_service::LoanApplication;
use rand::rngs::ThreadRng;
use rand::Rng;
use std::fs::File;
use std::path::Path;
use tracing::info;

const TERMS: [&str; 2] = ["36 months", "60 months"];
const EMP_LENGTHS: [&str; 11] = [
    "< 1 year", "1 year", "2 years", "3 years", "4 years", "5 years", "6 years", "7 years",
    "8 years", "9 years", "10+ years",
];
const PURPOSES: [&str; 8] = [
    "debt_consolidation",
    "credit_card",
    "home_improvement",
    "major_purchase",
    "small_business",
    "car",
    "medical",
    "other",
];

/// Random loan application generator
struct LoanGenerator {
    rng: ThreadRng,
}

impl LoanGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }

    /// Generate an application from an established borrower
    fn generate_typical(&mut self) -> LoanApplication {
        let loan_amnt = (self.rng.gen_range(1_000.0..25_000.0_f64) / 25.0).round() * 25.0;

        LoanApplication {
            loan_amnt,
            funded_amnt: loan_amnt,
            term: self.random_choice(&TERMS).to_string(),
            int_rate: round2(self.rng.gen_range(5.5..15.0)),
            emp_length: self.random_choice(&EMP_LENGTHS[2..]).to_string(),
            home_ownership: self.random_choice(&["MORTGAGE", "OWN", "RENT"]).to_string(),
            annual_inc: (self.rng.gen_range(40_000.0..150_000.0_f64) / 100.0).round() * 100.0,
            verification_status: self
                .random_choice(&["Verified", "Source Verified", "Not Verified"])
                .to_string(),
            purpose: self.random_choice(&PURPOSES).to_string(),
            dti: round2(self.rng.gen_range(2.0..20.0)),
            delinq_2yrs: self.rng.gen_range(0..2),
        }
    }

    /// Generate a stretched application: high rate, high DTI, short history
    fn generate_risky(&mut self) -> LoanApplication {
        let loan_amnt = (self.rng.gen_range(15_000.0..35_000.0_f64) / 25.0).round() * 25.0;

        LoanApplication {
            loan_amnt,
            funded_amnt: (loan_amnt * self.rng.gen_range(0.9..1.0) / 25.0).round() * 25.0,
            term: "60 months".to_string(),
            int_rate: round2(self.rng.gen_range(18.0..26.0)),
            emp_length: self.random_choice(&EMP_LENGTHS[..3]).to_string(),
            home_ownership: "RENT".to_string(),
            annual_inc: (self.rng.gen_range(18_000.0..45_000.0_f64) / 100.0).round() * 100.0,
            verification_status: "Not Verified".to_string(),
            purpose: self
                .random_choice(&["small_business", "debt_consolidation", "other"])
                .to_string(),
            dti: round2(self.rng.gen_range(25.0..40.0)),
            delinq_2yrs: self.rng.gen_range(1..6),
        }
    }

    fn random_choice<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sample_loans=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let output = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("batch/input/new_loans.csv");
    let count: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100);
    let risky_rate: f64 = args
        .get(3)
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.2)
        .clamp(0.0, 1.0);

    info!(output = %output, count, risky_rate, "Generating sample loans");

    if let Some(parent) = Path::new(output).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let file = File::create(output).with_context(|| format!("Failed to create {}", output))?;
    let mut writer = csv::Writer::from_writer(file);
    let mut generator = LoanGenerator::new();
    let mut rng = rand::thread_rng();
    let mut risky_count = 0;

    for _ in 0..count {
        let loan = if rng.gen_bool(risky_rate) {
            risky_count += 1;
            generator.generate_risky()
        } else {
            generator.generate_typical()
        };
        writer.serialize(&loan)?;
    }
    writer.flush()?;

    info!(
        "Wrote {} loans to {} ({} typical, {} risky)",
        count,
        output,
        count - risky_count,
        risky_count
    );

    Ok(())
}
