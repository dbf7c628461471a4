//! Loan application record as submitted by callers and batch files

use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric fields, in the order they lead the encoded feature table
pub const NUMERIC_FIELDS: [&str; 6] = [
    "loan_amnt",
    "funded_amnt",
    "int_rate",
    "annual_inc",
    "dti",
    "delinq_2yrs",
];

/// Categorical fields, in the order their dummy columns are generated
pub const CATEGORICAL_FIELDS: [&str; 5] = [
    "term",
    "emp_length",
    "home_ownership",
    "verification_status",
    "purpose",
];

/// A raw loan application before encoding.
///
/// Field names match the training data columns, so the same struct
/// deserializes both the JSON request body and a batch CSV row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    /// Requested loan amount
    pub loan_amnt: f64,

    /// Amount committed to the loan
    pub funded_amnt: f64,

    /// Loan term, e.g. "36 months"
    pub term: String,

    /// Interest rate in percent
    pub int_rate: f64,

    /// Employment length, e.g. "< 1 year", "10+ years"
    pub emp_length: String,

    /// RENT, OWN, MORTGAGE, ...
    pub home_ownership: String,

    /// Self-reported annual income
    pub annual_inc: f64,

    /// Income verification status
    pub verification_status: String,

    /// Stated loan purpose
    pub purpose: String,

    /// Debt-to-income ratio
    pub dti: f64,

    /// Delinquencies in the past two years
    #[serde(deserialize_with = "deserialize_whole_number")]
    pub delinq_2yrs: i64,
}

/// Accept an integer or a float with no fractional part (`0.0`, `"2.0"`).
///
/// CSV exports often write count columns as floats; `1.5` is still rejected.
fn deserialize_whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct WholeNumber;

    impl<'de> Visitor<'de> for WholeNumber {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a whole number")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            i64::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
            // 2^63 is exactly representable, so the upper bound is exclusive
            if v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
                Ok(v as i64)
            } else {
                Err(E::invalid_value(Unexpected::Float(v), &self))
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
            let trimmed = v.trim();
            if let Ok(n) = trimmed.parse::<i64>() {
                return Ok(n);
            }
            match trimmed.parse::<f64>() {
                Ok(f) => self.visit_f64(f),
                Err(_) => Err(E::invalid_value(Unexpected::Str(v), &self)),
            }
        }
    }

    deserializer.deserialize_any(WholeNumber)
}

impl LoanApplication {
    /// Numeric fields paired with their column names
    pub fn numeric_features(&self) -> [(&'static str, f64); 6] {
        [
            ("loan_amnt", self.loan_amnt),
            ("funded_amnt", self.funded_amnt),
            ("int_rate", self.int_rate),
            ("annual_inc", self.annual_inc),
            ("dti", self.dti),
            ("delinq_2yrs", self.delinq_2yrs as f64),
        ]
    }

    /// Categorical fields paired with their column names
    pub fn categorical_features(&self) -> [(&'static str, &str); 5] {
        [
            ("term", self.term.as_str()),
            ("emp_length", self.emp_length.as_str()),
            ("home_ownership", self.home_ownership.as_str()),
            ("verification_status", self.verification_status.as_str()),
            ("purpose", self.purpose.as_str()),
        ]
    }

    /// Compact JSON rendering used in the prediction audit log
    pub fn to_log_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }

    #[cfg(test)]
    pub(crate) fn example() -> Self {
        Self {
            loan_amnt: 10000.0,
            funded_amnt: 10000.0,
            term: "36 months".to_string(),
            int_rate: 12.5,
            emp_length: "5 years".to_string(),
            home_ownership: "RENT".to_string(),
            annual_inc: 55000.0,
            verification_status: "Verified".to_string(),
            purpose: "debt_consolidation".to_string(),
            dti: 18.2,
            delinq_2yrs: 0,
        }
    }
}
