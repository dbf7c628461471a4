//! Feature alignment for loan default model inference.
//!
//! Loan applications are one-hot encoded and then reindexed against the
//! exact column list the model was trained on. Each categorical value
//! becomes a `{field}_{category}` dummy column. The baseline category
//! dropped at training time has no trained column, so it (like any value
//! never seen in training) ends up as all zeros after reindexing.

use crate::error::{Result, ServiceError};
use crate::types::loan::LoanApplication;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Ordered substitutions applied to generated column names.
///
/// Categorical values such as "< 1 year" or "10+ years" contain characters
/// that were rewritten when the training columns were named. Each rule is
/// applied once, in order, to the whole name.
pub const COLUMN_NAME_SUBSTITUTIONS: [(&str, &str); 4] = [
    ("<", "less than"),
    ("+", "plus"),
    (" ", "_"),
    ("__", "_"),
];

/// Rewrite a generated column name to the training naming scheme
pub fn sanitize_column_name(name: &str) -> String {
    COLUMN_NAME_SUBSTITUTIONS
        .iter()
        .fold(name.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Name of the dummy column for a categorical value
pub fn dummy_column_name(field: &str, category: &str) -> String {
    sanitize_column_name(&format!("{}_{}", field, category))
}

/// One-hot encode an application into named columns.
///
/// Numeric fields come first in declaration order, followed by one dummy
/// per categorical field. Columns the model does not know are dropped
/// later by [`FeatureAligner::align`]. That includes the dummy for each
/// field's baseline category, which was dropped at training time and so
/// has no trained column.
pub fn one_hot_encode(loan: &LoanApplication) -> Vec<(String, f64)> {
    let mut columns = Vec::with_capacity(11);

    for (name, value) in loan.numeric_features() {
        columns.push((name.to_string(), value));
    }

    for (field, category) in loan.categorical_features() {
        columns.push((dummy_column_name(field, category), 1.0));
    }

    columns
}

/// The ordered feature names the model was trained on
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedColumns {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl ExpectedColumns {
    /// Build from the trained feature list; rejects empty or duplicated names
    pub fn new(names: Vec<String>) -> Result<Self> {
        if names.is_empty() {
            return Err(ServiceError::ModelLoad(
                "model artifact lists no feature names".to_string(),
            ));
        }

        let mut index = HashMap::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            if index.insert(name.clone(), position).is_some() {
                return Err(ServiceError::ModelLoad(format!(
                    "duplicate feature name `{}` in model artifact",
                    name
                )));
            }
        }

        Ok(Self { names, index })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }
}

/// A numeric row aligned 1:1 with [`ExpectedColumns`]
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRecord {
    columns: Arc<ExpectedColumns>,
    values: Vec<f64>,
}

impl EncodedRecord {
    pub fn columns(&self) -> &[String] {
        self.columns.names()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value of a named column, if the model knows it
    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns.position(name).map(|i| self.values[i])
    }

    /// Column/value pairs in model order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.columns
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Aligns loan applications to the model's trained feature layout
#[derive(Debug, Clone)]
pub struct FeatureAligner {
    expected: Arc<ExpectedColumns>,
}

impl FeatureAligner {
    pub fn new(expected: Arc<ExpectedColumns>) -> Self {
        Self { expected }
    }

    pub fn expected(&self) -> &Arc<ExpectedColumns> {
        &self.expected
    }

    pub fn feature_count(&self) -> usize {
        self.expected.len()
    }

    /// Encode one application and reindex it to the expected columns.
    ///
    /// Expected columns the encoding did not produce are zero; generated
    /// columns the model does not know are discarded.
    pub fn align(&self, loan: &LoanApplication) -> EncodedRecord {
        let mut values = vec![0.0; self.expected.len()];

        for (name, value) in one_hot_encode(loan) {
            match self.expected.position(&name) {
                Some(position) => values[position] = value,
                None => debug!(column = %name, "Column not in trained feature set, dropped"),
            }
        }

        EncodedRecord {
            columns: Arc::clone(&self.expected),
            values,
        }
    }

    /// Align a table of applications, preserving row order
    pub fn align_batch(&self, loans: &[LoanApplication]) -> Vec<EncodedRecord> {
        loans.iter().map(|loan| self.align(loan)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{expected_columns, trained_columns};

    fn aligner() -> FeatureAligner {
        FeatureAligner::new(expected_columns())
    }

    #[test]
    fn test_sanitize_substitution_table() {
        assert_eq!(sanitize_column_name("emp_length_< 1 year"), "emp_length_less_than_1_year");
        assert_eq!(sanitize_column_name("emp_length_10+ years"), "emp_length_10plus_years");
        assert_eq!(sanitize_column_name("term_ 60 months"), "term_60_months");
        assert_eq!(
            sanitize_column_name("verification_status_Source Verified"),
            "verification_status_Source_Verified"
        );
        assert_eq!(sanitize_column_name("loan_amnt"), "loan_amnt");
    }

    #[test]
    fn test_sanitize_collapses_double_underscore_once() {
        // A single non-overlapping pass, so three underscores leave two
        assert_eq!(sanitize_column_name("a___b"), "a__b");
        assert_eq!(sanitize_column_name("a  b"), "a_b");
    }

    #[test]
    fn test_one_hot_encode_names() {
        let encoded = one_hot_encode(&LoanApplication::example());
        let names: Vec<&str> = encoded.iter().map(|(n, _)| n.as_str()).collect();

        assert_eq!(encoded.len(), 11);
        assert_eq!(names[0], "loan_amnt");
        assert!(names.contains(&"term_36_months"));
        assert!(names.contains(&"emp_length_5_years"));
        assert!(names.contains(&"home_ownership_RENT"));
    }

    #[test]
    fn test_align_matches_expected_columns() {
        let aligner = aligner();
        let encoded = aligner.align(&LoanApplication::example());

        assert_eq!(encoded.columns(), trained_columns().as_slice());
        assert_eq!(encoded.values().len(), trained_columns().len());
        assert_eq!(encoded.get("loan_amnt"), Some(10000.0));
        assert_eq!(encoded.get("home_ownership_RENT"), Some(1.0));
        assert_eq!(encoded.get("home_ownership_OWN"), Some(0.0));
        assert_eq!(encoded.get("purpose_debt_consolidation"), Some(1.0));
        // "36 months" is the baseline term: no trained column
        assert_eq!(encoded.get("term_60_months"), Some(0.0));
        assert_eq!(encoded.get("term_36_months"), None);
    }

    #[test]
    fn test_align_is_deterministic() {
        let aligner = aligner();
        let loan = LoanApplication::example();
        assert_eq!(aligner.align(&loan), aligner.align(&loan));
    }

    #[test]
    fn test_unseen_category_zero_fills() {
        let aligner = aligner();
        let mut loan = LoanApplication::example();
        loan.home_ownership = "HOUSEBOAT".to_string();

        let encoded = aligner.align(&loan);
        assert_eq!(encoded.columns(), trained_columns().as_slice());
        for (name, value) in encoded.iter().filter(|(n, _)| n.starts_with("home_ownership_")) {
            assert_eq!(value, 0.0, "{} should be zero", name);
        }
    }

    #[test]
    fn test_sanitized_categories_hit_trained_columns() {
        let aligner = aligner();
        let mut loan = LoanApplication::example();
        loan.emp_length = "< 1 year".to_string();
        loan.term = " 60 months".to_string();

        let encoded = aligner.align(&loan);
        assert_eq!(encoded.get("emp_length_less_than_1_year"), Some(1.0));
        assert_eq!(encoded.get("emp_length_5_years"), Some(0.0));
        assert_eq!(encoded.get("term_60_months"), Some(1.0));
    }

    #[test]
    fn test_align_batch_preserves_order() {
        let aligner = aligner();
        let first = LoanApplication::example();
        let mut second = LoanApplication::example();
        second.loan_amnt = 2500.0;

        let rows = aligner.align_batch(&[first, second]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("loan_amnt"), Some(10000.0));
        assert_eq!(rows[1].get("loan_amnt"), Some(2500.0));
    }

    #[test]
    fn test_expected_columns_rejects_duplicates() {
        let names = vec!["dti".to_string(), "dti".to_string()];
        assert!(matches!(ExpectedColumns::new(names), Err(ServiceError::ModelLoad(_))));
        assert!(ExpectedColumns::new(Vec::new()).is_err());
    }
}
