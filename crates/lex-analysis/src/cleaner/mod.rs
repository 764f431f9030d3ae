//! Data cleaning module.
//!
//! Cleaning works on a copy: every numeric column with missing cells has them
//! replaced by the column mean, categorical columns pass through unchanged.
//! The caller's table is never touched.

use crate::error::Result;
use crate::imputers::StatisticalImputer;
use crate::types::CleaningOutcome;
use crate::utils::numeric_column_names;
use polars::prelude::*;
use tracing::{debug, info};

/// Data cleaner for mean imputation of numeric columns.
pub struct DataCleaner;

impl DataCleaner {
    /// Clean `df` into a new, independent table.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AnalysisError::NoValidValues`] if a non-empty numeric
    /// column holds no value at all, since its mean is undefined.
    pub fn clean(df: &DataFrame) -> Result<CleaningOutcome> {
        info!("Cleaning data: mean imputation of numeric columns...");

        let mut data = df.clone();
        let mut imputed = Vec::new();
        let mut steps = Vec::new();

        for col_name in numeric_column_names(df) {
            match StatisticalImputer::apply_numeric_mean(&mut data, &col_name, &mut steps)? {
                Some(record) => imputed.push(record),
                None => debug!("'{}' has no missing values", col_name),
            }
        }

        if imputed.is_empty() {
            steps.push("No missing numeric values found".to_string());
        }

        info!(
            "Cleaning complete: {} columns imputed, {} cells filled",
            imputed.len(),
            imputed.iter().map(|c| c.filled).sum::<usize>()
        );

        Ok(CleaningOutcome {
            data,
            imputed,
            steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::utils::count_missing;

    fn numeric_missing(df: &DataFrame) -> usize {
        numeric_column_names(df)
            .iter()
            .map(|name| count_missing(df.column(name).unwrap().as_materialized_series()))
            .sum()
    }

    #[test]
    fn test_clean_fills_with_mean() {
        let df = df![
            "a" => [Some(1.0), None, Some(3.0)],
            "label" => ["x", "y", "x"],
        ]
        .unwrap();

        let outcome = DataCleaner::clean(&df).unwrap();
        let a = outcome.data.column("a").unwrap();

        assert_eq!(a.get(1).unwrap().try_extract::<f64>().unwrap(), 2.0);
        assert_eq!(numeric_missing(&outcome.data), 0);
        assert_eq!(outcome.imputed.len(), 1);
        assert_eq!(outcome.imputed[0].column, "a");
    }

    #[test]
    fn test_clean_leaves_input_untouched() {
        let df = df![
            "a" => [Some(1.0), None, Some(3.0)],
        ]
        .unwrap();
        let before = df.clone();

        let _ = DataCleaner::clean(&df).unwrap();

        assert!(df.equals_missing(&before));
        assert_eq!(df.column("a").unwrap().null_count(), 1);
    }

    #[test]
    fn test_clean_is_idempotent_on_clean_table() {
        let df = df![
            "a" => [1.0, 2.0, 3.0],
            "b" => [4.0, 5.0, 6.0],
            "label" => ["x", "y", "z"],
        ]
        .unwrap();

        let outcome = DataCleaner::clean(&df).unwrap();

        assert!(outcome.data.equals(&df));
        assert!(outcome.imputed.is_empty());
    }

    #[test]
    fn test_clean_categorical_passthrough() {
        let df = df![
            "a" => [Some(1.0), None],
            "label" => ["x", "y"],
        ]
        .unwrap();

        let outcome = DataCleaner::clean(&df).unwrap();
        let cleaned = outcome.data.column("label").unwrap().as_materialized_series();
        let original = df.column("label").unwrap().as_materialized_series();
        assert!(cleaned.equals(original));
    }

    #[test]
    fn test_clean_each_column_uses_own_mean() {
        let df = df![
            "a" => [Some(2.0), None, Some(4.0)],
            "b" => [None, Some(10.0), Some(30.0)],
        ]
        .unwrap();

        let outcome = DataCleaner::clean(&df).unwrap();
        let a = outcome.data.column("a").unwrap();
        let b = outcome.data.column("b").unwrap();

        assert_eq!(a.get(1).unwrap().try_extract::<f64>().unwrap(), 3.0);
        assert_eq!(b.get(0).unwrap().try_extract::<f64>().unwrap(), 20.0);
    }

    #[test]
    fn test_clean_all_missing_column_is_fatal() {
        let df = df![
            "a" => [1.0, 2.0],
            "empty" => [Option::<f64>::None, None],
        ]
        .unwrap();

        let err = DataCleaner::clean(&df).unwrap_err();
        assert!(matches!(err, AnalysisError::NoValidValues(ref c) if c == "empty"));
    }

    #[test]
    fn test_clean_empty_table() {
        let df = df!["a" => Vec::<f64>::new()].unwrap();
        let outcome = DataCleaner::clean(&df).unwrap();
        assert_eq!(outcome.data.height(), 0);
        assert!(outcome.imputed.is_empty());
    }
}
