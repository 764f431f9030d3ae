//! Statistical imputation methods.
//!
//! Missing numeric cells are filled with the column mean over the present
//! values.

use crate::error::{AnalysisError, Result};
use crate::types::ImputedColumn;
use crate::utils::{fill_numeric_nulls, mean, numeric_values};
use polars::prelude::*;
use tracing::debug;

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Apply mean imputation to one numeric column of `df` in place.
    ///
    /// Returns `None` when the column has nothing to fill. A non-empty column
    /// without a single present value has no mean and is rejected with
    /// [`AnalysisError::NoValidValues`].
    pub fn apply_numeric_mean(
        df: &mut DataFrame,
        col_name: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<Option<ImputedColumn>> {
        let series = df
            .column(col_name)
            .map_err(|_| AnalysisError::ColumnNotFound(col_name.to_string()))?
            .as_materialized_series()
            .clone();

        let values = numeric_values(&series)?;
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let missing = values.len() - present.len();

        if missing == 0 {
            return Ok(None);
        }

        let mean_val =
            mean(&present).ok_or_else(|| AnalysisError::NoValidValues(col_name.to_string()))?;

        Self::fill_with_value(df, col_name, mean_val, &series, processing_steps, "mean")?;

        Ok(Some(ImputedColumn {
            column: col_name.to_string(),
            filled: missing,
            mean: mean_val,
        }))
    }

    /// Fill numeric column with a specific value.
    fn fill_with_value(
        df: &mut DataFrame,
        col_name: &str,
        fill_value: f64,
        series: &Series,
        processing_steps: &mut Vec<String>,
        method: &str,
    ) -> Result<()> {
        let result = fill_numeric_nulls(series, fill_value)?;
        df.replace(col_name, result)?;

        debug!("Filled '{}' with {} {}", col_name, method, fill_value);
        processing_steps.push(format!(
            "Filled '{}' with {}: {:.2}",
            col_name, method, fill_value
        ));

        Ok(())
    }
}
