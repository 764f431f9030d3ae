//! Descriptive statistics for numeric columns.

use crate::types::ColumnStatistics;
use crate::utils::{mean, quantile_linear};

/// Describe the present values of one column.
///
/// `count` is the number of values; every other field is `None` when there
/// are none. `std` needs at least two values.
pub(crate) fn describe_values(column: &str, values: &[f64]) -> ColumnStatistics {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    ColumnStatistics {
        column: column.to_string(),
        count: sorted.len(),
        mean: mean(&sorted),
        std: calculate_std(&sorted),
        min: sorted.first().copied(),
        q25: quantile_linear(&sorted, 0.25),
        median: quantile_linear(&sorted, 0.5),
        q75: quantile_linear(&sorted, 0.75),
        max: sorted.last().copied(),
    }
}

/// Sample standard deviation (n - 1 denominator).
pub(crate) fn calculate_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let mean = mean(values)?;
    let variance: f64 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
        / (values.len() as f64 - 1.0);

    Some(variance.sqrt())
}
