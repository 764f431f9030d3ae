//! Per-category means via a stable polars group-by.

use crate::error::{AnalysisError, Result};
use crate::types::{GroupMeans, GroupedMeans};
use crate::utils::{get_dtype_category, numeric_column_names, DtypeCategory};
use polars::prelude::*;

const ROW_COUNT_ALIAS: &str = "__group_rows";

/// Mean of every numeric column per distinct value of `group_column`.
///
/// Groups keep first-appearance order. Rows with a null label are ignored,
/// NaN cells count as missing, and a group whose values are all missing gets
/// no mean for that column.
pub(crate) fn group_means(df: &DataFrame, group_column: &str) -> Result<GroupedMeans> {
    let key = df
        .column(group_column)
        .map_err(|_| AnalysisError::ColumnNotFound(group_column.to_string()))?;

    if get_dtype_category(key.dtype()) != DtypeCategory::String {
        return Err(AnalysisError::InvalidConfig(format!(
            "group column '{}' must be categorical, found {}",
            group_column,
            key.dtype()
        )));
    }

    let columns: Vec<String> = numeric_column_names(df)
        .into_iter()
        .filter(|name| name != group_column)
        .collect();

    let mut result = GroupedMeans {
        group_column: group_column.to_string(),
        columns: columns.clone(),
        groups: Vec::new(),
    };

    if df.height() == 0 {
        return Ok(result);
    }

    let mut aggs: Vec<Expr> = columns
        .iter()
        .map(|name| {
            col(name.as_str())
                .cast(DataType::Float64)
                .fill_nan(lit(NULL))
                .mean()
        })
        .collect();
    aggs.push(len().alias(ROW_COUNT_ALIAS));

    let grouped = df
        .clone()
        .lazy()
        .filter(col(group_column).is_not_null())
        .group_by_stable([col(group_column)])
        .agg(aggs)
        .collect()?;

    let labels = grouped
        .column(group_column)?
        .cast(&DataType::String)?
        .as_materialized_series()
        .str()?
        .clone();
    let row_counts = grouped
        .column(ROW_COUNT_ALIAS)?
        .cast(&DataType::UInt64)?
        .as_materialized_series()
        .u64()?
        .clone();

    let mut mean_columns = Vec::with_capacity(columns.len());
    for name in &columns {
        let means = grouped
            .column(name)?
            .cast(&DataType::Float64)?
            .as_materialized_series()
            .f64()?
            .clone();
        mean_columns.push((name.clone(), means));
    }

    for row in 0..grouped.height() {
        let Some(label) = labels.get(row) else {
            continue;
        };

        let means = mean_columns
            .iter()
            .filter_map(|(name, values)| values.get(row).map(|m| (name.clone(), m)))
            .collect();

        result.groups.push(GroupMeans {
            label: label.to_string(),
            row_count: row_counts.get(row).unwrap_or(0) as usize,
            means,
        });
    }

    Ok(result)
}
