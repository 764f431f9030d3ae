//! Descriptive analysis of a cleaned table.
//!
//! - Overall statistics per numeric column (count, mean, std, quartiles)
//! - Column means partitioned by a categorical column

mod grouped;
mod statistics;

use crate::error::Result;
use crate::types::{GroupedMeans, SummaryStatistics};
use crate::utils::{numeric_column_names, present_values};
use polars::prelude::*;
use tracing::debug;

pub(crate) use statistics::describe_values;

/// Analyzer computing summary statistics.
pub struct DataAnalyzer;

impl DataAnalyzer {
    /// Describe every numeric column.
    ///
    /// Missing cells are excluded from all statistics. On an empty table each
    /// column reports `count == 0` and undefined values.
    pub fn summarize(df: &DataFrame) -> Result<SummaryStatistics> {
        let mut columns = Vec::new();

        for name in numeric_column_names(df) {
            let values = present_values(df.column(&name)?.as_materialized_series())?;
            let stats = describe_values(&name, &values);
            debug!("'{}': count={}, mean={:?}", name, stats.count, stats.mean);
            columns.push(stats);
        }

        Ok(SummaryStatistics { columns })
    }

    /// Mean of every numeric column per label of `group_column`.
    ///
    /// Only labels present in the data get an entry.
    pub fn summarize_by_group(df: &DataFrame, group_column: &str) -> Result<GroupedMeans> {
        grouped::group_means(df, group_column)
    }
}
