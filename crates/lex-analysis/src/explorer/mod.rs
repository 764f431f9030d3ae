//! Read-only exploration of a table.
//!
//! Reports shape, a row preview, per-column types and missing-value counts.
//! The explorer never fails: an empty table yields an empty preview and zero
//! counts.

use crate::types::{ColumnOverview, ExplorationReport};
use crate::utils::{column_kind, count_missing};
use polars::prelude::*;
use tracing::debug;

/// Data explorer for inspecting a table before and after cleaning.
pub struct DataExplorer;

impl DataExplorer {
    /// Build an exploration report over the first `preview_rows` rows.
    pub fn explore(df: &DataFrame, preview_rows: usize) -> ExplorationReport {
        let columns: Vec<ColumnOverview> = df
            .get_columns()
            .iter()
            .map(Self::overview_column)
            .collect();

        let preview_frame = df.head(Some(preview_rows));
        let preview = Self::preview_rows(&preview_frame);

        debug!(
            "Explored table {:?}: {} missing cells",
            df.shape(),
            columns.iter().map(|c| c.missing_count).sum::<usize>()
        );

        ExplorationReport {
            shape: df.shape(),
            columns,
            preview,
            preview_frame,
        }
    }

    fn overview_column(column: &Column) -> ColumnOverview {
        let series = column.as_materialized_series();
        let missing_count = count_missing(series);

        ColumnOverview {
            name: column.name().to_string(),
            dtype: column.dtype().to_string(),
            kind: column_kind(column.dtype()),
            non_null_count: series.len() - missing_count,
            missing_count,
        }
    }

    fn preview_rows(preview: &DataFrame) -> Vec<Vec<String>> {
        (0..preview.height())
            .map(|row| {
                preview
                    .get_columns()
                    .iter()
                    .map(|col| col.get(row).map(format_cell).unwrap_or_default())
                    .collect()
            })
            .collect()
    }
}

/// Render a cell for the text preview; strings lose their debug quotes.
fn format_cell(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => "null".to_string(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Float64(v) if v.is_nan() => "NaN".to_string(),
        other => other.to_string(),
    }
}
