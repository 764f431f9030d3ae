//! Chart panel data, computed from a table before any drawing happens.

use crate::analysis::DataAnalyzer;
use crate::error::{AnalysisError, Result};
use crate::utils::{numeric_values, string_values};
use polars::prelude::*;
use serde::Serialize;

/// One named line of `(x, y)` points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineData {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

/// Two columns plotted against row rank after sorting by the first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPanel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub lines: Vec<LineData>,
}

/// One bar per category, in first-appearance order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarPanel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<(String, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramPanel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bins: Vec<HistogramBin>,
}

impl HistogramPanel {
    pub fn total_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterGroup {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// Points of two columns, one overlaid group per category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPanel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub alpha: f64,
    pub groups: Vec<ScatterGroup>,
}

/// Human-readable axis name: "sepal length (cm)" -> "Sepal Length".
pub(crate) fn display_name(column: &str) -> String {
    let base = column.split(" (").next().unwrap_or(column);
    base.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Unit suffix of a column name: "sepal length (cm)" -> " (cm)".
fn unit_suffix(column: &str) -> &str {
    column.find(" (").map(|idx| &column[idx..]).unwrap_or("")
}

pub(crate) fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| AnalysisError::ColumnNotFound(name.to_string()))
}

/// Panel 1: sort by `primary` ascending and plot both columns by rank.
pub(crate) fn trend_panel(df: &DataFrame, primary: &str, secondary: &str) -> Result<TrendPanel> {
    require_column(df, primary)?;
    require_column(df, secondary)?;

    let sorted = df.sort(
        [primary],
        SortMultipleOptions::default()
            .with_maintain_order(true)
            .with_nulls_last(true),
    )?;

    let mut lines = Vec::with_capacity(2);
    for name in [primary, secondary] {
        let values = numeric_values(sorted.column(name)?.as_materialized_series())?;
        let points = values
            .into_iter()
            .enumerate()
            .filter_map(|(rank, v)| v.map(|y| (rank as f64, y)))
            .collect();
        lines.push(LineData {
            name: display_name(name),
            points,
        });
    }

    Ok(TrendPanel {
        title: format!(
            "Trend of {} and {}",
            display_name(primary),
            display_name(secondary)
        ),
        x_label: "Sample Index".to_string(),
        y_label: format!("Value{}", unit_suffix(primary)),
        lines,
    })
}

/// Panel 2: mean of `value_column` per category.
pub(crate) fn bar_panel(df: &DataFrame, value_column: &str, group_column: &str) -> Result<BarPanel> {
    require_column(df, value_column)?;

    let grouped = DataAnalyzer::summarize_by_group(df, group_column)?;
    let bars = grouped
        .groups
        .iter()
        .filter_map(|g| {
            grouped
                .mean(&g.label, value_column)
                .map(|mean| (g.label.clone(), mean))
        })
        .collect();

    Ok(BarPanel {
        title: format!(
            "Average {} by {}",
            display_name(value_column),
            display_name(group_column)
        ),
        x_label: display_name(group_column),
        y_label: format!("Average {}{}", display_name(value_column), unit_suffix(value_column)),
        bars,
    })
}

/// Equal-width binning over the observed range.
///
/// The upper edge is inclusive for the last bin. When every value is equal
/// the range becomes `[value, value + 1]` and all values land in bin 0.
pub(crate) fn histogram_bins(values: &[f64], bin_count: usize) -> Vec<HistogramBin> {
    let bin_count = bin_count.max(1);
    let (min, max) = match min_max(values) {
        Some((min, max)) if min < max => (min, max),
        Some((value, _)) => (value, value + 1.0),
        None => (0.0, 1.0),
    };

    let width = (max - min) / bin_count as f64;
    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| HistogramBin {
            start: min + width * i as f64,
            end: if i + 1 == bin_count {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for &v in values {
        let idx = (((v - min) / width) as usize).min(bin_count - 1);
        bins[idx].count += 1;
    }

    bins
}

/// Panel 3: distribution of one column.
pub(crate) fn histogram_panel(df: &DataFrame, column: &str, bin_count: usize) -> Result<HistogramPanel> {
    let values: Vec<f64> = numeric_values(require_column(df, column)?.as_materialized_series())?
        .into_iter()
        .flatten()
        .collect();

    Ok(HistogramPanel {
        title: format!("Distribution of {}", display_name(column)),
        x_label: format!("{}{}", display_name(column), unit_suffix(column)),
        y_label: "Frequency".to_string(),
        bins: histogram_bins(&values, bin_count),
    })
}

/// Panel 4: `x_column` against `y_column`, one group per category.
pub(crate) fn scatter_panel(
    df: &DataFrame,
    x_column: &str,
    y_column: &str,
    group_column: &str,
    alpha: f64,
) -> Result<ScatterPanel> {
    let xs = numeric_values(require_column(df, x_column)?.as_materialized_series())?;
    let ys = numeric_values(require_column(df, y_column)?.as_materialized_series())?;
    let labels = string_values(require_column(df, group_column)?.as_materialized_series())?;

    let mut groups: Vec<ScatterGroup> = Vec::new();
    for ((x, y), label) in xs.into_iter().zip(ys).zip(labels) {
        let (Some(x), Some(y), Some(label)) = (x, y, label) else {
            continue;
        };
        match groups.iter_mut().find(|g| g.label == label) {
            Some(group) => group.points.push((x, y)),
            None => groups.push(ScatterGroup {
                label,
                points: vec![(x, y)],
            }),
        }
    }

    Ok(ScatterPanel {
        title: format!("{} vs {}", display_name(x_column), display_name(y_column)),
        x_label: format!("{}{}", display_name(x_column), unit_suffix(x_column)),
        y_label: format!("{}{}", display_name(y_column), unit_suffix(y_column)),
        alpha,
        groups,
    })
}

pub(crate) fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().copied().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
