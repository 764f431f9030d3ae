use crate::visualization::RenderedFigure;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Kind of a column as far as the pipeline is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Other,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOverview {
    pub name: String,
    pub dtype: String,
    pub kind: ColumnKind,
    pub non_null_count: usize,
    pub missing_count: usize,
}

/// Read-only snapshot of a table: shape, preview rows and per-column types.
#[derive(Debug, Clone, Serialize)]
pub struct ExplorationReport {
    pub shape: (usize, usize),
    pub columns: Vec<ColumnOverview>,
    /// Preview rows rendered as strings, one inner vector per row.
    pub preview: Vec<Vec<String>>,
    /// The same preview as a DataFrame, for tabular printing.
    #[serde(skip)]
    pub preview_frame: DataFrame,
}

impl ExplorationReport {
    /// Total missing cells across all columns.
    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|c| c.missing_count).sum()
    }

    /// Missing cell count per column, in table order.
    pub fn missing_by_column(&self) -> Vec<(&str, usize)> {
        self.columns
            .iter()
            .map(|c| (c.name.as_str(), c.missing_count))
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnOverview> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Descriptive statistics for one numeric column.
///
/// Every field except `count` is `None` when the column has no values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub columns: Vec<ColumnStatistics>,
}

impl SummaryStatistics {
    pub fn get(&self, column: &str) -> Option<&ColumnStatistics> {
        self.columns.iter().find(|c| c.column == column)
    }
}

/// Per-column means of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMeans {
    pub label: String,
    pub row_count: usize,
    /// `(column, mean)` pairs, in table order.
    pub means: Vec<(String, f64)>,
}

/// Numeric column means partitioned by a categorical column.
///
/// Groups appear in order of first appearance in the data. Labels that never
/// occur have no entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedMeans {
    pub group_column: String,
    pub columns: Vec<String>,
    pub groups: Vec<GroupMeans>,
}

impl GroupedMeans {
    pub fn labels(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.label.as_str()).collect()
    }

    pub fn group(&self, label: &str) -> Option<&GroupMeans> {
        self.groups.iter().find(|g| g.label == label)
    }

    /// Mean of `column` within the group `label`.
    pub fn mean(&self, label: &str, column: &str) -> Option<f64> {
        self.group(label)?
            .means
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| *value)
    }
}

/// Record of one mean-imputed column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputedColumn {
    pub column: String,
    pub filled: usize,
    pub mean: f64,
}

/// Output of the cleaner: an independent table plus what was changed.
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    pub data: DataFrame,
    pub imputed: Vec<ImputedColumn>,
    pub steps: Vec<String>,
}

/// Everything the pipeline produced in one run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Rows whose designated cell was set to missing after loading.
    pub injected_rows: Vec<usize>,
    pub raw_exploration: ExplorationReport,
    pub cleaned_exploration: ExplorationReport,
    pub cleaned_data: DataFrame,
    pub imputed: Vec<ImputedColumn>,
    pub processing_steps: Vec<String>,
    pub statistics: SummaryStatistics,
    pub grouped_means: GroupedMeans,
    pub figure: RenderedFigure,
    /// Set when the figure was drawn to disk.
    pub figure_path: Option<PathBuf>,
    pub duration_ms: u64,
}
