//! Dataset loading.
//!
//! The reference source is the Iris flower dataset, embedded at compile time
//! as CSV: four numeric measurements plus an integer class code. Class codes
//! are mapped through [`TARGET_NAMES`] into a categorical label column.

mod injection;

pub use injection::MissingValueInjector;

use crate::config::{DEFAULT_LABEL_COLUMN, PipelineConfig};
use crate::error::{AnalysisError, Result};
use crate::utils::{get_dtype_category, is_numeric_dtype, labels_in_order, DtypeCategory};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const IRIS_CSV: &str = include_str!("../../data/iris.csv");

/// Column holding the integer class codes in the raw source.
pub const TARGET_CODE_COLUMN: &str = "target";

/// Label lookup for the class codes, indexed by code.
pub const TARGET_NAMES: [&str; 3] = ["setosa", "versicolor", "virginica"];

/// Number of rows in the reference dataset.
pub const IRIS_ROW_COUNT: usize = 150;

/// Where the loader reads its table from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// The embedded Iris dataset.
    EmbeddedIris,
    /// A CSV file with the same layout (numeric features plus either a
    /// `target` code column or a string label column).
    CsvFile(PathBuf),
}

/// A labeled table ready for exploration.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub data: DataFrame,
    pub label_column: String,
    /// Label set known at load time, in first-appearance order.
    pub labels: Vec<String>,
    /// Column that received injected missing values, if any were injected.
    pub missing_column: Option<String>,
    /// Rows whose designated cell was made missing, sorted.
    pub injected_rows: Vec<usize>,
}

impl Dataset {
    pub fn height(&self) -> usize {
        self.data.height()
    }
}

/// Loads the source table and injects synthetic missing values.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    source: DataSource,
    injector: MissingValueInjector,
}

impl DatasetLoader {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            source: DataSource::EmbeddedIris,
            injector: MissingValueInjector::from_config(config),
        }
    }

    /// Loader reading a CSV file of the same layout as the embedded dataset.
    pub fn from_csv_path(config: &PipelineConfig, path: impl Into<PathBuf>) -> Self {
        Self::new(config).with_source(DataSource::CsvFile(path.into()))
    }

    pub fn with_source(mut self, source: DataSource) -> Self {
        self.source = source;
        self
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Read the source and inject missing values.
    ///
    /// Any failure to obtain the table is reported as
    /// [`AnalysisError::DataUnavailable`].
    pub fn load(&self) -> Result<Dataset> {
        let data = self.read_source().map_err(|e| {
            debug!("Source read failed: {}", e);
            match e {
                AnalysisError::DataUnavailable(_) => e,
                other => AnalysisError::DataUnavailable(other.to_string()),
            }
        })?;

        let mut dataset = Self::from_frame(data, DEFAULT_LABEL_COLUMN)?;
        let (data, rows) = self.injector.inject(&dataset.data)?;
        dataset.data = data;
        if !rows.is_empty() {
            dataset.missing_column = Some(self.injector.column().to_string());
        }
        dataset.injected_rows = rows;

        info!(
            "Dataset loaded: {:?}, {} missing values injected into '{}'",
            dataset.data.shape(),
            dataset.injected_rows.len(),
            self.injector.column()
        );

        Ok(dataset)
    }

    /// Read the labeled table without injecting anything.
    pub fn read_source(&self) -> Result<DataFrame> {
        let raw = match &self.source {
            DataSource::EmbeddedIris => {
                debug!("Reading embedded Iris dataset");
                CsvReadOptions::default()
                    .with_has_header(true)
                    .into_reader_with_file_handle(Cursor::new(IRIS_CSV.as_bytes()))
                    .finish()
                    .map_err(|e| AnalysisError::DataUnavailable(e.to_string()))?
            }
            DataSource::CsvFile(path) => read_csv_file(path)?,
        };

        attach_labels(raw)
    }

    /// Wrap an existing table, taking its label set from `label_column`.
    ///
    /// No missing values are injected.
    pub fn from_frame(data: DataFrame, label_column: &str) -> Result<Dataset> {
        let labels = {
            let column = data
                .column(label_column)
                .map_err(|_| AnalysisError::ColumnNotFound(label_column.to_string()))?;

            if get_dtype_category(column.dtype()) != DtypeCategory::String {
                return Err(AnalysisError::InvalidConfig(format!(
                    "label column '{}' must be categorical, found {}",
                    label_column,
                    column.dtype()
                )));
            }
            labels_in_order(column.as_materialized_series())?
        };

        Ok(Dataset {
            data,
            label_column: label_column.to_string(),
            labels,
            missing_column: None,
            injected_rows: Vec::new(),
        })
    }
}

fn read_csv_file(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(AnalysisError::DataUnavailable(format!(
            "input file not found: {}",
            path.display()
        )));
    }

    CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| AnalysisError::DataUnavailable(format!("{}: {}", path.display(), e)))
}

/// Replace the integer `target` codes with a string label column.
///
/// Tables that already carry the label column pass through with their
/// numeric columns cast to `Float64`.
fn attach_labels(mut df: DataFrame) -> Result<DataFrame> {
    let numeric: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|c| c.name().as_str() != TARGET_CODE_COLUMN && is_numeric_dtype(c.dtype()))
        .map(|c| c.name().to_string())
        .collect();

    for name in &numeric {
        let cast = df.column(name)?.cast(&DataType::Float64)?;
        df.replace(name, cast.take_materialized_series())?;
    }

    if df.column(DEFAULT_LABEL_COLUMN).is_ok() {
        return Ok(df);
    }

    let codes = df
        .column(TARGET_CODE_COLUMN)
        .map_err(|_| {
            AnalysisError::DataUnavailable(format!(
                "source has neither '{}' nor '{}' column",
                DEFAULT_LABEL_COLUMN, TARGET_CODE_COLUMN
            ))
        })?
        .cast(&DataType::Int64)?;

    let labels = codes
        .as_materialized_series()
        .i64()?
        .into_iter()
        .enumerate()
        .map(|(row, code)| {
            code.and_then(|c| usize::try_from(c).ok())
                .and_then(|c| TARGET_NAMES.get(c).copied())
                .ok_or_else(|| {
                    AnalysisError::DataUnavailable(format!(
                        "row {}: unknown class code {:?}",
                        row, code
                    ))
                })
        })
        .collect::<Result<Vec<&str>>>()?;

    let mut labeled = df.drop(TARGET_CODE_COLUMN)?;
    labeled.with_column(Series::new(DEFAULT_LABEL_COLUMN.into(), labels))?;
    Ok(labeled)
}
