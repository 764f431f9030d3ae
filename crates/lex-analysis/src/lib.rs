//! Exploratory Data Analysis Library
//!
//! A small, end-to-end analysis workflow built on Polars: load a labeled table,
//! inject synthetic missing values, clean them by mean imputation, summarize the
//! result and build a four-panel figure.
//!
//! # Overview
//!
//! - **Dataset Loading**: Embedded Iris dataset (or a CSV of the same layout)
//!   with class codes mapped to a categorical label column
//! - **Missing Value Injection**: Seeded, bounded injection into one numeric column
//! - **Exploration**: Shape, preview rows, column kinds and missing counts
//! - **Cleaning**: Per-column mean imputation on an independent copy
//! - **Statistics**: Descriptive statistics and per-category means
//! - **Visualization**: Trend, grouped bar, histogram and scatter panels, drawn
//!   to PNG or SVG with plotters
//! - **Progress Reporting**: Stage updates through a callback or trait object
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_analysis::{Pipeline, PipelineConfig, ReportGenerator};
//!
//! let config = PipelineConfig::builder()
//!     .missing_count(5)
//!     .seed(42)
//!     .figure_path("figure.png")
//!     .build()?;
//!
//! let result = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//!
//! let report = ReportGenerator::build_report("embedded iris", &result);
//! println!("{}", ReportGenerator::to_json(&report)?);
//! ```
//!
//! # Working on an existing table
//!
//! ```rust,ignore
//! use lex_analysis::{DatasetLoader, Pipeline};
//! use polars::prelude::*;
//!
//! let df = df![
//!     "value" => [Some(1.0), None, Some(3.0)],
//!     "label" => ["a", "b", "a"],
//! ]?;
//! let dataset = DatasetLoader::from_frame(df, "label")?;
//! let result = Pipeline::builder().build()?.process(dataset)?;
//! ```

pub mod analysis;
pub mod cleaner;
pub mod config;
pub mod dataset;
pub mod error;
pub mod explorer;
pub mod imputers;
pub mod pipeline;
pub mod reporting;
pub mod types;
pub mod utils;
pub mod visualization;

// Re-exports for convenient access
pub use analysis::DataAnalyzer;
pub use cleaner::DataCleaner;
pub use config::{
    ConfigValidationError, FigureSpec, MissingSampling, PipelineConfig, PipelineConfigBuilder,
};
pub use dataset::{DataSource, Dataset, DatasetLoader, MissingValueInjector};
pub use error::{AnalysisError, Result as AnalysisResult, ResultExt};
pub use explorer::DataExplorer;
pub use imputers::StatisticalImputer;
pub use pipeline::{
    AnalysisStage, ClosureProgressReporter, Pipeline, PipelineBuilder, ProgressReporter,
    ProgressUpdate,
};
pub use reporting::{AnalysisReport, ReportGenerator, render_text};
pub use types::{
    CleaningOutcome, ColumnKind, ColumnOverview, ColumnStatistics, ExplorationReport, GroupMeans,
    GroupedMeans, ImputedColumn, PipelineResult, SummaryStatistics,
};
pub use utils::{DtypeCategory, count_missing, get_dtype_category, is_numeric_dtype};
pub use visualization::{FigureBuilder, FigureFormat, RenderedFigure};
