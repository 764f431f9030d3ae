//! Configuration types for the analysis pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Column that receives the synthetic missing values by default.
pub const DEFAULT_MISSING_COLUMN: &str = "sepal length (cm)";

/// Secondary numeric column plotted against the primary one.
pub const DEFAULT_SECONDARY_COLUMN: &str = "petal length (cm)";

/// Categorical label column of the reference dataset.
pub const DEFAULT_LABEL_COLUMN: &str = "species";

/// How row positions are drawn when injecting missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MissingSampling {
    /// Draw distinct rows, so exactly `missing_count` cells become missing.
    #[default]
    WithoutReplacement,
    /// Draw rows independently; duplicate draws collapse into one missing cell.
    WithReplacement,
}

/// Layout of the four-panel figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureSpec {
    /// Column sorted and plotted on panels 1-4 (x axis of the scatter).
    pub primary_column: String,
    /// Column overlaid on the trend panel and used as scatter y axis.
    pub secondary_column: String,
    /// Categorical column used for grouping.
    pub group_column: String,
    /// Number of equal-width histogram bins.
    pub histogram_bins: usize,
    /// Opacity of scatter points.
    pub scatter_alpha: f64,
    /// Figure size in pixels (width, height).
    pub size: (u32, u32),
}

impl Default for FigureSpec {
    fn default() -> Self {
        Self {
            primary_column: DEFAULT_MISSING_COLUMN.to_string(),
            secondary_column: DEFAULT_SECONDARY_COLUMN.to_string(),
            group_column: DEFAULT_LABEL_COLUMN.to_string(),
            histogram_bins: 20,
            scatter_alpha: 0.6,
            size: (2000, 1500),
        }
    }
}

/// Configuration for the analysis pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use lex_analysis::config::{PipelineConfig, MissingSampling};
///
/// let config = PipelineConfig::builder()
///     .missing_count(5)
///     .sampling(MissingSampling::WithReplacement)
///     .seed(7)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of missing cells to inject after loading.
    /// Default: 5
    pub missing_count: usize,

    /// Numeric column receiving the missing cells.
    /// Default: "sepal length (cm)"
    pub missing_column: String,

    /// Row sampling mode for injection.
    /// Default: WithoutReplacement
    pub sampling: MissingSampling,

    /// Seed for the injection RNG. `None` draws from entropy.
    /// Default: None
    pub seed: Option<u64>,

    /// Number of rows shown in the exploration preview.
    /// Default: 5
    pub preview_rows: usize,

    /// Figure layout.
    pub figure: FigureSpec,

    /// Where to draw the figure (PNG or SVG by extension).
    /// If None, the figure is built but not drawn.
    /// Default: None
    pub figure_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            missing_count: 5,
            missing_column: DEFAULT_MISSING_COLUMN.to_string(),
            sampling: MissingSampling::default(),
            seed: None,
            preview_rows: 5,
            figure: FigureSpec::default(),
            figure_path: None,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.missing_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyColumnName("missing_column".to_string()));
        }

        for (field, value) in [
            ("figure.primary_column", &self.figure.primary_column),
            ("figure.secondary_column", &self.figure.secondary_column),
            ("figure.group_column", &self.figure.group_column),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigValidationError::EmptyColumnName(field.to_string()));
            }
        }

        if self.preview_rows == 0 {
            return Err(ConfigValidationError::InvalidPreviewRows(self.preview_rows));
        }

        if self.figure.histogram_bins == 0 {
            return Err(ConfigValidationError::InvalidHistogramBins(
                self.figure.histogram_bins,
            ));
        }

        if !(0.0..=1.0).contains(&self.figure.scatter_alpha) {
            return Err(ConfigValidationError::InvalidAlpha(self.figure.scatter_alpha));
        }

        let (width, height) = self.figure.size;
        if width == 0 || height == 0 {
            return Err(ConfigValidationError::InvalidFigureSize { width, height });
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Column name for '{0}' must not be empty")]
    EmptyColumnName(String),

    #[error("Invalid preview rows: {0} (must be at least 1)")]
    InvalidPreviewRows(usize),

    #[error("Invalid histogram bins: {0} (must be at least 1)")]
    InvalidHistogramBins(usize),

    #[error("Invalid scatter alpha: {0} (must be between 0.0 and 1.0)")]
    InvalidAlpha(f64),

    #[error("Invalid figure size: {width}x{height}")]
    InvalidFigureSize { width: u32, height: u32 },
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    missing_count: Option<usize>,
    missing_column: Option<String>,
    sampling: Option<MissingSampling>,
    seed: Option<u64>,
    preview_rows: Option<usize>,
    figure: Option<FigureSpec>,
    figure_path: Option<PathBuf>,
}

impl PipelineConfigBuilder {
    /// Set the number of missing cells to inject.
    ///
    /// Zero disables injection.
    pub fn missing_count(mut self, count: usize) -> Self {
        self.missing_count = Some(count);
        self
    }

    /// Set the numeric column receiving missing cells.
    pub fn missing_column(mut self, column: impl Into<String>) -> Self {
        self.missing_column = Some(column.into());
        self
    }

    /// Set the row sampling mode for injection.
    pub fn sampling(mut self, sampling: MissingSampling) -> Self {
        self.sampling = Some(sampling);
        self
    }

    /// Seed the injection RNG for reproducible runs.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the number of preview rows in the exploration report.
    pub fn preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = Some(rows);
        self
    }

    /// Replace the figure layout.
    pub fn figure(mut self, figure: FigureSpec) -> Self {
        self.figure = Some(figure);
        self
    }

    /// Draw the figure to this path once the pipeline finishes.
    pub fn figure_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.figure_path = Some(path.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let config = PipelineConfig {
            missing_count: self.missing_count.unwrap_or(5),
            missing_column: self
                .missing_column
                .unwrap_or_else(|| DEFAULT_MISSING_COLUMN.to_string()),
            sampling: self.sampling.unwrap_or_default(),
            seed: self.seed,
            preview_rows: self.preview_rows.unwrap_or(5),
            figure: self.figure.unwrap_or_default(),
            figure_path: self.figure_path,
        };

        config.validate()?;
        Ok(config)
    }
}
