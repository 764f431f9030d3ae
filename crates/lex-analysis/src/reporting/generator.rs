use crate::error::Result;
use crate::types::{
    ExplorationReport, GroupedMeans, ImputedColumn, PipelineResult, SummaryStatistics,
};
use crate::visualization::RenderedFigure;
use chrono::Local;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

// ============================================================================
// Report Types
// ============================================================================

/// Full record of one pipeline run, for stdout (text or `--json`) and files.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Where the data came from (embedded dataset or a CSV path)
    pub input_source: String,
    pub summary: RunSummary,
    pub raw_exploration: ExplorationReport,
    pub cleaned_exploration: ExplorationReport,
    pub imputed: Vec<ImputedColumn>,
    pub processing_steps: Vec<String>,
    pub statistics: SummaryStatistics,
    pub grouped_means: GroupedMeans,
    pub figure: FigureSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Total execution time in milliseconds
    pub duration_ms: u64,
    pub rows: usize,
    pub columns: usize,
    /// Rows that received an injected missing value
    pub injected_rows: Vec<usize>,
    pub missing_before: usize,
    pub missing_after: usize,
}

/// What the figure contains, without the point data.
#[derive(Debug, Clone, Serialize)]
pub struct FigureSummary {
    pub size: (u32, u32),
    pub panels: Vec<String>,
    pub histogram_bins: usize,
    pub histogram_total: usize,
    pub bars: Vec<(String, f64)>,
    pub scatter_groups: Vec<String>,
    /// Set when the figure was drawn to disk
    pub output_path: Option<String>,
}

impl FigureSummary {
    fn from_figure(figure: &RenderedFigure, output_path: Option<&Path>) -> Self {
        Self {
            size: figure.size,
            panels: figure.titles().iter().map(|t| t.to_string()).collect(),
            histogram_bins: figure.histogram.bins.len(),
            histogram_total: figure.histogram.total_count(),
            bars: figure.bars.bars.clone(),
            scatter_groups: figure.scatter.groups.iter().map(|g| g.label.clone()).collect(),
            output_path: output_path.map(|p| p.display().to_string()),
        }
    }
}

// ============================================================================
// Report Generator
// ============================================================================

/// Builds and persists [`AnalysisReport`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReportGenerator;

impl ReportGenerator {
    /// Build a report from pipeline results.
    pub fn build_report(input_source: &str, result: &PipelineResult) -> AnalysisReport {
        let (rows, columns) = result.cleaned_exploration.shape;

        AnalysisReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_source: input_source.to_string(),
            summary: RunSummary {
                duration_ms: result.duration_ms,
                rows,
                columns,
                injected_rows: result.injected_rows.clone(),
                missing_before: result.raw_exploration.total_missing(),
                missing_after: result.cleaned_exploration.total_missing(),
            },
            raw_exploration: result.raw_exploration.clone(),
            cleaned_exploration: result.cleaned_exploration.clone(),
            imputed: result.imputed.clone(),
            processing_steps: result.processing_steps.clone(),
            statistics: result.statistics.clone(),
            grouped_means: result.grouped_means.clone(),
            figure: FigureSummary::from_figure(&result.figure, result.figure_path.as_deref()),
        }
    }

    pub fn to_json(report: &AnalysisReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    /// Write a report to `path` as pretty JSON, creating parent directories.
    pub fn write_report_to_file(report: &AnalysisReport, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = File::create(path)?;
        file.write_all(Self::to_json(report)?.as_bytes())?;

        info!("Report saved: {}", path.display());

        Ok(path.to_path_buf())
    }
}
