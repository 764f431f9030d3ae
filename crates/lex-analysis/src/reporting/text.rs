//! Plain-text rendering of an [`AnalysisReport`] for the terminal.

use super::AnalysisReport;
use crate::types::{ExplorationReport, GroupedMeans, SummaryStatistics};
use std::fmt::Write;

const WIDE_RULE: usize = 80;
const RULE: usize = 40;
const UNDEFINED: &str = "-";

/// Undefined statistics (empty or all-missing columns) print as `-`.
fn fmt_value(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.4}", v))
        .unwrap_or_else(|| UNDEFINED.to_string())
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "-".repeat(RULE));
}

/// Render the whole report, section by section.
pub fn render_text(report: &AnalysisReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", "=".repeat(WIDE_RULE));
    let _ = writeln!(out, "DATA ANALYSIS REPORT");
    let _ = writeln!(out, "  Source: {}", report.input_source);
    let _ = writeln!(out, "  Generated: {}", report.generated_at);
    let _ = writeln!(out, "{}", "=".repeat(WIDE_RULE));
    let _ = writeln!(out);

    render_exploration(&mut out, &report.raw_exploration);
    render_missing(&mut out, report);
    render_steps(&mut out, &report.processing_steps);
    render_statistics(&mut out, &report.statistics);
    render_grouped_means(&mut out, &report.grouped_means);
    render_figure(&mut out, report);

    let _ = writeln!(out, "{}", "=".repeat(WIDE_RULE));
    let _ = writeln!(out, "Completed in {} ms", report.summary.duration_ms);
    let _ = writeln!(out, "{}", "=".repeat(WIDE_RULE));

    out
}

pub fn render_exploration(out: &mut String, exploration: &ExplorationReport) {
    section(out, "DATASET OVERVIEW");
    let (rows, columns) = exploration.shape;
    let _ = writeln!(out, "  Rows: {}", rows);
    let _ = writeln!(out, "  Columns: {}", columns);
    let _ = writeln!(out);

    let _ = writeln!(out, "First {} rows:", exploration.preview_frame.height());
    let _ = writeln!(out, "{}", exploration.preview_frame);
    let _ = writeln!(out);

    section(out, "COLUMN TYPES");
    let _ = writeln!(
        out,
        "  {:<22} {:<10} {:<12} {:>9}",
        "Column", "Type", "Kind", "Non-null"
    );
    for column in &exploration.columns {
        let _ = writeln!(
            out,
            "  {:<22} {:<10} {:<12} {:>9}",
            column.name, column.dtype, column.kind, column.non_null_count
        );
    }
    let _ = writeln!(out);
}

fn render_missing(out: &mut String, report: &AnalysisReport) {
    section(out, "MISSING VALUES");
    let _ = writeln!(out, "  {:<22} {:>8} {:>8}", "Column", "Before", "After");
    for column in &report.raw_exploration.columns {
        let after = report
            .cleaned_exploration
            .column(&column.name)
            .map(|c| c.missing_count)
            .unwrap_or(0);
        let _ = writeln!(
            out,
            "  {:<22} {:>8} {:>8}",
            column.name, column.missing_count, after
        );
    }
    let _ = writeln!(
        out,
        "  {:<22} {:>8} {:>8}",
        "Total", report.summary.missing_before, report.summary.missing_after
    );
    let _ = writeln!(out);
}

fn render_steps(out: &mut String, steps: &[String]) {
    section(out, "PROCESSING STEPS");
    if steps.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for step in steps {
        let _ = writeln!(out, "  - {}", step);
    }
    let _ = writeln!(out);
}

pub fn render_statistics(out: &mut String, statistics: &SummaryStatistics) {
    section(out, "DESCRIPTIVE STATISTICS");
    let _ = writeln!(
        out,
        "  {:<22} {:>6} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "Column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    );
    for stats in &statistics.columns {
        let _ = writeln!(
            out,
            "  {:<22} {:>6} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
            stats.column,
            stats.count,
            fmt_value(stats.mean),
            fmt_value(stats.std),
            fmt_value(stats.min),
            fmt_value(stats.q25),
            fmt_value(stats.median),
            fmt_value(stats.q75),
            fmt_value(stats.max),
        );
    }
    let _ = writeln!(out);
}

pub fn render_grouped_means(out: &mut String, grouped: &GroupedMeans) {
    section(out, &format!("MEANS BY {}", grouped.group_column.to_uppercase()));
    let _ = write!(out, "  {:<14}", grouped.group_column);
    for column in &grouped.columns {
        let _ = write!(out, " {:>18}", column);
    }
    let _ = writeln!(out);

    for group in &grouped.groups {
        let _ = write!(out, "  {:<14}", group.label);
        for column in &grouped.columns {
            let value = grouped.mean(&group.label, column);
            let _ = write!(out, " {:>18}", fmt_value(value));
        }
        let _ = writeln!(out);
    }
    let _ = writeln!(out);
}

fn render_figure(out: &mut String, report: &AnalysisReport) {
    let figure = &report.figure;
    section(out, "FIGURE");
    let _ = writeln!(out, "  Size: {}x{} px", figure.size.0, figure.size.1);
    for (idx, title) in figure.panels.iter().enumerate() {
        let _ = writeln!(out, "  Panel {}: {}", idx + 1, title);
    }
    let _ = writeln!(
        out,
        "  Histogram: {} bins, {} values",
        figure.histogram_bins, figure.histogram_total
    );
    match &figure.output_path {
        Some(path) => {
            let _ = writeln!(out, "  Saved to: {}", path);
        }
        None => {
            let _ = writeln!(out, "  Not saved (no figure path configured)");
        }
    }
    let _ = writeln!(out);
}
