//! Integration tests for the analysis pipeline.
//!
//! These tests verify end-to-end behavior on the embedded dataset and on small
//! synthetic tables.

use lex_analysis::{
    AnalysisError, AnalysisStage, DataAnalyzer, DataCleaner, DataExplorer, DataSource,
    DatasetLoader, FigureSpec, MissingSampling, Pipeline, PipelineConfig, ProgressUpdate,
    ReportGenerator, count_missing, render_text,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ============================================================================
// Helper Functions
// ============================================================================

const FEATURES: [&str; 4] = [
    "sepal length (cm)",
    "sepal width (cm)",
    "petal length (cm)",
    "petal width (cm)",
];

fn seeded_config(seed: u64) -> PipelineConfig {
    PipelineConfig::builder().seed(seed).build().unwrap()
}

fn figure_for(primary: &str, secondary: &str, group: &str) -> FigureSpec {
    FigureSpec {
        primary_column: primary.to_string(),
        secondary_column: secondary.to_string(),
        group_column: group.to_string(),
        ..FigureSpec::default()
    }
}

/// Ten rows, three labels, two missing cells.
fn ten_row_table() -> DataFrame {
    df![
        "a" => [Some(1.0), Some(2.0), None, Some(4.0), Some(5.0), Some(6.0), Some(7.0), Some(8.0), Some(9.0), Some(10.0)],
        "b" => [Some(0.5), Some(1.5), Some(2.5), Some(3.5), None, Some(5.5), Some(6.5), Some(7.5), Some(8.5), Some(9.5)],
        "label" => ["x", "y", "z", "x", "y", "z", "x", "y", "z", "x"],
    ]
    .unwrap()
}

fn recording_pipeline(config: PipelineConfig) -> (Pipeline, Arc<Mutex<Vec<AnalysisStage>>>) {
    let stages = Arc::new(Mutex::new(Vec::new()));
    let sink = stages.clone();
    let pipeline = Pipeline::builder()
        .config(config)
        .on_progress(move |update: ProgressUpdate| sink.lock().unwrap().push(update.stage))
        .build()
        .unwrap();
    (pipeline, stages)
}

// ============================================================================
// Full Pipeline Tests with the Embedded Dataset
// ============================================================================

#[test]
fn test_full_pipeline_embedded_iris() {
    let result = Pipeline::builder()
        .config(seeded_config(42))
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(result.raw_exploration.shape, (150, 5));
    assert_eq!(result.injected_rows.len(), 5);
    assert_eq!(
        result
            .raw_exploration
            .column("sepal length (cm)")
            .unwrap()
            .missing_count,
        5
    );
    assert_eq!(result.cleaned_exploration.total_missing(), 0);

    for name in FEATURES {
        assert_eq!(result.statistics.get(name).unwrap().count, 150, "{}", name);
    }
    assert!(result.statistics.get("species").is_none());

    assert_eq!(
        result.grouped_means.labels(),
        vec!["setosa", "versicolor", "virginica"]
    );
    for group in &result.grouped_means.groups {
        assert_eq!(group.row_count, 50);
    }

    assert_eq!(result.figure.histogram.bins.len(), 20);
    assert_eq!(result.figure.histogram.total_count(), 150);
    assert_eq!(result.figure.bars.bars.len(), 3);
    assert_eq!(result.figure.scatter.groups.len(), 3);
}

#[test]
fn test_untouched_columns_keep_reference_statistics() {
    let result = Pipeline::builder()
        .config(seeded_config(1))
        .build()
        .unwrap()
        .run()
        .unwrap();

    // petal length is never injected, so its statistics match the source data
    let stats = result.statistics.get("petal length (cm)").unwrap();
    assert!((stats.mean.unwrap() - 3.758).abs() < 1e-3);
    assert_eq!(stats.min, Some(1.0));
    assert_eq!(stats.max, Some(6.9));
    assert!((stats.median.unwrap() - 4.35).abs() < 1e-9);
}

#[test]
fn test_same_seed_same_injection() {
    let run = |seed| {
        Pipeline::builder()
            .config(seeded_config(seed))
            .build()
            .unwrap()
            .run()
            .unwrap()
            .injected_rows
    };
    assert_eq!(run(9), run(9));
}

#[test]
fn test_with_replacement_injects_at_most_count() {
    let config = PipelineConfig::builder()
        .sampling(MissingSampling::WithReplacement)
        .missing_count(5)
        .seed(123)
        .build()
        .unwrap();
    let result = Pipeline::builder().config(config).build().unwrap().run().unwrap();

    let missing = result.raw_exploration.total_missing();
    assert!((1..=5).contains(&missing));
    assert_eq!(missing, result.injected_rows.len());
    assert_eq!(result.cleaned_exploration.total_missing(), 0);
}

#[test]
fn test_zero_missing_count_leaves_data_clean() {
    let config = PipelineConfig::builder().missing_count(0).build().unwrap();
    let result = Pipeline::builder().config(config).build().unwrap().run().unwrap();

    assert!(result.injected_rows.is_empty());
    assert!(result.imputed.is_empty());
    assert_eq!(result.raw_exploration.total_missing(), 0);
}

// ============================================================================
// Synthetic Tables
// ============================================================================

#[test]
fn test_ten_row_end_to_end() {
    let config = PipelineConfig::builder()
        .figure(figure_for("a", "b", "label"))
        .build()
        .unwrap();
    let dataset = DatasetLoader::from_frame(ten_row_table(), "label").unwrap();
    assert_eq!(dataset.labels, vec!["x", "y", "z"]);

    let result = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .process(dataset)
        .unwrap();

    assert_eq!(result.raw_exploration.total_missing(), 2);
    assert_eq!(result.cleaned_exploration.total_missing(), 0);
    for name in ["a", "b"] {
        let series = result.cleaned_data.column(name).unwrap().as_materialized_series();
        assert_eq!(count_missing(series), 0);
        assert_eq!(result.statistics.get(name).unwrap().count, 10);
    }
    assert_eq!(result.imputed.len(), 2);
    assert_eq!(result.grouped_means.labels(), vec!["x", "y", "z"]);
}

#[test]
fn test_mean_fills_middle_value() {
    let df = df!["v" => [Some(1.0), None, Some(3.0)]].unwrap();
    let outcome = DataCleaner::clean(&df).unwrap();

    let values: Vec<Option<f64>> = outcome
        .data
        .column("v")
        .unwrap()
        .as_materialized_series()
        .f64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(values, vec![Some(1.0), Some(2.0), Some(3.0)]);
    assert_eq!(df.column("v").unwrap().null_count(), 1);
}

#[test]
fn test_cleaning_is_idempotent() {
    let once = DataCleaner::clean(&ten_row_table()).unwrap().data;
    let twice = DataCleaner::clean(&once).unwrap();

    assert!(twice.data.equals_missing(&once));
    assert!(twice.imputed.is_empty());
}

#[test]
fn test_grouped_means_two_labels() {
    let df = df![
        "label" => ["A", "A", "A", "B", "B"],
        "v" => [1.0, 2.0, 3.0, 10.0, 20.0],
    ]
    .unwrap();

    let grouped = DataAnalyzer::summarize_by_group(&df, "label").unwrap();
    assert_eq!(grouped.labels(), vec!["A", "B"]);
    assert_eq!(grouped.mean("A", "v"), Some(2.0));
    assert_eq!(grouped.mean("B", "v"), Some(15.0));
    assert!(grouped.group("C").is_none());
}

#[test]
fn test_explorer_empty_table() {
    let df = df![
        "v" => Vec::<f64>::new(),
        "label" => Vec::<String>::new(),
    ]
    .unwrap();

    let report = DataExplorer::explore(&df, 5);
    assert_eq!(report.shape, (0, 2));
    assert!(report.preview.is_empty());
    assert_eq!(report.total_missing(), 0);
    assert!(report.missing_by_column().iter().all(|(_, n)| *n == 0));
}

#[test]
fn test_all_missing_column_fails_pipeline() {
    let df = df![
        "a" => [Some(1.0), Some(2.0), Some(3.0)],
        "empty" => [None::<f64>, None, None],
        "label" => ["x", "y", "x"],
    ]
    .unwrap();
    let config = PipelineConfig::builder()
        .figure(figure_for("a", "a", "label"))
        .build()
        .unwrap();
    let (pipeline, stages) = recording_pipeline(config);

    let err = pipeline
        .process(DatasetLoader::from_frame(df, "label").unwrap())
        .unwrap_err();

    assert_eq!(err.error_code(), "NO_VALID_VALUES");
    let stages = stages.lock().unwrap();
    assert_eq!(stages.last(), Some(&AnalysisStage::Failed));
    assert!(!stages.contains(&AnalysisStage::Analyzing));
}

// ============================================================================
// Failure and Progress Reporting
// ============================================================================

#[test]
fn test_missing_source_stops_before_exploring() {
    let stages = Arc::new(Mutex::new(Vec::new()));
    let sink = stages.clone();
    let pipeline = Pipeline::builder()
        .config(seeded_config(0))
        .source(DataSource::CsvFile(PathBuf::from("/nonexistent/iris.csv")))
        .on_progress(move |update: ProgressUpdate| sink.lock().unwrap().push(update.stage))
        .build()
        .unwrap();

    let err = pipeline.run().unwrap_err();
    assert!(err.is_data_unavailable());
    assert!(matches!(err, AnalysisError::DataUnavailable(_)));
    assert_eq!(
        *stages.lock().unwrap(),
        vec![AnalysisStage::Loading, AnalysisStage::Failed]
    );
}

#[test]
fn test_progress_stages_in_order() {
    let (pipeline, stages) = recording_pipeline(seeded_config(3));
    pipeline.run().unwrap();

    let mut distinct: Vec<AnalysisStage> = Vec::new();
    for stage in stages.lock().unwrap().iter() {
        if distinct.last() != Some(stage) {
            distinct.push(*stage);
        }
    }
    assert_eq!(
        distinct,
        vec![
            AnalysisStage::Loading,
            AnalysisStage::Exploring,
            AnalysisStage::Cleaning,
            AnalysisStage::Analyzing,
            AnalysisStage::Visualizing,
            AnalysisStage::Complete,
        ]
    );
}

#[test]
fn test_progress_never_decreases() {
    let updates = Arc::new(Mutex::new(Vec::new()));
    let sink = updates.clone();
    let pipeline = Pipeline::builder()
        .config(seeded_config(3))
        .on_progress(move |update: ProgressUpdate| sink.lock().unwrap().push(update))
        .build()
        .unwrap();
    pipeline.run().unwrap();

    let updates = updates.lock().unwrap();
    for pair in updates.windows(2) {
        assert!(
            pair[1].progress >= pair[0].progress,
            "progress went from {:?} {} to {:?} {}",
            pair[0].stage,
            pair[0].progress,
            pair[1].stage,
            pair[1].progress
        );
    }

    let cleaned = updates
        .iter()
        .find(|u| u.sub_stage.as_deref() == Some("cleaned"))
        .unwrap();
    assert_eq!(cleaned.stage, AnalysisStage::Cleaning);
    assert_eq!(cleaned.stage_progress, 1.0);
}

#[test]
fn test_unsupported_figure_extension() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig::builder()
        .seed(4)
        .figure_path(dir.path().join("figure.bmp"))
        .build()
        .unwrap();

    let err = Pipeline::builder().config(config).build().unwrap().run().unwrap_err();
    assert_eq!(err.error_code(), "INVALID_CONFIG");
}

#[test]
fn test_full_run_draws_png_figure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("figure.png");
    let config = PipelineConfig::builder()
        .seed(5)
        .figure_path(path.clone())
        .build()
        .unwrap();

    let result = Pipeline::builder().config(config).build().unwrap().run().unwrap();

    assert_eq!(result.figure_path.as_deref(), Some(path.as_path()));
    let bytes = std::fs::read(&path).unwrap();
    assert!(!bytes.is_empty());
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn test_full_run_draws_svg_figure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("figure.svg");
    let config = PipelineConfig::builder()
        .seed(5)
        .figure_path(path.clone())
        .build()
        .unwrap();

    let result = Pipeline::builder().config(config).build().unwrap().run().unwrap();

    let svg = std::fs::read_to_string(&path).unwrap();
    assert!(svg.starts_with("<svg") || svg.starts_with("<?xml"));
    for title in result.figure.titles() {
        assert!(svg.contains(title), "figure is missing panel title {:?}", title);
    }

    let report = ReportGenerator::build_report("embedded iris dataset", &result);
    assert!(render_text(&report).contains(&format!("Saved to: {}", path.display())));
}

// ============================================================================
// Reporting
// ============================================================================

#[test]
fn test_report_from_full_run() {
    let result = Pipeline::builder()
        .config(seeded_config(42))
        .build()
        .unwrap()
        .run()
        .unwrap();
    let report = ReportGenerator::build_report("embedded iris dataset", &result);

    assert_eq!(report.summary.rows, 150);
    assert_eq!(report.summary.missing_before, 5);
    assert_eq!(report.summary.missing_after, 0);

    let json: serde_json::Value =
        serde_json::from_str(&ReportGenerator::to_json(&report).unwrap()).unwrap();
    assert_eq!(json["statistics"]["columns"].as_array().unwrap().len(), 4);
    assert_eq!(json["grouped_means"]["groups"][0]["label"], "setosa");
    assert_eq!(json["figure"]["histogram_total"], 150);

    let text = render_text(&report);
    assert!(text.contains("DESCRIPTIVE STATISTICS"));
    assert!(text.contains("MEANS BY SPECIES"));
    assert!(text.contains("Filled 'sepal length (cm)' with mean"));
}
