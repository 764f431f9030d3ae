//! Main analysis pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating load, explore, clean, analyze and visualize.

use crate::analysis::DataAnalyzer;
use crate::cleaner::DataCleaner;
use crate::config::{ConfigValidationError, PipelineConfig};
use crate::dataset::{DataSource, Dataset, DatasetLoader};
use crate::error::{Result, ResultExt};
use crate::explorer::DataExplorer;
use crate::pipeline::progress::{
    AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::types::PipelineResult;
use crate::visualization::FigureBuilder;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// The main analysis pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use lex_analysis::{Pipeline, PipelineConfig};
///
/// let result = Pipeline::builder()
///     .config(PipelineConfig::builder().seed(42).build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run()?;
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    source: DataSource,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// Ensure Pipeline is Send (can be moved to another thread)
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load the configured source, then run every later stage on it.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::DataUnavailable` if the source cannot be read;
    /// no later stage runs in that case.
    pub fn run(&self) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let result = self
            .load()
            .and_then(|dataset| self.process_internal(dataset, start_time));
        self.finish(result)
    }

    /// Run every stage after loading on an already-loaded dataset.
    pub fn process(&self, dataset: Dataset) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let result = self.process_internal(dataset, start_time);
        self.finish(result)
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn finish(&self, result: Result<PipelineResult>) -> Result<PipelineResult> {
        match result {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                if e.is_data_unavailable() {
                    error!("Error loading data: {}", e);
                } else {
                    error!("Pipeline error: {}", e);
                }
                Err(e)
            }
        }
    }

    fn load(&self) -> Result<Dataset> {
        info!("Step 1: Loading dataset...");
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Loading,
            0.0,
            "Loading dataset...",
        ));

        let dataset = DatasetLoader::new(&self.config)
            .with_source(self.source.clone())
            .load()?;

        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Loading,
            1.0,
            format!(
                "Loaded {} rows, {} missing values injected",
                dataset.height(),
                dataset.injected_rows.len()
            ),
        ));

        Ok(dataset)
    }

    fn process_internal(&self, dataset: Dataset, start_time: Instant) -> Result<PipelineResult> {
        let mut processing_steps: Vec<String> = Vec::new();
        if let Some(column) = &dataset.missing_column {
            processing_steps.push(format!(
                "Injected {} missing values into '{}'",
                dataset.injected_rows.len(),
                column
            ));
        }

        // Step 2: Explore the raw table
        info!("Step 2: Exploring raw data...");
        self.report_progress(ProgressUpdate::with_sub_stage(
            AnalysisStage::Exploring,
            "raw",
            0.0,
            "Exploring raw data...",
        ));
        let raw_exploration = DataExplorer::explore(&dataset.data, self.config.preview_rows);
        info!(
            "Raw data: {:?}, {} missing cells",
            raw_exploration.shape,
            raw_exploration.total_missing()
        );

        // Step 3: Clean
        info!("Step 3: Cleaning data...");
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Cleaning,
            0.0,
            "Imputing missing numeric values...",
        ));
        let outcome = DataCleaner::clean(&dataset.data).context("Cleaning failed")?;
        processing_steps.extend(outcome.steps.iter().cloned());
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Cleaning,
            0.8,
            format!("Imputed {} columns", outcome.imputed.len()),
        ));

        let cleaned_exploration = DataExplorer::explore(&outcome.data, self.config.preview_rows);
        debug!(
            "Cleaned data: {} missing cells remain",
            cleaned_exploration.total_missing()
        );
        self.report_progress(ProgressUpdate::with_sub_stage(
            AnalysisStage::Cleaning,
            "cleaned",
            1.0,
            format!(
                "Explored cleaned data, {} missing cells remain",
                cleaned_exploration.total_missing()
            ),
        ));

        // Step 4: Statistics
        info!("Step 4: Computing statistics...");
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Analyzing,
            0.0,
            "Computing descriptive statistics...",
        ));
        let statistics = DataAnalyzer::summarize(&outcome.data)?;
        let grouped_means = DataAnalyzer::summarize_by_group(&outcome.data, &dataset.label_column)
            .context("Grouping failed")?;
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Analyzing,
            1.0,
            format!(
                "Statistics for {} columns, {} groups",
                statistics.columns.len(),
                grouped_means.groups.len()
            ),
        ));

        // Step 5: Figure
        info!("Step 5: Building figure...");
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Visualizing,
            0.0,
            "Building figure...",
        ));
        let figure = FigureBuilder::render(&outcome.data, &self.config.figure)
            .context("Figure construction failed")?;

        let figure_path = match &self.config.figure_path {
            Some(path) => {
                figure.save(path)?;
                processing_steps.push(format!("Figure written to {}", path.display()));
                Some(path.clone())
            }
            None => {
                debug!("No figure path configured; skipping drawing");
                None
            }
        };
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Visualizing,
            1.0,
            "Figure ready",
        ));

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!("Pipeline finished in {} ms", duration_ms);

        Ok(PipelineResult {
            injected_rows: dataset.injected_rows,
            raw_exploration,
            cleaned_exploration,
            cleaned_data: outcome.data,
            imputed: outcome.imputed,
            processing_steps,
            statistics,
            grouped_means,
            figure,
            figure_path,
            duration_ms,
        })
    }
}

/// Builder for creating a [`Pipeline`] instance.
///
/// Use [`Pipeline::builder()`] to get started.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    source: Option<DataSource>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Read from this source instead of the embedded dataset.
    pub fn source(mut self, source: DataSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use lex_analysis::{ProgressReporter, ProgressUpdate};
    /// use std::sync::Arc;
    ///
    /// struct MyReporter;
    ///
    /// impl ProgressReporter for MyReporter {
    ///     fn report(&self, update: ProgressUpdate) {
    ///         println!("{}: {}", update.stage.display_name(), update.message);
    ///     }
    /// }
    ///
    /// let pipeline = Pipeline::builder()
    ///     .progress_reporter(Arc::new(MyReporter))
    ///     .build()?;
    /// ```
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            config,
            source: self.source.unwrap_or(DataSource::EmbeddedIris),
            progress_reporter: self.progress_reporter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FigureSpec;
    use crate::error::AnalysisError;
    use polars::prelude::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    fn recorded_pipeline(config: PipelineConfig) -> (Pipeline, Arc<Mutex<Vec<ProgressUpdate>>>) {
        let updates = Arc::new(Mutex::new(Vec::new()));
        let sink = updates.clone();
        let pipeline = Pipeline::builder()
            .config(config)
            .on_progress(move |update| sink.lock().unwrap().push(update))
            .build()
            .unwrap();
        (pipeline, updates)
    }

    fn small_dataset() -> Dataset {
        let df = df![
            "sepal length (cm)" => [Some(5.0), None, Some(7.0), Some(4.0)],
            "petal length (cm)" => [1.0, 4.0, 6.0, 1.5],
            "species" => ["setosa", "versicolor", "virginica", "setosa"],
        ]
        .unwrap();
        DatasetLoader::from_frame(df, "species").unwrap()
    }

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert_eq!(pipeline.source, DataSource::EmbeddedIris);
        assert_eq!(pipeline.config().missing_count, 5);
        assert!(pipeline.progress_reporter.is_none());
    }

    #[test]
    fn test_pipeline_builder_rejects_invalid_config() {
        let mut config = PipelineConfig::default();
        config.preview_rows = 0;
        assert!(Pipeline::builder().config(config).build().is_err());
    }

    #[test]
    fn test_process_small_dataset() {
        let (pipeline, updates) = recorded_pipeline(PipelineConfig::default());
        let result = pipeline.process(small_dataset()).unwrap();

        assert_eq!(result.raw_exploration.total_missing(), 1);
        assert_eq!(result.cleaned_exploration.total_missing(), 0);
        assert_eq!(result.imputed.len(), 1);
        assert!(result.figure_path.is_none());
        assert_eq!(result.statistics.get("sepal length (cm)").unwrap().count, 4);
        assert_eq!(result.grouped_means.labels(), vec!["setosa", "versicolor", "virginica"]);

        let updates = updates.lock().unwrap();
        assert_eq!(updates.first().unwrap().stage, AnalysisStage::Exploring);
        assert_eq!(updates.last().unwrap().stage, AnalysisStage::Complete);
        assert!(updates.iter().all(|u| u.stage != AnalysisStage::Loading));
    }

    #[test]
    fn test_run_stops_when_data_unavailable() {
        let (pipeline, updates) = recorded_pipeline(PipelineConfig::default());
        let pipeline = Pipeline {
            source: DataSource::CsvFile(PathBuf::from("/nonexistent/data.csv")),
            ..pipeline
        };

        let err = pipeline.run().unwrap_err();
        assert!(err.is_data_unavailable());

        let stages: Vec<AnalysisStage> = updates.lock().unwrap().iter().map(|u| u.stage).collect();
        assert_eq!(stages, vec![AnalysisStage::Loading, AnalysisStage::Failed]);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_data_unavailable_logged_once() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();

        let pipeline = Pipeline::builder()
            .source(DataSource::CsvFile(PathBuf::from("/nonexistent/data.csv")))
            .build()
            .unwrap();
        let err = tracing::subscriber::with_default(subscriber, || pipeline.run().unwrap_err());
        assert!(err.is_data_unavailable());

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let error_lines: Vec<&str> = output.lines().filter(|l| l.contains("ERROR")).collect();
        assert_eq!(error_lines.len(), 1, "{}", output);
        assert!(error_lines[0].contains("Error loading data"));
    }

    #[test]
    fn test_process_reports_missing_figure_column() {
        let figure = FigureSpec {
            secondary_column: "petal width (cm)".to_string(),
            ..FigureSpec::default()
        };
        let config = PipelineConfig::builder().figure(figure).build().unwrap();
        let (pipeline, updates) = recorded_pipeline(config);

        let err = pipeline.process(small_dataset()).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
        assert!(matches!(err, AnalysisError::WithContext { .. }));
        assert_eq!(
            updates.lock().unwrap().last().unwrap().stage,
            AnalysisStage::Failed
        );
    }

    #[test]
    fn test_run_embedded_with_seed() {
        let config = PipelineConfig::builder().seed(7).build().unwrap();
        let pipeline = Pipeline::builder().config(config).build().unwrap();
        let result = pipeline.run().unwrap();

        assert_eq!(result.injected_rows.len(), 5);
        assert_eq!(result.raw_exploration.total_missing(), 5);
        assert_eq!(result.cleaned_exploration.total_missing(), 0);
        assert_eq!(result.figure.histogram.total_count(), 150);
    }
}
