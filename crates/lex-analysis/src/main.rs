//! CLI entry point for the exploratory analysis pipeline.

use anyhow::{Result, anyhow};
use clap::Parser;
use lex_analysis::{
    AnalysisError, DataSource, MissingSampling, Pipeline, PipelineConfig, ReportGenerator,
    render_text,
};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

const DEFAULT_FIGURE_PATH: &str = "figure.png";

#[derive(Parser, Debug)]
#[command(
    author = "Lex Machina Team",
    version,
    about = "Exploratory analysis of the Iris dataset",
    long_about = "Loads the Iris dataset, injects synthetic missing values, cleans them by \
                  mean imputation, prints descriptive statistics and draws a four-panel figure \
                  (figure.png unless --figure or --no-figure is given).\n\n\
                  EXAMPLES:\n  \
                  # Full run with the embedded dataset\n  \
                  lex-analysis\n\n  \
                  # Reproducible run, figure written as SVG\n  \
                  lex-analysis --seed 42 --figure figure.svg\n\n  \
                  # Machine-readable output\n  \
                  lex-analysis --json | jq .summary"
)]
struct Args {
    /// CSV file to analyze instead of the embedded Iris dataset
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Seed for the missing-value injection
    #[arg(long)]
    seed: Option<u64>,

    /// Number of missing values to inject
    #[arg(long, default_value = "5")]
    missing_count: usize,

    /// Draw injected rows with replacement (duplicates collapse)
    #[arg(long)]
    with_replacement: bool,

    /// Draw the figure to this path (.png or .svg)
    #[arg(long, default_value = DEFAULT_FIGURE_PATH)]
    figure: PathBuf,

    /// Skip drawing the figure
    #[arg(long, conflicts_with = "figure")]
    no_figure: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of the human-readable report
    ///
    /// Disables all logs; only the final JSON report is written.
    #[arg(long)]
    json: bool,

    /// Also write the JSON report to this file
    #[arg(short = 'r', long)]
    emit_report: Option<PathBuf>,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn build_config(args: &Args) -> Result<PipelineConfig> {
    let sampling = if args.with_replacement {
        MissingSampling::WithReplacement
    } else {
        MissingSampling::WithoutReplacement
    };

    let mut builder = PipelineConfig::builder()
        .missing_count(args.missing_count)
        .sampling(sampling);

    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    if !args.no_figure {
        builder = builder.figure_path(args.figure.clone());
    }

    Ok(builder.build()?)
}

fn build_pipeline(args: &Args, config: PipelineConfig) -> Result<Pipeline> {
    let source = match &args.input {
        Some(path) => DataSource::CsvFile(path.clone()),
        None => DataSource::EmbeddedIris,
    };

    let mut builder = Pipeline::builder().config(config).source(source);

    if !args.quiet {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    Ok(builder.build()?)
}

fn input_label(args: &Args) -> String {
    args.input
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "embedded iris dataset".to_string())
}

/// Report a failed run. The pipeline has already logged the error.
///
/// With `--json` the error is printed as `{"error": {code, message}}` so
/// stdout stays machine-readable.
fn report_failure(args: &Args, e: AnalysisError) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(&json!({ "error": &e }))?);
    }

    if e.is_data_unavailable() {
        return Err(anyhow!("Error loading data: {}", e));
    }
    Err(anyhow!("Pipeline failed: {}", e))
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = build_config(&args)?;
    let pipeline = build_pipeline(&args, config)?;

    info!("{}", "=".repeat(80));
    info!("Starting analysis pipeline...");
    info!("{}", "=".repeat(80));

    let result = match pipeline.run() {
        Ok(result) => result,
        Err(e) => return report_failure(&args, e),
    };

    let report = ReportGenerator::build_report(&input_label(&args), &result);

    if let Some(path) = &args.emit_report {
        let written = ReportGenerator::write_report_to_file(&report, path)?;
        info!("Report written to: {}", written.display());
    }

    if args.json {
        println!("{}", ReportGenerator::to_json(&report)?);
    } else {
        print!("{}", render_text(&report));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_run_draws_figure() {
        let args = Args::parse_from(["lex-analysis"]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.figure_path, Some(PathBuf::from(DEFAULT_FIGURE_PATH)));
    }

    #[test]
    fn test_figure_flags() {
        let args = Args::parse_from(["lex-analysis", "--figure", "out/plot.svg"]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.figure_path, Some(PathBuf::from("out/plot.svg")));

        let args = Args::parse_from(["lex-analysis", "--no-figure"]);
        assert!(build_config(&args).unwrap().figure_path.is_none());

        assert!(Args::try_parse_from(["lex-analysis", "--no-figure", "--figure", "a.png"]).is_err());
    }
}
