//! Report generation module.
//!
//! [`AnalysisReport`] gathers everything a pipeline run produced. It serializes
//! to JSON (`--json`, `--emit-report`) and renders as plain text for the
//! terminal.
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_analysis::reporting::{render_text, ReportGenerator};
//!
//! let report = ReportGenerator::build_report("embedded iris", &pipeline_result);
//! print!("{}", render_text(&report));
//! println!("{}", ReportGenerator::to_json(&report)?);
//! ```

mod generator;
mod text;

pub use generator::{AnalysisReport, FigureSummary, ReportGenerator, RunSummary};
pub use text::{render_exploration, render_grouped_means, render_statistics, render_text};
