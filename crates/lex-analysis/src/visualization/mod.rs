//! Four-panel figure of the cleaned table.
//!
//! [`FigureBuilder::render`] computes every panel as plain data; drawing is a
//! separate step ([`RenderedFigure::save`], [`RenderedFigure::to_svg`]) so the
//! panels can be inspected and reported without touching a backend.

mod export;
mod panels;

pub use export::FigureFormat;
pub use panels::{
    BarPanel, HistogramBin, HistogramPanel, LineData, ScatterGroup, ScatterPanel, TrendPanel,
};

use crate::config::FigureSpec;
use crate::error::Result;
use panels::{bar_panel, histogram_panel, require_column, scatter_panel, trend_panel};
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::debug;

/// A 2x2 figure: trend, grouped bars, histogram and scatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedFigure {
    /// Pixel size (width, height).
    pub size: (u32, u32),
    pub trend: TrendPanel,
    pub bars: BarPanel,
    pub histogram: HistogramPanel,
    pub scatter: ScatterPanel,
}

impl RenderedFigure {
    /// Panel titles in layout order.
    pub fn titles(&self) -> [&str; 4] {
        [
            self.trend.title.as_str(),
            self.bars.title.as_str(),
            self.histogram.title.as_str(),
            self.scatter.title.as_str(),
        ]
    }
}

pub struct FigureBuilder;

impl FigureBuilder {
    /// Build all four panels from `df`.
    pub fn render(df: &DataFrame, spec: &FigureSpec) -> Result<RenderedFigure> {
        for column in [
            &spec.primary_column,
            &spec.secondary_column,
            &spec.group_column,
        ] {
            require_column(df, column)?;
        }

        let figure = RenderedFigure {
            size: spec.size,
            trend: trend_panel(df, &spec.primary_column, &spec.secondary_column)?,
            bars: bar_panel(df, &spec.primary_column, &spec.group_column)?,
            histogram: histogram_panel(df, &spec.primary_column, spec.histogram_bins)?,
            scatter: scatter_panel(
                df,
                &spec.primary_column,
                &spec.secondary_column,
                &spec.group_column,
                spec.scatter_alpha,
            )?,
        };

        debug!(
            "Figure built: {} bars, {} histogram bins, {} scatter groups",
            figure.bars.bars.len(),
            figure.histogram.bins.len(),
            figure.scatter.groups.len()
        );

        Ok(figure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn frame() -> DataFrame {
        df![
            "sepal length (cm)" => [5.0, 6.0, 7.0, 4.0],
            "petal length (cm)" => [1.0, 4.0, 6.0, 1.5],
            "species" => ["setosa", "versicolor", "virginica", "setosa"],
        ]
        .unwrap()
    }

    #[test]
    fn test_render_default_spec() {
        let figure = FigureBuilder::render(&frame(), &FigureSpec::default()).unwrap();

        assert_eq!(figure.size, (2000, 1500));
        assert_eq!(figure.histogram.bins.len(), 20);
        assert_eq!(figure.histogram.total_count(), 4);
        assert_eq!(
            figure.bars.bars,
            vec![
                ("setosa".to_string(), 4.5),
                ("versicolor".to_string(), 6.0),
                ("virginica".to_string(), 7.0),
            ]
        );
        assert_eq!(figure.scatter.groups.len(), 3);
        assert_eq!(figure.scatter.alpha, 0.6);
        assert_eq!(figure.trend.lines[0].points[0], (0.0, 4.0));
        assert_eq!(figure.titles()[2], "Distribution of Sepal Length");
    }

    #[test]
    fn test_render_missing_group_column() {
        let spec = FigureSpec {
            group_column: "class".to_string(),
            ..FigureSpec::default()
        };
        let err = FigureBuilder::render(&frame(), &spec).unwrap_err();
        assert!(matches!(err, AnalysisError::ColumnNotFound(ref c) if c == "class"));
    }

    #[test]
    fn test_render_respects_bin_count() {
        let spec = FigureSpec {
            histogram_bins: 5,
            ..FigureSpec::default()
        };
        let figure = FigureBuilder::render(&frame(), &spec).unwrap();
        assert_eq!(figure.histogram.bins.len(), 5);
        assert_eq!(figure.histogram.bins[4].count, 1);
    }
}
