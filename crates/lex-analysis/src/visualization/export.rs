//! Figure drawing with plotters: PNG through the bitmap backend, SVG through
//! the SVG backend (to a file or an in-memory string).

use super::RenderedFigure;
use super::panels::{BarPanel, HistogramPanel, ScatterPanel, TrendPanel, min_max};
use crate::error::{AnalysisError, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;
use tracing::{debug, info};

type DrawResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

const COLORS: [RGBColor; 6] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

const CAPTION_FONT: (&str, u32) = ("sans-serif", 28);

/// Output format, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FigureFormat {
    Png,
    Svg,
}

impl FigureFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }
}

fn render_failed(err: Box<dyn std::error::Error>) -> AnalysisError {
    AnalysisError::RenderFailed(err.to_string())
}

impl RenderedFigure {
    /// Draw to `path`, picking PNG or SVG from the extension.
    ///
    /// Missing parent directories are created.
    pub fn save(&self, path: &Path) -> Result<()> {
        let format = FigureFormat::from_path(path).ok_or_else(|| {
            AnalysisError::InvalidConfig(format!(
                "unsupported figure format '{}' (expected .png or .svg)",
                path.display()
            ))
        })?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        match format {
            FigureFormat::Png => self.save_png(path),
            FigureFormat::Svg => self.save_svg(path),
        }
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        let root = BitMapBackend::new(path, self.size).into_drawing_area();
        draw_figure(&root, self).map_err(render_failed)?;
        info!("Figure written to {}", path.display());
        Ok(())
    }

    pub fn save_svg(&self, path: &Path) -> Result<()> {
        let root = SVGBackend::new(path, self.size).into_drawing_area();
        draw_figure(&root, self).map_err(render_failed)?;
        info!("Figure written to {}", path.display());
        Ok(())
    }

    /// Draw the figure as an SVG document held in memory.
    pub fn to_svg(&self) -> Result<String> {
        let mut buffer = String::new();
        {
            let root = SVGBackend::with_string(&mut buffer, self.size).into_drawing_area();
            draw_figure(&root, self).map_err(render_failed)?;
        }
        Ok(buffer)
    }
}

fn draw_figure<DB>(root: &DrawingArea<DB, Shift>, figure: &RenderedFigure) -> DrawResult<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    debug!("Drawing figure at {}x{}", figure.size.0, figure.size.1);
    root.fill(&WHITE)?;

    let areas = root.split_evenly((2, 2));
    if let [trend, bars, histogram, scatter] = areas.as_slice() {
        draw_trend(trend, &figure.trend)?;
        draw_bars(bars, &figure.bars)?;
        draw_histogram(histogram, &figure.histogram)?;
        draw_scatter(scatter, &figure.scatter)?;
    }

    root.present()?;
    Ok(())
}

/// Axis range over `values` with a 5% margin on both sides.
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let values: Vec<f64> = values.collect();
    match min_max(&values) {
        Some((lo, hi)) if lo < hi => {
            let pad = (hi - lo) * 0.05;
            (lo - pad)..(hi + pad)
        }
        Some((v, _)) => (v - 0.5)..(v + 0.5),
        None => 0.0..1.0,
    }
}

fn draw_trend<DB>(area: &DrawingArea<DB, Shift>, panel: &TrendPanel) -> DrawResult<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let points = || panel.lines.iter().flat_map(|l| l.points.iter().copied());
    let x_range = padded_range(points().map(|(x, _)| x));
    let y_range = padded_range(points().map(|(_, y)| y));

    let mut chart = ChartBuilder::on(area)
        .margin(30)
        .caption(panel.title.as_str(), CAPTION_FONT)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc(panel.x_label.as_str())
        .y_desc(panel.y_label.as_str())
        .draw()?;

    for (idx, line) in panel.lines.iter().enumerate() {
        let color = COLORS[idx % COLORS.len()];
        chart
            .draw_series(LineSeries::new(
                line.points.iter().copied(),
                color.stroke_width(2),
            ))?
            .label(line.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

fn draw_bars<DB>(area: &DrawingArea<DB, Shift>, panel: &BarPanel) -> DrawResult<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let n = panel.bars.len().max(1);
    let y_max = panel
        .bars
        .iter()
        .map(|(_, v)| *v)
        .fold(0.0_f64, f64::max);
    let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let mut chart = ChartBuilder::on(area)
        .margin(30)
        .caption(panel.title.as_str(), CAPTION_FONT)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), 0.0..y_max)?;

    let labels: Vec<&str> = panel.bars.iter().map(|(label, _)| label.as_str()).collect();
    let label_at = |x: &f64| {
        let idx = x.round();
        if (x - idx).abs() < 1e-6 && idx >= 0.0 {
            labels.get(idx as usize).map(|l| l.to_string()).unwrap_or_default()
        } else {
            String::new()
        }
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&label_at)
        .x_desc(panel.x_label.as_str())
        .y_desc(panel.y_label.as_str())
        .draw()?;

    chart.draw_series(panel.bars.iter().enumerate().map(|(idx, (_, value))| {
        let x = idx as f64;
        let color = COLORS[idx % COLORS.len()];
        Rectangle::new([(x - 0.3, 0.0), (x + 0.3, *value)], color.filled())
    }))?;

    Ok(())
}

fn draw_histogram<DB>(area: &DrawingArea<DB, Shift>, panel: &HistogramPanel) -> DrawResult<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let x_min = panel.bins.first().map(|b| b.start).unwrap_or(0.0);
    let x_max = panel.bins.last().map(|b| b.end).unwrap_or(1.0);
    let max_count = panel.bins.iter().map(|b| b.count).max().unwrap_or(0);
    let y_max = (max_count as f64 * 1.1).max(1.0);

    let mut chart = ChartBuilder::on(area)
        .margin(30)
        .caption(panel.title.as_str(), CAPTION_FONT)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc(panel.x_label.as_str())
        .y_desc(panel.y_label.as_str())
        .draw()?;

    let fill = COLORS[0].mix(0.7).filled();
    chart.draw_series(panel.bins.iter().map(|bin| {
        Rectangle::new([(bin.start, 0.0), (bin.end, bin.count as f64)], fill)
    }))?;
    chart.draw_series(panel.bins.iter().map(|bin| {
        Rectangle::new(
            [(bin.start, 0.0), (bin.end, bin.count as f64)],
            BLACK.stroke_width(1),
        )
    }))?;

    Ok(())
}

fn draw_scatter<DB>(area: &DrawingArea<DB, Shift>, panel: &ScatterPanel) -> DrawResult<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let points = || panel.groups.iter().flat_map(|g| g.points.iter().copied());
    let x_range = padded_range(points().map(|(x, _)| x));
    let y_range = padded_range(points().map(|(_, y)| y));

    let mut chart = ChartBuilder::on(area)
        .margin(30)
        .caption(panel.title.as_str(), CAPTION_FONT)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc(panel.x_label.as_str())
        .y_desc(panel.y_label.as_str())
        .draw()?;

    for (idx, group) in panel.groups.iter().enumerate() {
        let style = COLORS[idx % COLORS.len()].mix(panel.alpha).filled();
        chart
            .draw_series(
                group
                    .points
                    .iter()
                    .map(|&point| Circle::new(point, 5, style)),
            )?
            .label(group.label.as_str())
            .legend(move |(x, y)| Circle::new((x, y), 5, style));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}
