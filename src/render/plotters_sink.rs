use crate::color::rgb::Rgb;
use crate::render::error::RenderError;
use crate::render::layout::{Anchor, StripeChart};
use crate::render::sink::StripeSink;
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle};
use std::fmt;
use std::path::{Path, PathBuf};

const CHART_MARGIN: u32 = 20;
const TITLE_SIZE: f64 = 22.0;
const LINE_SPACING: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartFormat {
    Svg,
    Png,
}

impl ChartFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ChartFormat::Svg => "svg",
            ChartFormat::Png => "png",
        }
    }
}

impl fmt::Display for ChartFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Draws charts to an image file with plotters.
#[derive(Debug, Clone)]
pub struct PlottersSink {
    path: PathBuf,
    format: ChartFormat,
}

impl PlottersSink {
    pub fn new(path: impl Into<PathBuf>, format: ChartFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// `<dir>/<stem>.<extension>`
    pub fn in_dir(dir: &Path, stem: &str, format: ChartFormat) -> Self {
        Self::new(dir.join(format!("{}.{}", stem, format.extension())), format)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ChartFormat {
        self.format
    }
}

impl StripeSink for PlottersSink {
    fn render(&mut self, chart: &StripeChart) -> Result<(), RenderError> {
        if chart.stripes.is_empty() {
            return Err(RenderError::EmptyChart);
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| RenderError::OutputDir(parent.to_path_buf(), e))?;
        }

        match self.format {
            ChartFormat::Svg => {
                let root = SVGBackend::new(&self.path, chart.size).into_drawing_area();
                draw_chart(root, chart)?;
            }
            ChartFormat::Png => {
                let root = BitMapBackend::new(&self.path, chart.size).into_drawing_area();
                draw_chart(root, chart)?;
            }
        }
        info!("Wrote {} chart to {}", self.format, self.path.display());
        Ok(())
    }
}

fn draw_chart<DB>(root: DrawingArea<DB, Shift>, chart: &StripeChart) -> Result<(), RenderError>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(drawing_error)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(CHART_MARGIN);
    if !chart.title.is_empty() {
        builder.caption(
            &chart.title,
            FontDesc::new(FontFamily::SansSerif, TITLE_SIZE, FontStyle::Normal),
        );
    }
    let mut plot = builder
        .build_cartesian_2d(
            chart.x_range.0..chart.x_range.1,
            chart.y_range.0..chart.y_range.1,
        )
        .map_err(drawing_error)?;

    plot.draw_series(chart.stripes.iter().map(|stripe| {
        Rectangle::new(
            [
                (stripe.x, stripe.y),
                (stripe.x + stripe.width, stripe.y + stripe.height),
            ],
            rgb(stripe.color).filled(),
        )
    }))
    .map_err(drawing_error)?;

    for label in &chart.labels {
        let (h, v) = match label.anchor {
            Anchor::TopCenter => (HPos::Center, VPos::Top),
            Anchor::CenterLeft => (HPos::Left, VPos::Center),
            Anchor::CenterRight => (HPos::Right, VPos::Center),
        };
        let style = FontDesc::new(FontFamily::SansSerif, label.size as f64, FontStyle::Normal)
            .color(&rgb(label.color))
            .pos(Pos::new(h, v));

        let lines: Vec<&str> = label.text.lines().collect();
        let line_height = label.size as f64 * LINE_SPACING;
        let first_offset = match label.anchor {
            Anchor::TopCenter => 0.0,
            _ => -(lines.len().saturating_sub(1) as f64) * line_height / 2.0,
        };
        plot.draw_series(lines.iter().enumerate().map(|(i, line)| {
            let dy = (first_offset + i as f64 * line_height).round() as i32;
            EmptyElement::at((label.x, label.y))
                + Text::new(line.to_string(), (0, dy), style.clone())
        }))
        .map_err(drawing_error)?;
    }

    root.present().map_err(drawing_error)?;
    Ok(())
}

fn rgb(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

fn drawing_error<E>(err: DrawingAreaErrorKind<E>) -> RenderError
where
    E: std::error::Error + Send + Sync,
{
    RenderError::Drawing(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::layout::Stripe;
    use std::error::Error;
    use tempfile::tempdir;

    fn chart() -> StripeChart {
        StripeChart {
            title: String::new(),
            x_range: (2000.0, 2010.0),
            y_range: (0.0, 1.0),
            size: (200, 100),
            stripes: (2000..2010)
                .map(|year| Stripe {
                    x: year as f64,
                    y: 0.0,
                    width: 1.0,
                    height: 1.0,
                    color: Rgb(255, 0, (year - 2000) as u8 * 20),
                })
                .collect(),
            labels: Vec::new(),
        }
    }

    #[test]
    fn test_in_dir_path() {
        let sink = PlottersSink::in_dir(Path::new("out"), "stripes", ChartFormat::Png);
        assert_eq!(sink.path(), Path::new("out/stripes.png"));
        assert_eq!(sink.format(), ChartFormat::Png);
    }

    #[test]
    fn test_svg_output() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let nested = dir.path().join("nested");
        let mut sink = PlottersSink::in_dir(&nested, "chart", ChartFormat::Svg);
        sink.render(&chart())?;

        let svg = std::fs::read_to_string(sink.path())?;
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<rect"));
        Ok(())
    }

    #[test]
    fn test_png_output() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let mut sink = PlottersSink::in_dir(dir.path(), "chart", ChartFormat::Png);
        sink.render(&chart())?;
        assert!(std::fs::metadata(sink.path())?.len() > 0);
        Ok(())
    }

    #[test]
    fn test_empty_chart_rejected() {
        let mut empty = chart();
        empty.stripes.clear();
        let dir = tempdir().unwrap();
        let mut sink = PlottersSink::in_dir(dir.path(), "chart", ChartFormat::Svg);
        assert!(matches!(sink.render(&empty), Err(RenderError::EmptyChart)));
        assert!(!sink.path().exists());
    }
}
