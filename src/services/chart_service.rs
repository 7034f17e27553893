use std::path::{Path, PathBuf};

use async_trait::async_trait;
use plotters::prelude::*;
use plotters::style::FontTransform;
use tracing::info;

use crate::models::{RenderedChart, SmoothedCurve};
use crate::utils::PipelineError;

/// File name of the rendered chart inside the temp directory
pub const CHART_FILE_NAME: &str = "energy_prices.png";

const CHART_TITLE: &str = "Energy prices per hour";
const X_DESC: &str = "Time";
const Y_DESC: &str = "Price (€)";
const CHART_SIZE: (u32, u32) = (1200, 600);
const LABEL_FONT_SIZE: i32 = 14;

/// Draws a smoothed curve to an image file
#[async_trait]
pub trait ChartRenderer: Send + Sync {
    async fn render(
        &self,
        curve: &SmoothedCurve,
        slot_labels: &[String],
    ) -> Result<RenderedChart, PipelineError>;
}

/// PNG renderer backed by plotters, always writing to the same path
#[derive(Debug, Clone)]
pub struct PlottersChartRenderer {
    output_path: PathBuf,
}

impl PlottersChartRenderer {
    pub fn new(output_path: PathBuf) -> Self {
        Self { output_path }
    }

    /// Renderer writing `energy_prices.png` into the system temp directory
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir().join(CHART_FILE_NAME))
    }
}

/// Y bounds with 10% padding; a flat series gets a unit band around it
pub fn y_axis_range(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 1.0);
    }

    let min_price = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max_price = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let range = max_price - min_price;
    let padding = if range > f64::EPSILON { range * 0.1 } else { 1.0 };

    (min_price - padding, max_price + padding)
}

/// Tick positions at the integer sample indices
pub fn tick_positions(count: usize) -> Vec<f64> {
    (0..count).map(|i| i as f64).collect()
}

fn draw_chart(
    path: &Path,
    x_dense: &[f64],
    y_dense: &[f64],
    labels: &[String],
) -> Result<(), String> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| format!("Failed to fill canvas: {}", e))?;

    let x_min = x_dense.first().copied().unwrap_or(0.0);
    let x_max = x_dense.last().copied().unwrap_or(1.0);
    let (y_min, y_max) = y_axis_range(y_dense);

    let mut chart = ChartBuilder::on(&root)
        .caption(CHART_TITLE, ("sans-serif", 32.0).into_font())
        .margin(15)
        .x_label_area_size(100)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| format!("Failed to build chart: {}", e))?;

    // Slot ticks are drawn by hand below so they land on the sample indices
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(0)
        .x_desc(X_DESC)
        .y_desc(Y_DESC)
        .y_label_formatter(&|y: &f64| format!("{:.2}", y))
        .draw()
        .map_err(|e| format!("Failed to draw mesh: {}", e))?;

    chart
        .draw_series(LineSeries::new(
            x_dense.iter().copied().zip(y_dense.iter().copied()),
            ShapeStyle::from(&BLUE).stroke_width(3),
        ))
        .map_err(|e| format!("Failed to draw curve: {}", e))?;

    let label_style = TextStyle::from(
        ("sans-serif", LABEL_FONT_SIZE)
            .into_font()
            .transform(FontTransform::Rotate90),
    );

    for (x, label) in tick_positions(labels.len()).into_iter().zip(labels) {
        let (px, py) = chart.backend_coord(&(x, y_min));

        root.draw(&PathElement::new(vec![(px, py), (px, py + 5)], BLACK))
            .map_err(|e| format!("Failed to draw tick: {}", e))?;
        root.draw(&Text::new(
            label.clone(),
            (px + LABEL_FONT_SIZE / 2, py + 8),
            label_style.clone(),
        ))
        .map_err(|e| format!("Failed to draw slot label: {}", e))?;
    }

    root.present()
        .map_err(|e| format!("Failed to write chart: {}", e))?;

    Ok(())
}

#[async_trait]
impl ChartRenderer for PlottersChartRenderer {
    async fn render(
        &self,
        curve: &SmoothedCurve,
        slot_labels: &[String],
    ) -> Result<RenderedChart, PipelineError> {
        let path = self.output_path.clone();
        let x_dense = curve.x_dense.clone();
        let y_dense = curve.y_dense.clone();
        let labels = slot_labels.to_vec();

        tokio::task::spawn_blocking(move || draw_chart(&path, &x_dense, &y_dense, &labels))
            .await
            .map_err(|e| PipelineError::Render(format!("Drawing task failed: {}", e)))?
            .map_err(PipelineError::Render)?;

        info!("📈 Chart written to {}", self.output_path.display());

        Ok(RenderedChart {
            path: self.output_path.clone(),
        })
    }
}
