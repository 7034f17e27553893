//! Chart pipeline models

use std::path::PathBuf;

/// One slot per hour of the day
pub const MAX_SLOTS: usize = 24;

/// A single bar scraped from the rendered price chart
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub slot_label: String,
    pub price: f64,
}

impl PricePoint {
    pub fn new(slot: &str, price: f64) -> Self {
        Self {
            slot_label: format!("Slot {}", slot),
            price,
        }
    }
}

/// Numeric projection of the first `MAX_SLOTS` price points.
///
/// `x` is the positional index (0..n-1) and is always strictly increasing.
#[derive(Debug, Clone)]
pub struct SampleSeries {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub labels: Vec<String>,
}

impl SampleSeries {
    pub fn from_points(points: &[PricePoint]) -> Self {
        let taken = &points[..points.len().min(MAX_SLOTS)];

        Self {
            x: (0..taken.len()).map(|i| i as f64).collect(),
            y: taken.iter().map(|p| p.price).collect(),
            labels: taken.iter().map(|p| p.slot_label.clone()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }
}

/// Densely sampled interpolation of a `SampleSeries`, used for drawing
#[derive(Debug, Clone)]
pub struct SmoothedCurve {
    pub x_dense: Vec<f64>,
    pub y_dense: Vec<f64>,
}

/// A chart image written to local disk, not yet published
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub path: PathBuf,
}
