use tracing::debug;

use crate::models::{SampleSeries, SmoothedCurve};
use crate::utils::PipelineError;

/// Number of evaluation points in the drawn curve
pub const DENSE_POINTS: usize = 300;

/// A cubic interpolates uniquely only through four or more samples
pub const MIN_SAMPLES: usize = 4;

/// Exact cubic interpolating spline with not-a-knot end conditions
///
/// Stores the knots, the sampled values and the second derivative at every
/// knot. Between knots the curve is the usual moment form of a natural cubic
/// piece; the not-a-knot conditions make the third derivative continuous
/// across the second and second-to-last knots.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    knots: Vec<f64>,
    values: Vec<f64>,
    moments: Vec<f64>,
}

impl CubicSpline {
    /// Fit through every `(x[i], y[i])`. `x` must be strictly increasing.
    pub fn fit(x: &[f64], y: &[f64]) -> Result<Self, PipelineError> {
        let n = x.len().min(y.len());
        if n < MIN_SAMPLES {
            return Err(PipelineError::InsufficientSamples {
                got: n,
                needed: MIN_SAMPLES,
            });
        }

        let x = &x[..n];
        let y = &y[..n];
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        if h.iter().any(|step| !step.is_finite() || *step <= 0.0) {
            return Err(PipelineError::Interpolation(
                "sample positions must be strictly increasing".to_string(),
            ));
        }

        let mut matrix = vec![vec![0.0; n]; n];
        let mut rhs = vec![0.0; n];

        // Third derivative continuous at x[1]
        matrix[0][0] = h[1];
        matrix[0][1] = -(h[0] + h[1]);
        matrix[0][2] = h[0];

        for i in 1..n - 1 {
            matrix[i][i - 1] = h[i - 1];
            matrix[i][i] = 2.0 * (h[i - 1] + h[i]);
            matrix[i][i + 1] = h[i];
            rhs[i] = 6.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1]);
        }

        // Third derivative continuous at x[n-2]
        matrix[n - 1][n - 3] = h[n - 2];
        matrix[n - 1][n - 2] = -(h[n - 3] + h[n - 2]);
        matrix[n - 1][n - 1] = h[n - 3];

        let moments = solve_linear(matrix, rhs)?;

        Ok(Self {
            knots: x.to_vec(),
            values: y.to_vec(),
            moments,
        })
    }

    /// Evaluate the spline; outside the knot range the end pieces are extended
    pub fn evaluate(&self, at: f64) -> f64 {
        let last = self.knots.len() - 2;
        let i = match self.knots.partition_point(|k| *k <= at) {
            0 => 0,
            p => (p - 1).min(last),
        };

        let (x0, x1) = (self.knots[i], self.knots[i + 1]);
        let (y0, y1) = (self.values[i], self.values[i + 1]);
        let (m0, m1) = (self.moments[i], self.moments[i + 1]);
        let h = x1 - x0;
        let a = x1 - at;
        let b = at - x0;

        m0 * a.powi(3) / (6.0 * h)
            + m1 * b.powi(3) / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * a
            + (y1 / h - m1 * h / 6.0) * b
    }
}

/// Gaussian elimination with partial pivoting; the systems here are at most
/// one day of slots wide.
fn solve_linear(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>, PipelineError> {
    let n = b.len();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&r, &s| a[r][col].abs().total_cmp(&a[s][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < f64::EPSILON {
            return Err(PipelineError::Interpolation("spline system is singular".to_string()));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut solution = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * solution[k]).sum();
        solution[row] = (b[row] - tail) / a[row][row];
    }

    Ok(solution)
}

/// `count` evenly spaced values over `[start, end]`, both ends included exactly
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            let mut values: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
            values[count - 1] = end;
            values
        }
    }
}

/// Fit a cubic spline through the series and sample it densely for drawing
pub fn synthesize(series: &SampleSeries) -> Result<SmoothedCurve, PipelineError> {
    let spline = CubicSpline::fit(&series.x, &series.y)?;

    let x_min = series.x.iter().copied().fold(f64::INFINITY, f64::min);
    let x_max = series.x.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let x_dense = linspace(x_min, x_max, DENSE_POINTS);
    let y_dense: Vec<f64> = x_dense.iter().map(|&x| spline.evaluate(x)).collect();

    debug!(
        "Synthesized {} dense points from {} samples over [{}, {}]",
        x_dense.len(),
        series.len(),
        x_min,
        x_max
    );

    Ok(SmoothedCurve { x_dense, y_dense })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricePoint;

    const TOLERANCE: f64 = 1e-6;

    fn series(values: &[f64]) -> SampleSeries {
        let points: Vec<PricePoint> = values
            .iter()
            .enumerate()
            .map(|(i, v)| PricePoint::new(&i.to_string(), *v))
            .collect();
        SampleSeries::from_points(&points)
    }

    #[test]
    fn test_rejects_fewer_than_four_samples() {
        for n in 1..MIN_SAMPLES {
            let values: Vec<f64> = (0..n).map(|i| i as f64).collect();
            match synthesize(&series(&values)) {
                Err(PipelineError::InsufficientSamples { got, needed }) => {
                    assert_eq!(got, n);
                    assert_eq!(needed, MIN_SAMPLES);
                }
                other => panic!("expected InsufficientSamples for n={}, got {:?}", n, other),
            }
        }
    }

    #[test]
    fn test_reference_series() {
        let samples = series(&[10.0, 12.0, 9.0, 15.0, 11.0]);
        let curve = synthesize(&samples).expect("synthesis failed");
        let spline = CubicSpline::fit(&samples.x, &samples.y).expect("fit failed");

        assert_eq!(curve.x_dense.len(), DENSE_POINTS);
        assert_eq!(curve.y_dense.len(), DENSE_POINTS);
        assert_eq!(curve.x_dense[0], 0.0);
        assert_eq!(curve.x_dense[299], 4.0);
        assert!((spline.evaluate(2.0) - 9.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_passes_through_every_sample() {
        let values = [
            0.2514, 0.2381, 0.2290, 0.2245, 0.2301, 0.2512, 0.2893, 0.3210, 0.3105, 0.2804,
            0.2550, 0.2402, 0.2311, 0.2299, 0.2350, 0.2498, 0.2790, 0.3301, 0.3544, 0.3402,
            0.3101, 0.2899, 0.2702, 0.2600,
        ];
        let samples = series(&values);
        let curve = synthesize(&samples).expect("synthesis failed");
        let spline = CubicSpline::fit(&samples.x, &samples.y).expect("fit failed");

        for (i, expected) in values.iter().enumerate() {
            let actual = spline.evaluate(i as f64);
            assert!(
                (actual - expected).abs() < TOLERANCE,
                "slot {}: expected {}, got {}",
                i,
                expected,
                actual
            );
        }
        assert!((curve.y_dense[0] - values[0]).abs() < TOLERANCE);
        assert!((curve.y_dense[DENSE_POINTS - 1] - values[23]).abs() < TOLERANCE);
    }

    #[test]
    fn test_dense_axis_strictly_increasing() {
        let curve = synthesize(&series(&[1.0, 3.0, 2.0, 5.0, 4.0, 6.0])).expect("synthesis failed");
        assert!(curve.x_dense.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(curve.x_dense[DENSE_POINTS - 1], 5.0);
    }

    #[test]
    fn test_four_samples_reproduce_a_cubic() {
        // Not-a-knot through 4 points is the single interpolating cubic
        let cubic = |x: f64| x * x * x - 2.0 * x * x + 0.5 * x + 1.0;
        let values: Vec<f64> = (0..4).map(|i| cubic(i as f64)).collect();
        let samples = series(&values);
        let spline = CubicSpline::fit(&samples.x, &samples.y).expect("fit failed");

        for &x in &[0.25, 1.5, 2.75] {
            assert!((spline.evaluate(x) - cubic(x)).abs() < TOLERANCE);
        }
    }

    #[test]
    fn test_overshoot_is_not_clamped() {
        let values = [0.0, 0.0, 10.0, 0.0, 0.0];
        let curve = synthesize(&series(&values)).expect("synthesis failed");

        let min = curve.y_dense.iter().copied().fold(f64::INFINITY, f64::min);
        assert!(min < 0.0);
    }

    #[test]
    fn test_linspace_endpoints() {
        let xs = linspace(0.0, 23.0, DENSE_POINTS);
        assert_eq!(xs.len(), DENSE_POINTS);
        assert_eq!(xs[0], 0.0);
        assert_eq!(xs[DENSE_POINTS - 1], 23.0);
        assert!(linspace(1.0, 2.0, 0).is_empty());
        assert_eq!(linspace(1.0, 2.0, 1), vec![1.0]);
    }
}
