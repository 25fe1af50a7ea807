//! Weighted kernel density estimation.
//!
//! The estimate at `x` is
//!
//! ```text
//!   f(x) = Σ_i p_i · Π_d K((x_d - X_id) / h) / h^D,     p_i = w_i / Σ_j w_j
//! ```
//!
//! i.e. a product kernel over dimensions. Each factor is a unit-variance
//! one-dimensional kernel, so the product integrates to one in any dimension.
//! Evaluation is direct (O(n · grid)); the grid must be equidistant.

use tracing::debug;

use crate::bandwidth::Bandwidth;
use crate::error::{StatsError, StatsResult};
use crate::grid::check_equidistant;
use crate::kernel::Kernel;

/// Unfitted weighted KDE: a kernel plus a bandwidth rule.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WeightedKde {
    kernel: Kernel,
    bandwidth: Bandwidth,
}

impl WeightedKde {
    /// KDE with the given kernel and the default bandwidth.
    pub fn new(kernel: Kernel) -> Self {
        Self {
            kernel,
            bandwidth: Bandwidth::default(),
        }
    }

    /// Replace the bandwidth rule.
    pub fn with_bandwidth(mut self, bandwidth: Bandwidth) -> Self {
        self.bandwidth = bandwidth;
        self
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    pub fn bandwidth(&self) -> Bandwidth {
        self.bandwidth
    }

    /// Fit the estimate to a weighted sample.
    ///
    /// Weights must be finite and non-negative with a positive sum; they are
    /// normalized internally so only their relative magnitudes matter.
    pub fn fit(&self, points: &[Vec<f64>], weights: &[f64]) -> StatsResult<FittedKde> {
        if points.is_empty() {
            return Err(StatsError::EmptySample);
        }
        if points.len() != weights.len() {
            return Err(StatsError::LengthMismatch {
                points: points.len(),
                weights: weights.len(),
            });
        }

        let dimension = points[0].len();
        if dimension == 0 {
            return Err(StatsError::DimensionMismatch {
                expected: 1,
                actual: 0,
            });
        }
        for (i, p) in points.iter().enumerate() {
            if p.len() != dimension {
                return Err(StatsError::DimensionMismatch {
                    expected: dimension,
                    actual: p.len(),
                });
            }
            if let Some(j) = p.iter().position(|v| !v.is_finite()) {
                return Err(StatsError::NonFinite(i * dimension + j));
            }
        }

        if let Some(i) = weights.iter().position(|w| !w.is_finite() || *w < 0.0) {
            return Err(StatsError::InvalidWeights(format!(
                "weight {} at position {} is negative or non-finite",
                weights[i], i
            )));
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(StatsError::InvalidWeights("weights sum to zero".into()));
        }

        let bandwidth = self.bandwidth.resolve(points, weights)?;
        debug!(
            kernel = %self.kernel,
            bandwidth,
            points = points.len(),
            dimension,
            "kde fitted"
        );

        Ok(FittedKde {
            kernel: self.kernel,
            bandwidth,
            dimension,
            points: points.to_vec(),
            weights: weights.iter().map(|w| w / total).collect(),
        })
    }
}

/// A KDE bound to a weighted sample, ready to answer density queries.
#[derive(Clone, Debug)]
pub struct FittedKde {
    kernel: Kernel,
    bandwidth: f64,
    dimension: usize,
    points: Vec<Vec<f64>>,
    /// Normalized to sum to one.
    weights: Vec<f64>,
}

impl FittedKde {
    /// Evaluate the density on an equidistant grid, one value per grid point.
    pub fn evaluate(&self, grid: &[Vec<f64>]) -> StatsResult<Vec<f64>> {
        check_equidistant(grid)?;
        if let Some(p) = grid.iter().find(|p| p.len() != self.dimension) {
            return Err(StatsError::DimensionMismatch {
                expected: self.dimension,
                actual: p.len(),
            });
        }
        Ok(grid.iter().map(|x| self.density_at(x)).collect())
    }

    /// Density at a single point. `x` must have the fitted dimension.
    pub fn density_at(&self, x: &[f64]) -> f64 {
        let h = self.bandwidth;
        let norm = h.powi(self.dimension as i32);
        let reach = self.kernel.support_radius().map(|r| r * h);

        let mut total = 0.0;
        for (point, &p) in self.points.iter().zip(&self.weights) {
            if p == 0.0 {
                continue;
            }
            if let Some(reach) = reach {
                if point.iter().zip(x).any(|(a, b)| (a - b).abs() > reach) {
                    continue;
                }
            }
            let k: f64 = point
                .iter()
                .zip(x)
                .map(|(a, b)| self.kernel.evaluate((b - a) / h))
                .product();
            total += p * k;
        }
        (total / norm).max(0.0)
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    /// The resolved bandwidth.
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of sample points. Never zero: fitting rejects empty samples.
    pub fn sample_count(&self) -> usize {
        self.points.len()
    }

    /// Normalized weights, in sample order.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}
