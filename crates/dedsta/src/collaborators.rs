//! Seams to the statistical collaborators: a stationarity test and a
//! weighted density fitter.
//!
//! The default implementations wrap [`dedsta_stats`]; tests and alternative
//! back-ends can plug in their own.

use dedsta_stats::{
    Bandwidth, FittedKde, Kernel, Kpss, LagSelection, WeightedKde, MIN_OBSERVATIONS,
};

use crate::error::DedstaResult;

/// A univariate stationarity test. Larger statistics mean stronger evidence
/// of nonstationarity.
pub trait StationarityTest: Send {
    /// Test statistic for `series`, given oldest-first.
    fn statistic(&self, series: &[f64]) -> DedstaResult<f64>;

    /// Shortest series the test accepts.
    fn min_observations(&self) -> usize;

    fn name(&self) -> &str;
}

impl StationarityTest for Kpss {
    fn statistic(&self, series: &[f64]) -> DedstaResult<f64> {
        Ok(Kpss::statistic(self, series)?)
    }

    fn min_observations(&self) -> usize {
        match self.lags {
            LagSelection::Fixed { lags } => MIN_OBSERVATIONS.max(lags + 1),
            _ => MIN_OBSERVATIONS,
        }
    }

    fn name(&self) -> &str {
        "kpss"
    }
}

/// A density model fitted to a weighted sample.
pub trait DensityModel {
    /// Density at every grid point, in grid order. Values are non-negative.
    fn evaluate(&self, grid: &[Vec<f64>]) -> DedstaResult<Vec<f64>>;
}

/// Fits a [`DensityModel`] to weighted points.
pub trait DensityFitter: Send {
    type Model: DensityModel;

    /// Fit to `points` with the aligned `weights`.
    fn fit(
        &self,
        points: &[Vec<f64>],
        weights: &[f64],
        kernel: Kernel,
        bandwidth: Bandwidth,
    ) -> DedstaResult<Self::Model>;
}

/// Weighted product-kernel KDE from [`dedsta_stats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KdeFitter;

impl DensityFitter for KdeFitter {
    type Model = FittedKde;

    fn fit(
        &self,
        points: &[Vec<f64>],
        weights: &[f64],
        kernel: Kernel,
        bandwidth: Bandwidth,
    ) -> DedstaResult<FittedKde> {
        Ok(WeightedKde::new(kernel)
            .with_bandwidth(bandwidth)
            .fit(points, weights)?)
    }
}

impl DensityModel for FittedKde {
    fn evaluate(&self, grid: &[Vec<f64>]) -> DedstaResult<Vec<f64>> {
        Ok(FittedKde::evaluate(self, grid)?)
    }
}
