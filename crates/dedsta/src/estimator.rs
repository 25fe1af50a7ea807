//! The stream density estimator.
//!
//! [`DensityEstimator`] wires a reservoir, a nonstationarity estimator and an
//! ordered pipeline of adaptation modules to a density fitter. Every
//! evaluation runs one full cycle:
//!
//! 1. estimate the nonstationarity degree `ν` from the recent window
//! 2. reset every reservoir weight to the neutral value
//! 3. apply each adaptation module in order with `ν`
//! 4. fit the density to the adapted `(points, weights)` and evaluate it
//!
//! The fitted model is never cached; each query refits.

use dedsta_stats::{Bandwidth, Kernel};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::adaptation::{clamp_nonstationarity, AdaptationModule, ModuleKind};
use crate::collaborators::{DensityFitter, DensityModel, KdeFitter};
use crate::config::DedstaConfig;
use crate::error::{DedstaError, DedstaResult};
use crate::nonstationarity::{
    KpssNonstationarityEstimator, NonstationarityEstimator, WindowedNonstationarityEstimator,
};
use crate::reservoir::{Reservoir, SlidingWindowReservoir};

/// Reservoir bounds used when the builder is given no reservoir.
const DEFAULT_MIN_SIZE: usize = 50;
const DEFAULT_MAX_SIZE: usize = 500;

/// Outcome of one evaluation cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Density at every grid point, in grid order.
    pub densities: Vec<f64>,
    /// Nonstationarity degree the cycle adapted to.
    pub nonstationarity: f64,
    /// Reservoir size after adaptation.
    pub reservoir_size: usize,
    /// Weights the density was fitted with, newest-first.
    pub weights: Vec<f64>,
}

/// Adaptive density estimator for data streams with trends.
pub struct DensityEstimator<F: DensityFitter = KdeFitter> {
    reservoir: Box<dyn Reservoir>,
    modules: Vec<Box<dyn AdaptationModule>>,
    estimator: Box<dyn NonstationarityEstimator>,
    fitter: F,
    kernel: Kernel,
    bandwidth: Bandwidth,
    observations_seen: u64,
}

impl DensityEstimator<KdeFitter> {
    /// Start assembling an estimator.
    pub fn builder() -> DensityEstimatorBuilder<KdeFitter> {
        DensityEstimatorBuilder::new()
    }

    /// Build the default stack (sliding window reservoir, KPSS window,
    /// weighted KDE) from configuration.
    pub fn from_config(config: &DedstaConfig) -> DedstaResult<Self> {
        config.validate()?;
        let estimator = WindowedNonstationarityEstimator::with_test(
            config.nonstationarity.window_size,
            config.nonstationarity.kpss(),
        )?;
        Self::builder()
            .reservoir(SlidingWindowReservoir::new(
                config.reservoir.min_size,
                config.reservoir.max_size,
            )?)
            .nonstationarity(estimator)
            .modules(config.modules.iter().copied())
            .kernel(config.density.kernel)
            .bandwidth(config.density.bandwidth)
            .build()
    }
}

impl<F: DensityFitter> DensityEstimator<F> {
    /// Feed one observation to both the reservoir and the nonstationarity
    /// estimator.
    ///
    /// The update is atomic: if either component rejects the point, neither
    /// is modified.
    pub fn update(&mut self, point: &[f64]) -> DedstaResult<()> {
        self.reservoir.accepts(point)?;
        self.estimator.accepts(point)?;

        self.estimator.update(point)?;
        self.reservoir.add(point.to_vec())?;
        self.observations_seen += 1;
        trace!(
            observations = self.observations_seen,
            reservoir_size = self.reservoir.size(),
            "observation recorded"
        );
        Ok(())
    }

    /// Current nonstationarity degree, without adapting the reservoir.
    pub fn nonstationarity(&self) -> DedstaResult<f64> {
        Ok(clamp_nonstationarity(self.estimator.evaluate()?))
    }

    /// Run one adaptation cycle and evaluate the density on `grid`.
    pub fn evaluate(&mut self, grid: &[Vec<f64>]) -> DedstaResult<Vec<f64>> {
        self.evaluate_report(grid).map(|report| report.densities)
    }

    /// Like [`evaluate`](Self::evaluate), also returning the adaptation state
    /// the density was fitted with.
    pub fn evaluate_report(&mut self, grid: &[Vec<f64>]) -> DedstaResult<EvaluationReport> {
        let nu = self.adapt()?;

        let points = self.reservoir.points();
        let weights = self.reservoir.weights();
        let model = self
            .fitter
            .fit(&points, &weights, self.kernel, self.bandwidth)?;
        let densities = model.evaluate(grid)?;

        debug!(
            nonstationarity = nu,
            reservoir_size = points.len(),
            grid_points = grid.len(),
            "density evaluated"
        );
        Ok(EvaluationReport {
            densities,
            nonstationarity: nu,
            reservoir_size: points.len(),
            weights,
        })
    }

    /// Estimate ν, reset weights and run the module pipeline.
    fn adapt(&mut self) -> DedstaResult<f64> {
        let nu = self.nonstationarity()?;

        self.reservoir.reset_weights();
        for module in &self.modules {
            module.apply(self.reservoir.as_mut(), nu)?;
            trace!(
                module = module.name(),
                size = self.reservoir.size(),
                "module applied"
            );
        }

        if self.reservoir.is_empty() {
            return Err(DedstaError::EmptyReservoir);
        }
        Ok(nu)
    }

    pub fn reservoir(&self) -> &dyn Reservoir {
        self.reservoir.as_ref()
    }

    pub fn estimator(&self) -> &dyn NonstationarityEstimator {
        self.estimator.as_ref()
    }

    /// Names of the adaptation modules, in application order.
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    pub fn fitter(&self) -> &F {
        &self.fitter
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    pub fn bandwidth(&self) -> Bandwidth {
        self.bandwidth
    }

    /// Observations accepted since construction.
    pub fn observations_seen(&self) -> u64 {
        self.observations_seen
    }
}

impl<F: DensityFitter> std::fmt::Debug for DensityEstimator<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DensityEstimator")
            .field("reservoir_size", &self.reservoir.size())
            .field("window_len", &self.estimator.len())
            .field("modules", &self.module_names())
            .field("kernel", &self.kernel)
            .field("bandwidth", &self.bandwidth)
            .field("observations_seen", &self.observations_seen)
            .finish()
    }
}

// ── Builder ─────────────────────────────────────────────────────────────

/// Assembles a [`DensityEstimator`].
///
/// Unset components fall back to a sliding window reservoir with bounds
/// 50..=500, a KPSS window of 600 observations and the aging + reduction
/// pipeline.
pub struct DensityEstimatorBuilder<F: DensityFitter = KdeFitter> {
    reservoir: Option<Box<dyn Reservoir>>,
    modules: Option<Vec<Box<dyn AdaptationModule>>>,
    estimator: Option<Box<dyn NonstationarityEstimator>>,
    fitter: F,
    kernel: Kernel,
    bandwidth: Bandwidth,
}

impl DensityEstimatorBuilder<KdeFitter> {
    pub fn new() -> Self {
        Self {
            reservoir: None,
            modules: None,
            estimator: None,
            fitter: KdeFitter,
            kernel: Kernel::default(),
            bandwidth: Bandwidth::default(),
        }
    }
}

impl Default for DensityEstimatorBuilder<KdeFitter> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: DensityFitter> DensityEstimatorBuilder<F> {
    pub fn reservoir(mut self, reservoir: impl Reservoir + 'static) -> Self {
        self.reservoir = Some(Box::new(reservoir));
        self
    }

    pub fn nonstationarity(mut self, estimator: impl NonstationarityEstimator + 'static) -> Self {
        self.estimator = Some(Box::new(estimator));
        self
    }

    /// Append a module to the pipeline.
    pub fn module(mut self, module: impl AdaptationModule + 'static) -> Self {
        self.modules
            .get_or_insert_with(Vec::new)
            .push(Box::new(module));
        self
    }

    /// Replace the pipeline with the given kinds, in order. An empty list
    /// disables adaptation.
    pub fn modules(mut self, kinds: impl IntoIterator<Item = ModuleKind>) -> Self {
        self.modules = Some(kinds.into_iter().map(ModuleKind::build).collect());
        self
    }

    /// Swap the density back-end.
    pub fn fitter<G: DensityFitter>(self, fitter: G) -> DensityEstimatorBuilder<G> {
        DensityEstimatorBuilder {
            reservoir: self.reservoir,
            modules: self.modules,
            estimator: self.estimator,
            fitter,
            kernel: self.kernel,
            bandwidth: self.bandwidth,
        }
    }

    pub fn kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn bandwidth(mut self, bandwidth: Bandwidth) -> Self {
        self.bandwidth = bandwidth;
        self
    }

    pub fn build(self) -> DedstaResult<DensityEstimator<F>> {
        self.bandwidth.validate()?;

        let reservoir = match self.reservoir {
            Some(r) => r,
            None => Box::new(SlidingWindowReservoir::new(DEFAULT_MIN_SIZE, DEFAULT_MAX_SIZE)?),
        };
        let estimator = self
            .estimator
            .unwrap_or_else(|| Box::new(KpssNonstationarityEstimator::default()));
        if let (Some(r), Some(e)) = (reservoir.dimension(), estimator.dimension()) {
            if r != e {
                return Err(DedstaError::InvalidConfig(format!(
                    "reservoir dimension {} differs from nonstationarity window dimension {}",
                    r, e
                )));
            }
        }
        let modules = self.modules.unwrap_or_else(|| {
            ModuleKind::DEFAULT_PIPELINE
                .into_iter()
                .map(ModuleKind::build)
                .collect()
        });

        let built = DensityEstimator {
            reservoir,
            modules,
            estimator,
            fitter: self.fitter,
            kernel: self.kernel,
            bandwidth: self.bandwidth,
            observations_seen: 0,
        };
        info!(
            min_size = built.reservoir.min_size(),
            max_size = built.reservoir.max_size(),
            window_size = built.estimator.window_size(),
            modules = ?built.module_names(),
            kernel = %built.kernel,
            "density estimator ready"
        );
        Ok(built)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dedsta_stats::{linspace, StatsError};

    fn small_estimator() -> DensityEstimator {
        DensityEstimator::builder()
            .reservoir(SlidingWindowReservoir::new(5, 20).unwrap())
            .nonstationarity(KpssNonstationarityEstimator::new(50).unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let est = DensityEstimator::builder().build().unwrap();
        assert_eq!(est.reservoir().min_size(), 50);
        assert_eq!(est.reservoir().max_size(), 500);
        assert_eq!(est.estimator().window_size(), 600);
        assert_eq!(est.module_names(), vec!["aging", "reduction"]);
        assert_eq!(est.kernel(), Kernel::Gaussian);
        assert_eq!(est.bandwidth(), Bandwidth::fixed(1.0));
    }

    #[test]
    fn test_update_feeds_both_components() {
        let mut est = small_estimator();
        for i in 0..30 {
            est.update(&[i as f64]).unwrap();
        }
        assert_eq!(est.observations_seen(), 30);
        assert_eq!(est.reservoir().size(), 20);
        assert_eq!(est.estimator().len(), 30);
    }

    #[test]
    fn test_update_is_atomic() {
        let mut est = small_estimator();
        est.update(&[1.0, 2.0]).unwrap();
        let err = est.update(&[1.0]).unwrap_err();
        assert_eq!(
            err,
            DedstaError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        );
        assert_eq!(est.reservoir().size(), 1);
        assert_eq!(est.estimator().len(), 1);
        assert_eq!(est.observations_seen(), 1);
    }

    #[test]
    fn test_non_finite_update_leaves_state_untouched() {
        let mut est = small_estimator();
        for i in 0..30 {
            est.update(&[(i % 4) as f64]).unwrap();
        }
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(
                est.update(&[bad]),
                Err(DedstaError::NonFiniteObservation { component: 0 })
            );
        }
        assert_eq!(est.reservoir().size(), 20);
        assert_eq!(est.estimator().len(), 30);
        assert_eq!(est.observations_seen(), 30);

        for i in 0..25 {
            est.update(&[(i % 4) as f64]).unwrap();
        }
        let grid = linspace(-5.0, 8.0, 131);
        assert!(est.evaluate(&grid).is_ok());
    }

    #[test]
    fn test_evaluate_before_enough_data() {
        let mut est = small_estimator();
        for i in 0..5 {
            est.update(&[i as f64]).unwrap();
        }
        assert_eq!(
            est.evaluate(&linspace(0.0, 1.0, 5)).unwrap_err(),
            DedstaError::InsufficientData {
                required: 10,
                available: 5
            }
        );
        // nothing adapted
        assert_eq!(est.reservoir().size(), 5);
    }

    #[test]
    fn test_evaluate_report() {
        let mut est = small_estimator();
        for i in 0..20 {
            est.update(&[(i % 4) as f64]).unwrap();
        }
        let grid = linspace(-5.0, 8.0, 131);
        let report = est.evaluate_report(&grid).unwrap();
        assert_eq!(report.densities.len(), 131);
        assert!(report.densities.iter().all(|&d| d >= 0.0));
        assert!((0.0..=1.0).contains(&report.nonstationarity));
        assert_eq!(report.reservoir_size, est.reservoir().size());
        assert_eq!(report.weights.len(), report.reservoir_size);
        // aging ran: newest sample carries the top weight
        assert_eq!(report.weights[0], 2.0);

        let step = 13.0 / 130.0;
        let mass: f64 = report.densities.iter().sum::<f64>() * step;
        assert!((mass - 1.0).abs() < 0.02);
    }

    #[test]
    fn test_grid_errors_propagate() {
        let mut est = small_estimator();
        for i in 0..12 {
            est.update(&[i as f64 * 0.1]).unwrap();
        }
        let grid = vec![vec![0.0], vec![0.5], vec![2.0]];
        assert_eq!(
            est.evaluate(&grid).unwrap_err(),
            DedstaError::Stats(StatsError::NonEquidistantGrid { axis: 0 })
        );
    }

    #[test]
    fn test_empty_pipeline_keeps_neutral_weights() {
        let mut est = DensityEstimator::builder()
            .reservoir(SlidingWindowReservoir::new(0, 15).unwrap())
            .nonstationarity(KpssNonstationarityEstimator::new(15).unwrap())
            .modules([])
            .build()
            .unwrap();
        for i in 0..15 {
            est.update(&[i as f64]).unwrap();
        }
        let report = est.evaluate_report(&linspace(0.0, 14.0, 15)).unwrap();
        assert_eq!(report.weights, vec![1.0; 15]);
        assert_eq!(report.reservoir_size, 15);
    }

    #[test]
    fn test_from_config() {
        let mut config = DedstaConfig::default();
        config.reservoir.min_size = 3;
        config.reservoir.max_size = 30;
        config.nonstationarity.window_size = 40;
        config.density.kernel = Kernel::Epa;
        config.modules = vec![ModuleKind::Reduction];
        let est = DensityEstimator::from_config(&config).unwrap();
        assert_eq!(est.reservoir().max_size(), 30);
        assert_eq!(est.estimator().window_size(), 40);
        assert_eq!(est.kernel(), Kernel::Epa);
        assert_eq!(est.module_names(), vec!["reduction"]);
    }

    #[test]
    fn test_invalid_bandwidth_rejected_at_build() {
        let err = DensityEstimator::builder()
            .bandwidth(Bandwidth::fixed(0.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, DedstaError::Stats(StatsError::InvalidBandwidth(_))));
    }

    #[test]
    fn test_report_serialization() {
        let report = EvaluationReport {
            densities: vec![0.1, 0.2],
            nonstationarity: 0.3,
            reservoir_size: 2,
            weights: vec![2.0, 1.5],
        };
        let json = serde_json::to_string(&report).unwrap();
        let restored: EvaluationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, report);
    }
}
