use dedsta_stats::Kpss;
use tracing::trace;

use super::{squash, NonstationarityEstimator, ObservationWindow, DEFAULT_WINDOW_SIZE};
use crate::collaborators::StationarityTest;
use crate::error::{DedstaError, DedstaResult};

/// Nonstationarity estimator over a sliding window of recent observations,
/// testing each dimension independently and reporting the worst one.
#[derive(Clone, Debug)]
pub struct WindowedNonstationarityEstimator<T: StationarityTest = Kpss> {
    window: ObservationWindow,
    test: T,
}

/// The default estimator: KPSS on a sliding window.
pub type KpssNonstationarityEstimator = WindowedNonstationarityEstimator<Kpss>;

impl WindowedNonstationarityEstimator<Kpss> {
    /// KPSS-based estimator keeping `window_size` observations.
    pub fn new(window_size: usize) -> DedstaResult<Self> {
        Self::with_test(window_size, Kpss::default())
    }
}

impl Default for WindowedNonstationarityEstimator<Kpss> {
    fn default() -> Self {
        Self {
            window: ObservationWindow::new(DEFAULT_WINDOW_SIZE),
            test: Kpss::default(),
        }
    }
}

impl<T: StationarityTest> WindowedNonstationarityEstimator<T> {
    /// Estimator running `test` on a window of `window_size` observations.
    ///
    /// The window must be able to hold at least the test's minimum series.
    pub fn with_test(window_size: usize, test: T) -> DedstaResult<Self> {
        let required = test.min_observations();
        if window_size < required {
            return Err(DedstaError::InvalidConfig(format!(
                "window_size {} is smaller than the {} minimum of {} observations",
                window_size,
                test.name(),
                required
            )));
        }
        Ok(Self {
            window: ObservationWindow::new(window_size),
            test,
        })
    }

    /// The underlying observation window.
    pub fn window(&self) -> &ObservationWindow {
        &self.window
    }

    pub fn test(&self) -> &T {
        &self.test
    }

    /// Values of dimension `d` in the window, oldest first.
    pub fn column(&self, d: usize) -> Option<Vec<f64>> {
        self.window.column(d)
    }

    /// Squashed score for every dimension, in dimension order.
    pub fn per_dimension(&self) -> DedstaResult<Vec<f64>> {
        let required = self.test.min_observations();
        let available = self.window.len();
        let dims = match self.window.dimension() {
            Some(d) if available >= required => d,
            _ => {
                return Err(DedstaError::InsufficientData {
                    required,
                    available,
                })
            }
        };

        (0..dims)
            .map(|d| {
                let series = self.window.column(d).unwrap_or_default();
                let value = self.test.statistic(&series)?;
                if !value.is_finite() {
                    return Err(DedstaError::InvalidStatistic {
                        dimension: d,
                        value,
                    });
                }
                let nu = squash(value);
                trace!(
                    dimension = d,
                    statistic = value,
                    nu,
                    test = self.test.name(),
                    "dimension tested"
                );
                Ok(nu)
            })
            .collect()
    }
}

impl<T: StationarityTest> NonstationarityEstimator for WindowedNonstationarityEstimator<T> {
    fn update(&mut self, value: &[f64]) -> DedstaResult<()> {
        self.window.push(value)
    }

    fn evaluate(&self) -> DedstaResult<f64> {
        let scores = self.per_dimension()?;
        Ok(scores.into_iter().fold(0.0, f64::max))
    }

    fn accepts(&self, value: &[f64]) -> DedstaResult<()> {
        self.window.accepts(value)
    }

    fn dimension(&self) -> Option<usize> {
        self.window.dimension()
    }

    fn len(&self) -> usize {
        self.window.len()
    }

    fn window_size(&self) -> usize {
        self.window.capacity()
    }
}
