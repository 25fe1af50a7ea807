//! Online estimation of the nonstationarity degree `ν ∈ [0, 1]`.
//!
//! An estimator keeps a bounded window of recent observations, runs a
//! stationarity test on every dimension and squashes each statistic through
//! a logistic curve:
//!
//! ```text
//!   ν_d = sgm(0.995 · s_d - 2.932),    sgm(x) = 1 / (1 + e^(-x))
//!   ν   = max_d ν_d
//! ```
//!
//! The squash maps the KPSS 1% critical value (0.739) to `ν ≈ 0.1`.

mod windowed;
mod window;

pub use window::ObservationWindow;
pub use windowed::{KpssNonstationarityEstimator, WindowedNonstationarityEstimator};

use crate::error::DedstaResult;

/// Default number of observations kept for the stationarity test.
pub const DEFAULT_WINDOW_SIZE: usize = 600;

/// Slope of the statistic-to-ν squash.
pub const SQUASH_SLOPE: f64 = 0.995;

/// Offset of the statistic-to-ν squash.
pub const SQUASH_OFFSET: f64 = 2.932;

/// Logistic sigmoid.
pub fn sgm(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Map a stationarity statistic onto `[0, 1]`.
pub fn squash(statistic: f64) -> f64 {
    sgm(SQUASH_SLOPE * statistic - SQUASH_OFFSET)
}

/// Tracks recent observations and reports how nonstationary they look.
pub trait NonstationarityEstimator: Send {
    /// Record an observation.
    ///
    /// The first call fixes the dimension; later mismatches are rejected
    /// without mutation.
    fn update(&mut self, value: &[f64]) -> DedstaResult<()>;

    /// Current nonstationarity degree in `[0, 1]`.
    fn evaluate(&self) -> DedstaResult<f64>;

    /// Check whether `value` could be recorded, without recording it.
    fn accepts(&self, value: &[f64]) -> DedstaResult<()>;

    fn dimension(&self) -> Option<usize>;

    /// Observations currently in the window.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn window_size(&self) -> usize;
}
