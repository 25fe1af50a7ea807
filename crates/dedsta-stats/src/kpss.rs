//! KPSS stationarity test (Kwiatkowski, Phillips, Schmidt & Shin, 1992).
//!
//! H0: the series is (level or trend) stationary. Larger statistics are
//! evidence against stationarity.
//!
//! ```text
//!   e_t   = residuals of y on a constant (or constant + trend)
//!   S_t   = Σ_{s<=t} e_s
//!   η     = Σ S_t² / n²
//!   σ̂²    = (Σ e_t² + 2 Σ_{l=1..L} (1 - l/(L+1)) Σ_t e_t e_{t-l}) / n
//!   KPSS  = η / σ̂²
//! ```
//!
//! The lag truncation `L` defaults to the data-dependent rule of Hobijn,
//! Franses & Ooms (1998).

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{StatsError, StatsResult};

/// Smallest series the test accepts.
pub const MIN_OBSERVATIONS: usize = 10;

/// Tabulated significance levels, most to least lenient.
const P_VALUES: [f64; 4] = [0.10, 0.05, 0.025, 0.01];
const CRITICAL_LEVEL: [f64; 4] = [0.347, 0.463, 0.574, 0.739];
const CRITICAL_TREND: [f64; 4] = [0.119, 0.146, 0.176, 0.216];

/// Deterministic component removed before testing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KpssRegression {
    /// Level stationarity: demean only.
    #[default]
    Constant,
    /// Trend stationarity: remove an OLS linear trend.
    Trend,
}

/// How the Newey-West lag truncation is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum LagSelection {
    /// Hobijn et al. (1998) data-dependent selection.
    #[default]
    Auto,
    /// `ceil(12 · (n/100)^(1/4))`.
    Legacy,
    /// A fixed number of lags; must be smaller than the series length.
    Fixed { lags: usize },
}

/// Result of a single KPSS test.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KpssOutcome {
    pub statistic: f64,
    pub lags: usize,
    /// Interpolated from the tabulated critical values, clamped to [0.01, 0.10].
    pub p_value: f64,
    /// `(significance, critical value)` pairs.
    pub critical_values: Vec<(f64, f64)>,
}

/// Configured KPSS test.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kpss {
    #[serde(default)]
    pub regression: KpssRegression,
    #[serde(default)]
    pub lags: LagSelection,
}

impl Kpss {
    pub fn new(regression: KpssRegression, lags: LagSelection) -> Self {
        Self { regression, lags }
    }

    /// Run the test and return only the statistic.
    pub fn statistic(&self, series: &[f64]) -> StatsResult<f64> {
        self.test(series).map(|o| o.statistic)
    }

    /// Run the full test.
    ///
    /// A series whose residuals are identically zero (e.g. a constant series
    /// under `Constant`, a straight line under `Trend`) has no variation to
    /// test and is reported as perfectly stationary (statistic 0).
    pub fn test(&self, series: &[f64]) -> StatsResult<KpssOutcome> {
        let n = series.len();
        if n < MIN_OBSERVATIONS {
            return Err(StatsError::InsufficientObservations {
                required: MIN_OBSERVATIONS,
                available: n,
            });
        }
        if let Some(i) = series.iter().position(|v| !v.is_finite()) {
            return Err(StatsError::NonFinite(i));
        }

        let resids = self.residuals(series);
        let crit = match self.regression {
            KpssRegression::Constant => CRITICAL_LEVEL,
            KpssRegression::Trend => CRITICAL_TREND,
        };
        let critical_values = P_VALUES.iter().copied().zip(crit).collect();

        let scale = series.iter().fold(0.0f64, |m, v| m.max(v.abs())).max(1.0);
        let ssr: f64 = resids.iter().map(|e| e * e).sum();
        if ssr <= (f64::EPSILON * scale).powi(2) * n as f64 {
            return Ok(KpssOutcome {
                statistic: 0.0,
                lags: 0,
                p_value: P_VALUES[0],
                critical_values,
            });
        }

        let lags = match self.lags {
            LagSelection::Auto => auto_lags(&resids),
            LagSelection::Legacy => (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize,
            LagSelection::Fixed { lags } => {
                if lags >= n {
                    return Err(StatsError::InsufficientObservations {
                        required: lags + 1,
                        available: n,
                    });
                }
                lags
            }
        }
        .min(n - 1);

        let mut partial = 0.0;
        let mut eta = 0.0;
        for e in &resids {
            partial += e;
            eta += partial * partial;
        }
        eta /= (n * n) as f64;

        let sigma2 = long_run_variance(&resids, lags);
        let statistic = if sigma2 > 0.0 { eta / sigma2 } else { 0.0 };
        trace!(n, lags, statistic, "kpss");

        Ok(KpssOutcome {
            statistic,
            lags,
            p_value: interpolate_p_value(statistic, &crit),
            critical_values,
        })
    }

    fn residuals(&self, series: &[f64]) -> Vec<f64> {
        let n = series.len() as f64;
        match self.regression {
            KpssRegression::Constant => {
                let mean = series.iter().sum::<f64>() / n;
                series.iter().map(|y| y - mean).collect()
            }
            KpssRegression::Trend => {
                let t_mean = (n - 1.0) / 2.0;
                let y_mean = series.iter().sum::<f64>() / n;
                let (mut sxy, mut sxx) = (0.0, 0.0);
                for (t, y) in series.iter().enumerate() {
                    let dt = t as f64 - t_mean;
                    sxy += dt * (y - y_mean);
                    sxx += dt * dt;
                }
                let slope = sxy / sxx;
                let intercept = y_mean - slope * t_mean;
                series
                    .iter()
                    .enumerate()
                    .map(|(t, y)| y - intercept - slope * t as f64)
                    .collect()
            }
        }
    }
}

/// Σ_t e_t e_{t-lag}
fn autocovariance_sum(resids: &[f64], lag: usize) -> f64 {
    resids[lag..]
        .iter()
        .zip(&resids[..resids.len() - lag])
        .map(|(a, b)| a * b)
        .sum()
}

/// Bartlett-weighted long-run variance.
fn long_run_variance(resids: &[f64], lags: usize) -> f64 {
    let n = resids.len() as f64;
    let mut s = resids.iter().map(|e| e * e).sum::<f64>();
    for l in 1..=lags {
        s += 2.0 * autocovariance_sum(resids, l) * (1.0 - l as f64 / (lags as f64 + 1.0));
    }
    s / n
}

/// Hobijn, Franses & Ooms (1998) automatic bandwidth.
fn auto_lags(resids: &[f64]) -> usize {
    let n = resids.len();
    let nf = n as f64;
    let covlags = nf.powf(2.0 / 9.0) as usize;
    let mut s0 = resids.iter().map(|e| e * e).sum::<f64>() / nf;
    let mut s1 = 0.0;
    for i in 1..=covlags.min(n - 1) {
        let prod = autocovariance_sum(resids, i) / (nf / 2.0);
        s0 += prod;
        s1 += i as f64 * prod;
    }
    if s0 == 0.0 {
        return 0;
    }
    let s_hat = s1 / s0;
    let gamma_hat = 1.1447 * (s_hat * s_hat).powf(1.0 / 3.0);
    let lags = gamma_hat * nf.powf(1.0 / 3.0);
    if lags.is_finite() && lags > 0.0 {
        lags as usize
    } else {
        0
    }
}

/// Linear interpolation of the p-value table, clamped at its ends.
fn interpolate_p_value(statistic: f64, crit: &[f64; 4]) -> f64 {
    if statistic <= crit[0] {
        return P_VALUES[0];
    }
    if statistic >= crit[3] {
        return P_VALUES[3];
    }
    for i in 0..3 {
        if statistic <= crit[i + 1] {
            let frac = (statistic - crit[i]) / (crit[i + 1] - crit[i]);
            return P_VALUES[i] + frac * (P_VALUES[i + 1] - P_VALUES[i]);
        }
    }
    P_VALUES[3]
}
