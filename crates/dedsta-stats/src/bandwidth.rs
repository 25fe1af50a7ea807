//! Bandwidth selection for weighted kernel density estimates.

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};

/// Default fixed bandwidth.
pub const DEFAULT_BANDWIDTH: f64 = 1.0;

/// How the kernel bandwidth is chosen at fit time.
///
/// Rule-of-thumb selectors use the weighted standard deviation averaged over
/// dimensions and Kish's effective sample size `(Σw)² / Σw²`, so that
/// down-weighted samples count for less.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "lowercase")]
pub enum Bandwidth {
    /// A fixed bandwidth in data units.
    Fixed { value: f64 },
    /// Scott's rule: `σ · n^(-1/(d+4))`.
    Scott,
    /// Silverman's rule: `σ · (4/(d+2))^(1/(d+4)) · n^(-1/(d+4))`.
    Silverman,
}

impl Default for Bandwidth {
    fn default() -> Self {
        Self::Fixed {
            value: DEFAULT_BANDWIDTH,
        }
    }
}

impl Bandwidth {
    /// Shorthand for [`Bandwidth::Fixed`].
    pub fn fixed(value: f64) -> Self {
        Self::Fixed { value }
    }

    /// Check that a fixed bandwidth is usable. Rules are always valid.
    pub fn validate(&self) -> StatsResult<()> {
        match *self {
            Self::Fixed { value } => check_positive(value).map(|_| ()),
            Self::Scott | Self::Silverman => Ok(()),
        }
    }

    /// Resolve to a concrete bandwidth for the given weighted sample.
    ///
    /// `points` and `weights` are assumed to be validated by the caller
    /// (non-empty, equal length, shared dimension, non-negative weights with
    /// a positive sum).
    pub fn resolve(&self, points: &[Vec<f64>], weights: &[f64]) -> StatsResult<f64> {
        let value = match *self {
            Self::Fixed { value } => value,
            Self::Scott | Self::Silverman => {
                let d = points.first().map(|p| p.len()).unwrap_or(1) as f64;
                let sigma = mean_weighted_std(points, weights);
                let n_eff = effective_sample_size(weights);
                let base = sigma * n_eff.powf(-1.0 / (d + 4.0));
                match self {
                    Self::Silverman => base * (4.0 / (d + 2.0)).powf(1.0 / (d + 4.0)),
                    _ => base,
                }
            }
        };
        check_positive(value)
    }
}

fn check_positive(value: f64) -> StatsResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(StatsError::InvalidBandwidth(value))
    }
}

/// Kish's effective sample size.
pub fn effective_sample_size(weights: &[f64]) -> f64 {
    let sum: f64 = weights.iter().sum();
    let sum_sq: f64 = weights.iter().map(|w| w * w).sum();
    if sum_sq <= 0.0 {
        0.0
    } else {
        sum * sum / sum_sq
    }
}

/// Weighted standard deviation per dimension, averaged over dimensions.
fn mean_weighted_std(points: &[Vec<f64>], weights: &[f64]) -> f64 {
    let total: f64 = weights.iter().sum();
    let dims = points.first().map(|p| p.len()).unwrap_or(0);
    if dims == 0 || total <= 0.0 {
        return 0.0;
    }

    let mut acc = 0.0;
    for d in 0..dims {
        let mean = points
            .iter()
            .zip(weights)
            .map(|(p, w)| w * p[d])
            .sum::<f64>()
            / total;
        let var = points
            .iter()
            .zip(weights)
            .map(|(p, w)| w * (p[d] - mean).powi(2))
            .sum::<f64>()
            / total;
        acc += var.sqrt();
    }
    acc / dims as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_fixed_one() {
        assert_eq!(Bandwidth::default(), Bandwidth::fixed(1.0));
    }

    #[test]
    fn fixed_bandwidth_passes_through() {
        let pts = vec![vec![0.0], vec![1.0]];
        let h = Bandwidth::fixed(0.25).resolve(&pts, &[1.0, 1.0]).unwrap();
        assert!((h - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn fixed_bandwidth_must_be_positive() {
        assert_eq!(
            Bandwidth::fixed(0.0).validate(),
            Err(StatsError::InvalidBandwidth(0.0))
        );
        assert!(Bandwidth::fixed(f64::NAN).validate().is_err());
        assert!(Bandwidth::Scott.validate().is_ok());
    }

    #[test]
    fn scott_matches_closed_form_for_uniform_weights() {
        // values 0..100, std = sqrt((n^2 - 1) / 12)
        let pts: Vec<Vec<f64>> = (0..100).map(|i| vec![i as f64]).collect();
        let w = vec![1.0; 100];
        let sigma = ((100.0f64 * 100.0 - 1.0) / 12.0).sqrt();
        let expected = sigma * 100.0f64.powf(-0.2);
        let h = Bandwidth::Scott.resolve(&pts, &w).unwrap();
        assert!((h - expected).abs() < 1e-9, "h = {}, expected {}", h, expected);
    }

    #[test]
    fn silverman_is_slightly_narrower_than_scott_in_one_dimension() {
        let pts: Vec<Vec<f64>> = (0..50).map(|i| vec![(i as f64).sin()]).collect();
        let w = vec![1.0; 50];
        let scott = Bandwidth::Scott.resolve(&pts, &w).unwrap();
        let silverman = Bandwidth::Silverman.resolve(&pts, &w).unwrap();
        // (4/3)^(1/5) ≈ 1.059
        assert!((silverman / scott - (4.0f64 / 3.0).powf(0.2)).abs() < 1e-12);
    }

    #[test]
    fn rule_on_constant_sample_is_rejected() {
        let pts = vec![vec![3.0]; 10];
        let w = vec![1.0; 10];
        assert!(matches!(
            Bandwidth::Scott.resolve(&pts, &w),
            Err(StatsError::InvalidBandwidth(_))
        ));
    }

    #[test]
    fn effective_sample_size_penalizes_uneven_weights() {
        assert!((effective_sample_size(&[1.0; 8]) - 8.0).abs() < 1e-12);
        assert!(effective_sample_size(&[10.0, 1.0, 1.0, 1.0]) < 4.0);
        assert_eq!(effective_sample_size(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn serde_tagged_representation() {
        let json = serde_json::to_string(&Bandwidth::fixed(0.5)).unwrap();
        assert_eq!(json, r#"{"rule":"fixed","value":0.5}"#);
        let b: Bandwidth = serde_json::from_str(r#"{"rule":"silverman"}"#).unwrap();
        assert_eq!(b, Bandwidth::Silverman);
    }
}
