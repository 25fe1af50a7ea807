//! A single weighted observation.

use serde::{Deserialize, Serialize};

use crate::error::{DedstaError, DedstaResult};

/// Weight assigned to a fresh sample and restored by a weight reset.
pub const NEUTRAL_WEIGHT: f64 = 1.0;

/// One observation from the stream plus its current importance weight.
///
/// The value is fixed at admission; only the weight changes afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    value: Vec<f64>,
    weight: f64,
}

impl Sample {
    /// Create a sample with the neutral weight.
    pub fn new(value: Vec<f64>) -> Self {
        Self {
            value,
            weight: NEUTRAL_WEIGHT,
        }
    }

    pub fn value(&self) -> &[f64] {
        &self.value
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    pub fn reset_weight(&mut self) {
        self.weight = NEUTRAL_WEIGHT;
    }

    pub fn dimension(&self) -> usize {
        self.value.len()
    }
}

/// Reject observations with a NaN or infinite component.
pub fn check_finite(value: &[f64]) -> DedstaResult<()> {
    match value.iter().position(|x| !x.is_finite()) {
        Some(component) => Err(DedstaError::NonFiniteObservation { component }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sample_has_neutral_weight() {
        let s = Sample::new(vec![1.0, 2.0]);
        assert_eq!(s.weight(), NEUTRAL_WEIGHT);
        assert_eq!(s.dimension(), 2);
        assert_eq!(s.value(), &[1.0, 2.0]);
    }

    #[test]
    fn weight_can_be_changed_and_reset() {
        let mut s = Sample::new(vec![0.0]);
        s.set_weight(0.25);
        assert_eq!(s.weight(), 0.25);
        s.reset_weight();
        assert_eq!(s.weight(), 1.0);
    }

    #[test]
    fn non_finite_components_are_reported() {
        assert!(check_finite(&[0.0, -3.5]).is_ok());
        assert_eq!(
            check_finite(&[0.0, f64::NAN]),
            Err(DedstaError::NonFiniteObservation { component: 1 })
        );
        assert_eq!(
            check_finite(&[f64::NEG_INFINITY]),
            Err(DedstaError::NonFiniteObservation { component: 0 })
        );
    }

    #[test]
    fn sample_serialization() {
        let s = Sample::new(vec![3.5]);
        let json = serde_json::to_string(&s).unwrap();
        let restored: Sample = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, s);
    }
}
