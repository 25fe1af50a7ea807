use tracing::trace;

use super::{clamp_nonstationarity, AdaptationModule};
use crate::error::DedstaResult;
use crate::reservoir::Reservoir;

/// Down-weights samples linearly by recency rank.
///
/// For a reservoir of size `n`, the sample at position `i` gets
/// `w_i = 2 · (1 - i·ν/n)`. At `ν = 0` every sample weighs 2; at `ν = 1`
/// the weights fall from 2 (newest) towards `2/n` (oldest). Weights stay
/// strictly positive for `ν ∈ [0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AgingModule;

impl AdaptationModule for AgingModule {
    fn apply(&self, reservoir: &mut dyn Reservoir, nonstationarity: f64) -> DedstaResult<()> {
        let nu = clamp_nonstationarity(nonstationarity);
        let n = reservoir.size();
        if n == 0 {
            return Ok(());
        }
        let n_f = n as f64;
        for i in 0..n {
            reservoir.set_weight(i, 2.0 * (1.0 - i as f64 * nu / n_f))?;
        }
        trace!(size = n, nonstationarity = nu, "aged reservoir weights");
        Ok(())
    }

    fn name(&self) -> &str {
        "aging"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reservoir::SlidingWindowReservoir;

    fn reservoir_of(n: usize) -> SlidingWindowReservoir {
        let mut r = SlidingWindowReservoir::new(0, n.max(1)).unwrap();
        for i in 0..n {
            r.add(vec![i as f64]).unwrap();
        }
        r
    }

    #[test]
    fn weights_follow_recency_rank() {
        let mut r = reservoir_of(4);
        AgingModule.apply(&mut r, 0.5).unwrap();
        assert_eq!(r.weights(), vec![2.0, 1.75, 1.5, 1.25]);
    }

    #[test]
    fn stationary_stream_gets_uniform_weights() {
        let mut r = reservoir_of(5);
        AgingModule.apply(&mut r, 0.0).unwrap();
        assert_eq!(r.weights(), vec![2.0; 5]);
    }

    #[test]
    fn maximal_drift_keeps_weights_positive() {
        let mut r = reservoir_of(10);
        AgingModule.apply(&mut r, 1.0).unwrap();
        let w = r.weights();
        assert_eq!(w[0], 2.0);
        assert!((w[9] - 0.2).abs() < 1e-12);
        assert!(w.iter().all(|&x| x > 0.0));
        assert!(w.windows(2).all(|p| p[0] > p[1]));
    }

    #[test]
    fn out_of_range_nonstationarity_is_clamped() {
        let mut r = reservoir_of(4);
        AgingModule.apply(&mut r, 3.0).unwrap();
        assert_eq!(r.weights(), vec![2.0, 1.5, 1.0, 0.5]);
    }

    #[test]
    fn empty_reservoir_is_a_no_op() {
        let mut r = SlidingWindowReservoir::new(0, 3).unwrap();
        AgingModule.apply(&mut r, 0.7).unwrap();
        assert!(r.is_empty());
    }
}
