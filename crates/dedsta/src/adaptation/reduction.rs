use tracing::debug;

use super::{clamp_nonstationarity, AdaptationModule};
use crate::error::DedstaResult;
use crate::reservoir::Reservoir;

/// Slack over `max_size` so that mild drift leaves a full reservoir intact.
const REDUCTION_SLACK: f64 = 1.1;

/// Target size for a reservoir under drift `ν`:
/// `clamp(floor(1.1 · max_size · (1 - ν)), min_size, max_size)`.
pub fn reduction_target(min_size: usize, max_size: usize, nonstationarity: f64) -> usize {
    let nu = nonstationarity.clamp(0.0, 1.0);
    let raw = (REDUCTION_SLACK * max_size as f64 * (1.0 - nu)).floor();
    // raw is finite and non-negative here
    (raw as usize).clamp(min_size, max_size)
}

/// Shrinks the reservoir as drift grows, evicting through the reservoir's
/// own policy. Never grows the reservoir.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReductionModule;

impl AdaptationModule for ReductionModule {
    fn apply(&self, reservoir: &mut dyn Reservoir, nonstationarity: f64) -> DedstaResult<()> {
        let nu = clamp_nonstationarity(nonstationarity);
        let target = reduction_target(reservoir.min_size(), reservoir.max_size(), nu);
        let before = reservoir.size();
        while reservoir.size() > target {
            reservoir.remove()?;
        }
        let removed = before - reservoir.size();
        if removed > 0 {
            debug!(removed, target, nonstationarity = nu, "reduced reservoir");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "reduction"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reservoir::SlidingWindowReservoir;

    fn full(min: usize, max: usize) -> SlidingWindowReservoir {
        let mut r = SlidingWindowReservoir::new(min, max).unwrap();
        for i in 0..max {
            r.add(vec![i as f64]).unwrap();
        }
        r
    }

    #[test]
    fn targets_for_reference_bounds() {
        assert_eq!(reduction_target(10, 100, 0.5), 55);
        assert_eq!(reduction_target(10, 100, 0.0), 100);
        assert_eq!(reduction_target(10, 100, 1.0), 10);
    }

    #[test]
    fn half_drift_reduces_to_55() {
        let mut r = full(10, 100);
        ReductionModule.apply(&mut r, 0.5).unwrap();
        assert_eq!(r.size(), 55);
        // survivors are the newest ones
        assert_eq!(r.points()[0], vec![99.0]);
        assert_eq!(r.points()[54], vec![45.0]);
    }

    #[test]
    fn no_drift_keeps_everything() {
        let mut r = full(10, 100);
        ReductionModule.apply(&mut r, 0.0).unwrap();
        assert_eq!(r.size(), 100);
    }

    #[test]
    fn full_drift_shrinks_to_min() {
        let mut r = full(10, 100);
        ReductionModule.apply(&mut r, 1.0).unwrap();
        assert_eq!(r.size(), 10);
    }

    #[test]
    fn never_grows_a_small_reservoir() {
        let mut r = SlidingWindowReservoir::new(10, 100).unwrap();
        for i in 0..3 {
            r.add(vec![i as f64]).unwrap();
        }
        ReductionModule.apply(&mut r, 1.0).unwrap();
        assert_eq!(r.size(), 3);
    }

    #[test]
    fn empty_reservoir_is_a_no_op() {
        let mut r = SlidingWindowReservoir::new(0, 5).unwrap();
        ReductionModule.apply(&mut r, 1.0).unwrap();
        assert!(r.is_empty());
    }
}
