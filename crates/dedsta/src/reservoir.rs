//! Bounded, ordered stores of weighted samples.
//!
//! ## Ordering contract
//!
//! Every [`Reservoir`] keeps its samples **newest-first**: position 0 holds
//! the most recently admitted sample and position `size() - 1` the oldest
//! one still retained. Adaptation modules use position as a recency rank, so
//! implementations must preserve this order under both insertion and
//! eviction.

use std::collections::VecDeque;

use tracing::trace;

use crate::error::{DedstaError, DedstaResult};
use crate::sample::{check_finite, Sample};

/// A bounded store of weighted samples with a policy-defined eviction rule.
pub trait Reservoir: Send {
    /// Admit a new observation at position 0 with the neutral weight,
    /// evicting one sample first when the reservoir is full.
    ///
    /// Rejects a value whose dimension differs from the established one
    /// without mutating anything.
    fn add(&mut self, value: Vec<f64>) -> DedstaResult<()>;

    /// Evict one sample according to the policy.
    ///
    /// Calling this on an empty reservoir is an invariant violation and
    /// reported as [`DedstaError::EmptyReservoir`].
    fn remove(&mut self) -> DedstaResult<Sample>;

    /// Sample values, newest-first.
    fn points(&self) -> Vec<Vec<f64>>;

    /// Sample weights, newest-first.
    fn weights(&self) -> Vec<f64>;

    /// Restore every weight to the neutral value.
    fn reset_weights(&mut self);

    /// Overwrite the weight of the sample at `position` (0 = newest).
    fn set_weight(&mut self, position: usize, weight: f64) -> DedstaResult<()>;

    /// Current number of samples.
    fn size(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    fn min_size(&self) -> usize;

    fn max_size(&self) -> usize;

    /// Dimension shared by all samples, once established by the first `add`.
    fn dimension(&self) -> Option<usize>;

    /// Check whether `value` could be admitted, without admitting it.
    /// Values must be finite and match the established dimension.
    fn accepts(&self, value: &[f64]) -> DedstaResult<()> {
        match self.dimension() {
            Some(expected) if expected != value.len() => Err(DedstaError::DimensionMismatch {
                expected,
                actual: value.len(),
            }),
            _ if value.is_empty() => Err(DedstaError::DimensionMismatch {
                expected: 1,
                actual: 0,
            }),
            _ => check_finite(value),
        }
    }
}

/// Check reservoir bounds: `0 <= min_size <= max_size` and `max_size >= 1`.
pub fn validate_bounds(min_size: usize, max_size: usize) -> DedstaResult<()> {
    if max_size == 0 {
        return Err(DedstaError::InvalidConfig(
            "reservoir max_size must be at least 1".into(),
        ));
    }
    if min_size > max_size {
        return Err(DedstaError::InvalidConfig(format!(
            "reservoir min_size {} exceeds max_size {}",
            min_size, max_size
        )));
    }
    Ok(())
}

// ── Sliding window ──────────────────────────────────────────────────────

/// Capacity-bounded FIFO reservoir: the oldest sample is evicted first.
///
/// Backed by a `VecDeque` so both admission at the front and eviction at
/// the back are O(1).
#[derive(Clone, Debug)]
pub struct SlidingWindowReservoir {
    samples: VecDeque<Sample>,
    min_size: usize,
    max_size: usize,
    dimension: Option<usize>,
}

impl SlidingWindowReservoir {
    /// Create an empty reservoir with the given bounds.
    pub fn new(min_size: usize, max_size: usize) -> DedstaResult<Self> {
        validate_bounds(min_size, max_size)?;
        Ok(Self {
            samples: VecDeque::with_capacity(max_size),
            min_size,
            max_size,
            dimension: None,
        })
    }

    /// Samples in newest-first order.
    pub fn iter(&self) -> impl Iterator<Item = &Sample> + '_ {
        self.samples.iter()
    }

    /// Sample at `position` (0 = newest).
    pub fn get(&self, position: usize) -> Option<&Sample> {
        self.samples.get(position)
    }
}

impl Reservoir for SlidingWindowReservoir {
    fn add(&mut self, value: Vec<f64>) -> DedstaResult<()> {
        self.accepts(&value)?;
        if self.samples.len() >= self.max_size {
            self.remove()?;
        }
        self.dimension.get_or_insert(value.len());
        self.samples.push_front(Sample::new(value));
        Ok(())
    }

    fn remove(&mut self) -> DedstaResult<Sample> {
        let evicted = self.samples.pop_back().ok_or(DedstaError::EmptyReservoir)?;
        trace!(remaining = self.samples.len(), "evicted oldest sample");
        Ok(evicted)
    }

    fn points(&self) -> Vec<Vec<f64>> {
        self.samples.iter().map(|s| s.value().to_vec()).collect()
    }

    fn weights(&self) -> Vec<f64> {
        self.samples.iter().map(Sample::weight).collect()
    }

    fn reset_weights(&mut self) {
        self.samples.iter_mut().for_each(Sample::reset_weight);
    }

    fn set_weight(&mut self, position: usize, weight: f64) -> DedstaResult<()> {
        let size = self.samples.len();
        let sample = self
            .samples
            .get_mut(position)
            .ok_or(DedstaError::PositionOutOfRange { position, size })?;
        sample.set_weight(weight);
        Ok(())
    }

    fn size(&self) -> usize {
        self.samples.len()
    }

    fn min_size(&self) -> usize {
        self.min_size
    }

    fn max_size(&self) -> usize {
        self.max_size
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}
