//! Adaptation modules: reshape a reservoir in response to drift.
//!
//! Each module receives the reservoir and the current nonstationarity degree
//! `ν ∈ [0, 1]` and may rewrite weights or evict samples. The orchestrator
//! applies modules in configuration order after resetting all weights, so a
//! module never sees weights left over from a previous cycle.

mod aging;
mod reduction;

pub use aging::AgingModule;
pub use reduction::{reduction_target, ReductionModule};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::DedstaResult;
use crate::reservoir::Reservoir;

/// A strategy that adapts a reservoir to the current degree of drift.
pub trait AdaptationModule: Send {
    /// Adapt `reservoir` for nonstationarity degree `nonstationarity`.
    ///
    /// Implementations must behave sensibly at both ends of `[0, 1]`.
    fn apply(&self, reservoir: &mut dyn Reservoir, nonstationarity: f64) -> DedstaResult<()>;

    /// Short identifier used in logs.
    fn name(&self) -> &str;
}

/// Module kinds addressable from configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    Aging,
    Reduction,
}

impl ModuleKind {
    /// The default pipeline: age first, then shrink.
    pub const DEFAULT_PIPELINE: [ModuleKind; 2] = [ModuleKind::Aging, ModuleKind::Reduction];

    /// Instantiate the module.
    pub fn build(self) -> Box<dyn AdaptationModule> {
        match self {
            ModuleKind::Aging => Box::new(AgingModule),
            ModuleKind::Reduction => Box::new(ReductionModule),
        }
    }
}

impl std::fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModuleKind::Aging => write!(f, "aging"),
            ModuleKind::Reduction => write!(f, "reduction"),
        }
    }
}

/// Force `nonstationarity` into `[0, 1]`. NaN is treated as stationary.
pub fn clamp_nonstationarity(nonstationarity: f64) -> f64 {
    if nonstationarity.is_nan() {
        warn!("nonstationarity is NaN, treating as 0");
        return 0.0;
    }
    if !(0.0..=1.0).contains(&nonstationarity) {
        warn!(nonstationarity, "nonstationarity outside [0, 1], clamping");
    }
    nonstationarity.clamp(0.0, 1.0)
}
