//! # DEDSTA
//!
//! Density estimation for data streams with trends.
//!
//! A [`DensityEstimator`] keeps a bounded reservoir of weighted samples from
//! a stream and, at every query, adapts it to the current degree of drift
//! before fitting a weighted kernel density estimate:
//!
//! - [`Reservoir`] / [`SlidingWindowReservoir`]: bounded, newest-first
//!   storage with FIFO eviction
//! - [`NonstationarityEstimator`] / [`KpssNonstationarityEstimator`]: a
//!   KPSS test over a sliding window, squashed to `ν ∈ [0, 1]`
//! - [`AdaptationModule`]: [`AgingModule`] down-weights old samples,
//!   [`ReductionModule`] shrinks the reservoir
//! - [`DedstaConfig`]: layered configuration (defaults, file, environment)
//!
//! ## Quick Start
//!
//! ```rust
//! use dedsta::{DensityEstimator, SlidingWindowReservoir, KpssNonstationarityEstimator};
//! use dedsta_stats::linspace;
//!
//! let mut estimator = DensityEstimator::builder()
//!     .reservoir(SlidingWindowReservoir::new(10, 100).unwrap())
//!     .nonstationarity(KpssNonstationarityEstimator::new(100).unwrap())
//!     .build()
//!     .unwrap();
//!
//! for t in 0..50 {
//!     estimator.update(&[(t % 7) as f64]).unwrap();
//! }
//!
//! let density = estimator.evaluate(&linspace(-5.0, 12.0, 171)).unwrap();
//! assert_eq!(density.len(), 171);
//! ```

#![deny(unsafe_code)]

pub mod adaptation;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod estimator;
pub mod nonstationarity;
pub mod reservoir;
pub mod sample;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use adaptation::{
    clamp_nonstationarity, reduction_target, AdaptationModule, AgingModule, ModuleKind,
    ReductionModule,
};
pub use collaborators::{DensityFitter, DensityModel, KdeFitter, StationarityTest};
pub use crate::config::{
    DedstaConfig, DensityConfig, LoggingConfig, NonstationarityConfig, ReservoirConfig,
};
pub use error::{DedstaError, DedstaResult};
pub use estimator::{DensityEstimator, DensityEstimatorBuilder, EvaluationReport};
pub use nonstationarity::{
    sgm, squash, KpssNonstationarityEstimator, NonstationarityEstimator, ObservationWindow,
    WindowedNonstationarityEstimator, DEFAULT_WINDOW_SIZE,
};
pub use reservoir::{Reservoir, SlidingWindowReservoir};
pub use sample::{check_finite, Sample, NEUTRAL_WEIGHT};
