//! # dedsta-stats
//!
//! Statistical building blocks for the DEDSTA stream density estimator:
//!
//! - [`WeightedKde`] / [`FittedKde`]: weighted product-kernel density
//!   estimation evaluated on equidistant grids
//! - [`Kernel`]: unit-variance smoothing kernels addressed by name
//! - [`Bandwidth`]: fixed or rule-of-thumb bandwidth selection
//! - [`Kpss`]: the KPSS stationarity test with automatic lag selection
//!
//! ## Quick Start
//!
//! ```rust
//! use dedsta_stats::{grid::linspace, Kernel, Kpss, WeightedKde};
//!
//! let points = vec![vec![0.0], vec![0.5], vec![1.5]];
//! let kde = WeightedKde::new(Kernel::Gaussian)
//!     .fit(&points, &[1.0, 2.0, 1.0])
//!     .unwrap();
//! let density = kde.evaluate(&linspace(-4.0, 6.0, 101)).unwrap();
//! assert_eq!(density.len(), 101);
//!
//! let trend: Vec<f64> = (0..100).map(|t| t as f64).collect();
//! assert!(Kpss::default().statistic(&trend).unwrap() > 0.739);
//! ```

#![deny(unsafe_code)]

pub mod bandwidth;
pub mod error;
pub mod grid;
pub mod kde;
pub mod kernel;
pub mod kpss;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use bandwidth::{effective_sample_size, Bandwidth, DEFAULT_BANDWIDTH};
pub use error::{StatsError, StatsResult};
pub use grid::{check_equidistant, linspace};
pub use kde::{FittedKde, WeightedKde};
pub use kernel::Kernel;
pub use kpss::{Kpss, KpssOutcome, KpssRegression, LagSelection, MIN_OBSERVATIONS};
