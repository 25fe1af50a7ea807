use thiserror::Error;

use dedsta_stats::StatsError;

/// Errors from the adaptive reservoir subsystem.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DedstaError {
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("insufficient data: {available} observations available, {required} required")]
    InsufficientData { required: usize, available: usize },

    #[error("reservoir is empty")]
    EmptyReservoir,

    #[error("observation component {component} is not finite")]
    NonFiniteObservation { component: usize },

    #[error("position {position} out of range for reservoir of size {size}")]
    PositionOutOfRange { position: usize, size: usize },

    #[error("stationarity test returned {value} for dimension {dimension}")]
    InvalidStatistic { dimension: usize, value: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Stats(#[from] StatsError),
}

impl From<config::ConfigError> for DedstaError {
    fn from(e: config::ConfigError) -> Self {
        DedstaError::Config(e.to_string())
    }
}

/// Convenience type alias for DEDSTA results.
pub type DedstaResult<T> = Result<T, DedstaError>;
