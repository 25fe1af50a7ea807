use thiserror::Error;

/// Errors from the statistics routines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("empty sample: at least one point is required")]
    EmptySample,

    #[error("length mismatch: {points} points but {weights} weights")]
    LengthMismatch { points: usize, weights: usize },

    #[error("invalid weights: {0}")]
    InvalidWeights(String),

    #[error("invalid bandwidth: {0} (must be finite and > 0)")]
    InvalidBandwidth(f64),

    #[error("grid is not equidistant along axis {axis}")]
    NonEquidistantGrid { axis: usize },

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("insufficient observations: {available} available, {required} required")]
    InsufficientObservations { required: usize, available: usize },

    #[error("non-finite value at index {0}")]
    NonFinite(usize),

    #[error("unknown kernel: {0}")]
    UnknownKernel(String),
}

/// Convenience type alias for statistics results.
pub type StatsResult<T> = Result<T, StatsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let e = StatsError::LengthMismatch {
            points: 10,
            weights: 9,
        };
        assert!(e.to_string().contains("10 points"));
        assert!(e.to_string().contains("9 weights"));

        let e = StatsError::NonEquidistantGrid { axis: 1 };
        assert!(e.to_string().contains("axis 1"));

        let e = StatsError::InsufficientObservations {
            required: 10,
            available: 3,
        };
        assert!(e.to_string().contains("3 available"));
    }

    #[test]
    fn unknown_kernel_carries_name() {
        let e = StatsError::UnknownKernel("laplace".into());
        assert!(e.to_string().contains("laplace"));
    }
}
