//! Query grid helpers.

use crate::error::{StatsError, StatsResult};

/// Relative tolerance when comparing grid spacings.
const SPACING_TOLERANCE: f64 = 1e-8;

/// Check that a query grid is equidistant along every axis.
///
/// The grid is a list of `d`-dimensional points. For each axis the distinct
/// coordinate values, sorted, must be evenly spaced. Axes with fewer than
/// three distinct values are trivially equidistant.
pub fn check_equidistant(grid: &[Vec<f64>]) -> StatsResult<()> {
    let Some(first) = grid.first() else {
        return Ok(());
    };
    let dims = first.len();

    for (i, point) in grid.iter().enumerate() {
        if point.len() != dims {
            return Err(StatsError::DimensionMismatch {
                expected: dims,
                actual: point.len(),
            });
        }
        if let Some(j) = point.iter().position(|v| !v.is_finite()) {
            return Err(StatsError::NonFinite(i * dims + j));
        }
    }

    for axis in 0..dims {
        let mut values: Vec<f64> = grid.iter().map(|p| p[axis]).collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        values.dedup_by(|a, b| (*a - *b).abs() <= SPACING_TOLERANCE * b.abs().max(1.0));
        if values.len() < 3 {
            continue;
        }
        let step = values[1] - values[0];
        let tolerance = SPACING_TOLERANCE * step.abs().max(1.0) * values.len() as f64;
        let uneven = values
            .windows(2)
            .any(|w| ((w[1] - w[0]) - step).abs() > tolerance);
        if uneven {
            return Err(StatsError::NonEquidistantGrid { axis });
        }
    }
    Ok(())
}

/// Build an equidistant one-dimensional grid of `n` points on `[lo, hi]`.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<Vec<f64>> {
    match n {
        0 => Vec::new(),
        1 => vec![vec![lo]],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n).map(|i| vec![lo + i as f64 * step]).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_is_equidistant() {
        let grid = linspace(-3.0, 3.0, 61);
        assert_eq!(grid.len(), 61);
        assert!((grid[0][0] + 3.0).abs() < 1e-12);
        assert!((grid[60][0] - 3.0).abs() < 1e-12);
        assert!(check_equidistant(&grid).is_ok());
    }

    #[test]
    fn linspace_degenerate_sizes() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(2.0, 5.0, 1), vec![vec![2.0]]);
    }

    #[test]
    fn uneven_grid_is_rejected() {
        let grid = vec![vec![0.0], vec![1.0], vec![3.0]];
        assert_eq!(
            check_equidistant(&grid),
            Err(StatsError::NonEquidistantGrid { axis: 0 })
        );
    }

    #[test]
    fn mesh_grid_checks_each_axis() {
        let mut mesh = Vec::new();
        for x in [0.0, 0.5, 1.0] {
            for y in [10.0, 20.0, 30.0, 40.0] {
                mesh.push(vec![x, y]);
            }
        }
        assert!(check_equidistant(&mesh).is_ok());

        mesh.push(vec![0.0, 45.0]);
        assert_eq!(
            check_equidistant(&mesh),
            Err(StatsError::NonEquidistantGrid { axis: 1 })
        );
    }

    #[test]
    fn ragged_grid_is_a_dimension_error() {
        let grid = vec![vec![0.0, 1.0], vec![1.0]];
        assert!(matches!(
            check_equidistant(&grid),
            Err(StatsError::DimensionMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn empty_and_short_grids_are_fine() {
        assert!(check_equidistant(&[]).is_ok());
        assert!(check_equidistant(&[vec![1.0], vec![7.0]]).is_ok());
    }
}
