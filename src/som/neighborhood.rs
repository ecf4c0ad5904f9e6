//! Neighborhood functions over the lattice grid.

use crate::som::Grid;
use ndarray::Array1;

/// Gaussian neighborhood centered on `center`.
///
/// For every unit, `exp(-d / (2 * radius^2))` where `d` is the squared
/// grid-space distance to `center`. The radius must be positive.
pub fn gaussian(grid: &Grid, center: (usize, usize), radius: f64) -> Array1<f64> {
    debug_assert!(radius > 0.0, "Neighborhood radius must be positive");

    let ssq = 2.0 * radius * radius;
    grid.iter()
        .map(|coord| (-grid.distance_squared(center, coord) / ssq).exp())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_at_center() {
        let grid = Grid::new(5, 5);
        let h = gaussian(&grid, (2, 2), 1.5);

        assert_eq!(h.len(), 25);
        assert!((h[grid.index(2, 2)] - 1.0).abs() < 1e-12);
        assert!(h.iter().all(|&v| v > 0.0 && v <= 1.0));
    }

    #[test]
    fn test_falloff_value() {
        let grid = Grid::new(3, 3);
        let h = gaussian(&grid, (0, 0), 2.0);

        // (2, 2) is at squared distance 8 from the corner.
        let expected = (-8.0f64 / 8.0).exp();
        assert!((h[grid.index(2, 2)] - expected).abs() < 1e-12);
        assert!(h[grid.index(0, 1)] > h[grid.index(0, 2)]);
    }

    #[test]
    fn test_small_radius_collapses() {
        let grid = Grid::new(4, 4);
        let h = gaussian(&grid, (1, 1), 0.05);

        assert!((h[grid.index(1, 1)] - 1.0).abs() < 1e-12);
        let rest: f64 = h.iter().sum::<f64>() - 1.0;
        assert!(rest < 1e-12);
    }
}
