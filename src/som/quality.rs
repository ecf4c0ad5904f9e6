//! Map quality measures.

use crate::error::Result;
use crate::som::{winner, Som, WinnerCriterion};
use ndarray::{Array2, ArrayView2};

impl<L> Som<L> {
    /// Unified distance matrix, shape `dx x dy`.
    ///
    /// Entry `(x, y)` is the mean distance between the prototype at `(x, y)`
    /// and the prototypes of its 4-neighbourhood. Inner-product lattices use
    /// Euclidean distance here.
    pub fn umatrix(&self) -> Array2<f64> {
        let metric = match self.strategy.criterion {
            WinnerCriterion::MinDistance(metric) => metric,
            WinnerCriterion::MaxInnerProduct => crate::som::DistanceMetric::Euclidean,
        };

        Array2::from_shape_fn((self.grid.dx(), self.grid.dy()), |(x, y)| {
            let unit = self.grid.index(x, y);
            let neighbors = self.grid.neighbors4(unit);
            if neighbors.is_empty() {
                return 0.0;
            }
            let total: f64 = neighbors
                .iter()
                .map(|&n| metric.distance(self.weights.row(unit), self.weights.row(n)))
                .sum();
            total / neighbors.len() as f64
        })
    }

    /// Fraction of rows whose best and second-best units are not adjacent.
    pub fn topographic_error(&self, data: ArrayView2<'_, f64>) -> Result<f64> {
        self.check_data(data)?;
        if self.total_units() < 2 {
            return Ok(0.0);
        }

        let mut errors = 0usize;
        for sample in data.rows() {
            let ranked = winner::k_nearest(sample, self.weights.view(), &self.strategy.criterion, 2)?;
            if !self.grid.are_adjacent(ranked[0].0, ranked[1].0) {
                errors += 1;
            }
        }
        Ok(errors as f64 / data.nrows() as f64)
    }
}
