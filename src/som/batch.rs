//! Batch SOM training.
//!
//! Every iteration replaces each prototype by the neighborhood-weighted mean
//! of the whole data set (a kernel-smoothed re-estimate):
//!
//! ```text
//! w_u = sum_i h(u, bmu_i) * x_i / sum_i h(u, bmu_i)
//! ```
//!
//! There is no learning rate and no randomness; identical inputs and radius
//! schedule always produce the same lattice.
//!
//! References:
//! - Kohonen (2001): "Self-Organizing Maps" (3rd ed.), ch. 3.14

use crate::error::{KohonenError, Result};
use crate::som::training::{log_iteration, IterationReport};
use crate::som::{neighborhood, winner, DecaySchedule, Som, UpdateRule};
use ndarray::{Array1, Array2, ArrayView2};

impl<L> Som<L> {
    /// Batch training with a linearly shrinking radius.
    pub(crate) fn train_batch<F>(&mut self, data: ArrayView2<'_, f64>, on_iteration: &mut F) -> Result<()>
    where
        F: FnMut(&IterationReport),
    {
        self.check_data(data)?;

        let iterations = self.config.iterations;
        let radii = DecaySchedule::linear(
            self.config.radius as f64,
            self.config.final_radius,
            iterations,
        );

        for (iteration, radius) in radii.iter().enumerate() {
            let quantization_error = self.batch_update(data, radius)?;

            let report = IterationReport {
                iteration,
                iterations,
                learning_rate: None,
                radius,
                quantization_error,
            };
            log_iteration(&report);
            on_iteration(&report);
        }

        Ok(())
    }

    /// One batch re-estimate of the lattice at the given radius.
    ///
    /// The new weights are built in a separate matrix and swapped in only
    /// when every unit received a positive neighborhood mass; on error the
    /// lattice is left untouched. Returns the quantization error measured
    /// before the update.
    ///
    /// The weighted mean leaves the unit sphere, so lattices with a
    /// normalizing update rule are rejected.
    pub(crate) fn batch_update(&mut self, data: ArrayView2<'_, f64>, radius: f64) -> Result<f64> {
        if self.strategy.rule == UpdateRule::NormalizedSum {
            return Err(KohonenError::Configuration(
                "Batch training is not defined for the dot-product variant".to_string(),
            ));
        }

        let (bmus, quantization_error) =
            winner::find_winners(data, self.weights.view(), &self.strategy.criterion)?;

        let n_units = self.total_units();
        let mut mass = Array1::<f64>::zeros(n_units);
        let mut weighted = Array2::<f64>::zeros((n_units, self.weight_dim()));

        // Samples sharing a winner share a neighborhood.
        let mut kernels: Vec<Option<Array1<f64>>> = vec![None; n_units];

        for (sample, &bmu) in data.rows().into_iter().zip(&bmus) {
            let h = kernels[bmu].get_or_insert_with(|| {
                neighborhood::gaussian(&self.grid, self.grid.coords(bmu), radius)
            });

            mass += &*h;
            for (mut acc, &hu) in weighted.rows_mut().into_iter().zip(h.iter()) {
                acc.scaled_add(hu, &sample);
            }
        }

        if let Some(unit) = mass.iter().position(|&m| !(m > 0.0 && m.is_finite())) {
            return Err(KohonenError::Computation(format!(
                "Degenerate neighborhood sum {} at unit {} (radius {})",
                mass[unit], unit, radius
            )));
        }

        for (mut row, &m) in weighted.rows_mut().into_iter().zip(mass.iter()) {
            row /= m;
        }

        for &bmu in &bmus {
            self.winner_histogram[bmu] += 1;
        }
        self.quantization_error.push(quantization_error);
        self.weights = weighted;

        Ok(quantization_error)
    }
}
