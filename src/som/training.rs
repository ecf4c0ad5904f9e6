//! SOM training loop.
//!
//! `fit` dispatches on the configured mode. Incremental training updates the
//! lattice after every sample, with the samples reshuffled each iteration;
//! batch training (see `batch.rs`) re-estimates the whole lattice once per
//! iteration.

use crate::config::TrainingMode;
use crate::error::Result;
use crate::som::{neighborhood, winner, DecaySchedule, Som};
use log::{debug, info};
use ndarray::ArrayView2;
use rand::seq::SliceRandom;

/// Log an info summary every this many iterations.
const LOG_INTERVAL: usize = 10;

/// Summary of one completed training iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationReport {
    /// Zero-based iteration number.
    pub iteration: usize,
    /// Total number of iterations of the run.
    pub iterations: usize,
    /// Learning rate used. Always `None` in batch mode.
    pub learning_rate: Option<f64>,
    /// Neighborhood radius used.
    pub radius: f64,
    /// Aggregate quantization error of the iteration.
    pub quantization_error: f64,
}

impl<L> Som<L> {
    /// Learning-rate schedule of incremental training.
    pub fn learning_rate_schedule(&self) -> DecaySchedule {
        DecaySchedule::linear(
            self.config.learning_rate,
            self.config.final_learning_rate,
            self.config.iterations,
        )
    }

    /// Neighborhood-radius schedule of the configured training mode.
    ///
    /// Exponential for incremental training, linear for batch training.
    pub fn radius_schedule(&self) -> Result<DecaySchedule> {
        let initial = self.config.radius as f64;
        match self.config.mode {
            TrainingMode::Incremental => {
                DecaySchedule::exponential(initial, self.config.final_radius, self.config.iterations)
            }
            TrainingMode::Batch => Ok(DecaySchedule::linear(
                initial,
                self.config.final_radius,
                self.config.iterations,
            )),
        }
    }

    /// Trains the lattice on `data` (`N x dw`, one sample per row).
    pub fn fit(&mut self, data: ArrayView2<'_, f64>) -> Result<()> {
        self.fit_with(data, |_| {})
    }

    /// Trains the lattice, calling `on_iteration` after every iteration.
    pub fn fit_with<F>(&mut self, data: ArrayView2<'_, f64>, mut on_iteration: F) -> Result<()>
    where
        F: FnMut(&IterationReport),
    {
        self.check_data(data)?;

        info!(
            "Starting {} SOM training: {} iterations on {} samples, {} units, {} dim",
            self.config.mode,
            self.config.iterations,
            data.nrows(),
            self.total_units(),
            self.weight_dim()
        );

        match self.config.mode {
            TrainingMode::Incremental => self.train_incremental(data, &mut on_iteration)?,
            TrainingMode::Batch => self.train_batch(data, &mut on_iteration)?,
        }

        info!(
            "SOM training completed, final quantization error {:.6}",
            self.quantization_error.last().copied().unwrap_or_default()
        );
        Ok(())
    }

    /// Feeds the samples one at a time in a fresh random order per iteration.
    ///
    /// Updates are sequential: every sample sees the lattice as left by the
    /// previous one.
    pub(crate) fn train_incremental<F>(&mut self, data: ArrayView2<'_, f64>, on_iteration: &mut F) -> Result<()>
    where
        F: FnMut(&IterationReport),
    {
        self.check_data(data)?;

        let iterations = self.config.iterations;
        let etas = self.learning_rate_schedule();
        let radii = DecaySchedule::exponential(
            self.config.radius as f64,
            self.config.final_radius,
            iterations,
        )?;
        let mut order: Vec<usize> = (0..data.nrows()).collect();

        self.trajectory.reserve(iterations * data.nrows());

        for (iteration, (eta, radius)) in etas.iter().zip(radii.iter()).enumerate() {
            order.shuffle(&mut self.rng);

            let mut total_qe = 0.0;
            for &idx in &order {
                let sample = data.row(idx);
                let bmu = winner::best_match(sample, self.weights.view(), &self.strategy.criterion);
                total_qe += bmu.error;

                self.winner_histogram[bmu.index] += 1;
                self.trajectory.push(bmu.index);

                let h = neighborhood::gaussian(&self.grid, self.grid.coords(bmu.index), radius);
                self.strategy.rule.apply(&mut self.weights, sample, &h, eta);
            }
            self.quantization_error.push(total_qe);

            let report = IterationReport {
                iteration,
                iterations,
                learning_rate: Some(eta),
                radius,
                quantization_error: total_qe,
            };
            log_iteration(&report);
            on_iteration(&report);
        }

        Ok(())
    }
}

pub(crate) fn log_iteration(report: &IterationReport) {
    debug!(
        "iter: {:>4} -- eta: {:<8} -- nh: {:<8.5} -- qe: {:.6}",
        report.iteration,
        report
            .learning_rate
            .map(|eta| format!("{:.4}", eta))
            .unwrap_or_else(|| "-".to_string()),
        report.radius,
        report.quantization_error
    );

    if report.iteration % LOG_INTERVAL == 0 || report.iteration + 1 == report.iterations {
        info!(
            "Iteration {}/{}: radius={:.3}, quantization error={:.6}",
            report.iteration + 1,
            report.iterations,
            report.radius,
            report.quantization_error
        );
    }
}
