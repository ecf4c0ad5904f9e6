//! Calibration, prediction and transformation of inputs onto the lattice.

use crate::error::{KohonenError, Result};
use crate::som::{winner, Som};
use log::{info, warn};
use ndarray::ArrayView2;

impl<L: Clone> Som<L> {
    /// Labels every unit with the target of its best-matching sample.
    ///
    /// The search runs over samples for each unit, so every unit receives a
    /// label even if it never wins for any sample. Calling this again
    /// overwrites the previous calibration.
    pub fn calibrate(&mut self, data: ArrayView2<'_, f64>, targets: &[L]) -> Result<()> {
        self.check_data(data)?;
        if targets.len() != data.nrows() {
            return Err(KohonenError::Shape(format!(
                "Got {} targets for {} samples",
                targets.len(),
                data.nrows()
            )));
        }

        if data.nrows() < self.total_units() {
            warn!(
                "Calibrating {} units with only {} samples; labels will repeat",
                self.total_units(),
                data.nrows()
            );
        }

        let best = winner::best_samples(data, self.weights.view(), &self.strategy.criterion)?;
        self.calibration = Some(best.into_iter().map(|i| targets[i].clone()).collect());

        info!("Calibrated {} units from {} samples", self.total_units(), data.nrows());
        Ok(())
    }

    /// Predicts a label for every row of `data` from its winning unit.
    ///
    /// Fails with an illegal-state error if the lattice is not calibrated.
    pub fn predict(&self, data: ArrayView2<'_, f64>) -> Result<Vec<L>> {
        let labels = self
            .calibration
            .as_ref()
            .ok_or_else(|| KohonenError::IllegalState("SOM is not calibrated".to_string()))?;

        let bmus = self.transform(data)?;
        Ok(bmus.into_iter().map(|i| labels[i].clone()).collect())
    }
}

impl<L> Som<L> {
    /// Whether `calibrate` has been run.
    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_some()
    }

    /// Label per unit, once calibrated.
    pub fn calibration(&self) -> Option<&[L]> {
        self.calibration.as_deref()
    }

    /// Flat index of the winning unit of every row of `data`.
    ///
    /// Independent of calibration state.
    pub fn transform(&self, data: ArrayView2<'_, f64>) -> Result<Vec<usize>> {
        let (bmus, _) =
            winner::find_winners(data, self.weights.view(), &self.strategy.criterion)?;
        Ok(bmus)
    }

    /// Grid coordinate `(x, y)` of the winning unit of every row of `data`.
    pub fn transform_coords(&self, data: ArrayView2<'_, f64>) -> Result<Vec<(usize, usize)>> {
        Ok(self
            .transform(data)?
            .into_iter()
            .map(|i| self.grid.coords(i))
            .collect())
    }
}
