//! Decay schedules for learning rate and neighborhood radius.

use crate::error::{KohonenError, Result};
use serde::{Deserialize, Serialize};

/// Shape of a decay curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecayKind {
    /// Constant step from `initial` to `final`.
    Linear,
    /// Constant ratio from `initial` to `final`.
    Exponential,
}

/// A finite sequence of `n_iter` values interpolating `initial` to `final`.
///
/// Schedules are pure: `value(t)` depends on nothing but its arguments, so
/// the same schedule can be iterated any number of times.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecaySchedule {
    kind: DecayKind,
    initial: f64,
    final_value: f64,
    n_iter: usize,
}

impl DecaySchedule {
    /// Linear schedule: `initial - t * (initial - final) / (n_iter - 1)`.
    pub fn linear(initial: f64, final_value: f64, n_iter: usize) -> Self {
        Self {
            kind: DecayKind::Linear,
            initial,
            final_value,
            n_iter,
        }
    }

    /// Exponential schedule: `initial * (final / initial)^(t / (n_iter - 1))`.
    ///
    /// Both endpoints must be strictly positive.
    pub fn exponential(initial: f64, final_value: f64, n_iter: usize) -> Result<Self> {
        if !(initial > 0.0 && final_value > 0.0) {
            return Err(KohonenError::Configuration(format!(
                "Exponential decay needs positive endpoints, got {} -> {}",
                initial, final_value
            )));
        }

        Ok(Self {
            kind: DecayKind::Exponential,
            initial,
            final_value,
            n_iter,
        })
    }

    /// Curve shape.
    pub fn kind(&self) -> DecayKind {
        self.kind
    }

    /// Number of samples produced.
    pub fn len(&self) -> usize {
        self.n_iter
    }

    /// True if the schedule produces no samples.
    pub fn is_empty(&self) -> bool {
        self.n_iter == 0
    }

    /// Value at step `t`.
    #[inline]
    pub fn value(&self, t: usize) -> f64 {
        if self.n_iter <= 1 {
            return self.initial;
        }

        let span = (self.n_iter - 1) as f64;
        let t = t as f64;
        match self.kind {
            DecayKind::Linear => self.initial - t * (self.initial - self.final_value) / span,
            DecayKind::Exponential => {
                self.initial * (self.final_value / self.initial).powf(t / span)
            }
        }
    }

    /// Iterates over all `n_iter` values.
    pub fn iter(&self) -> DecayIter {
        DecayIter {
            schedule: *self,
            t: 0,
        }
    }
}

impl IntoIterator for DecaySchedule {
    type Item = f64;
    type IntoIter = DecayIter;

    fn into_iter(self) -> DecayIter {
        self.iter()
    }
}

/// Iterator over the values of a [`DecaySchedule`].
#[derive(Debug, Clone)]
pub struct DecayIter {
    schedule: DecaySchedule,
    t: usize,
}

impl Iterator for DecayIter {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.t >= self.schedule.n_iter {
            return None;
        }
        let value = self.schedule.value(self.t);
        self.t += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.schedule.n_iter.saturating_sub(self.t);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DecayIter {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_endpoints() {
        let schedule = DecaySchedule::linear(0.8, 0.01, 50);
        let values: Vec<f64> = schedule.iter().collect();

        assert_eq!(values.len(), 50);
        assert!((values[0] - 0.8).abs() < 1e-12);
        assert!((values[49] - 0.01).abs() < 1e-12);
        assert!(values.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_linear_single_step() {
        let schedule = DecaySchedule::linear(0.5, 0.01, 1);
        assert_eq!(schedule.iter().collect::<Vec<_>>(), vec![0.5]);
    }

    #[test]
    fn test_exponential_endpoints() {
        let schedule = DecaySchedule::exponential(5.0, 1.0, 20).unwrap();
        let values: Vec<f64> = schedule.iter().collect();

        assert!((values[0] - 5.0).abs() < 1e-12);
        assert!((values[19] - 1.0).abs() < 1e-9);
        assert!(values.windows(2).all(|w| w[1] < w[0]));
        assert!(values.iter().all(|&v| v > 0.0));
    }

    #[test]
    fn test_exponential_rejects_non_positive() {
        assert!(DecaySchedule::exponential(0.0, 1.0, 10).is_err());
        assert!(DecaySchedule::exponential(2.0, 0.0, 10).is_err());
    }

    #[test]
    fn test_restartable() {
        let schedule = DecaySchedule::linear(4.0, 1.0, 4);
        let first: Vec<f64> = schedule.iter().collect();
        let second: Vec<f64> = schedule.into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(first, vec![4.0, 3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_iter_reports_exact_length() {
        let schedule = DecaySchedule::exponential(3.0, 1.0, 5).unwrap();
        let mut iter = schedule.iter();
        assert_eq!(iter.len(), 5);

        iter.next();
        iter.next();
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.count(), 3);
        assert_eq!(DecaySchedule::linear(1.0, 0.5, 0).iter().next(), None);
    }
}
