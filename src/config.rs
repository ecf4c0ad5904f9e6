//! Configuration for the Kohonen SOM engine.

use crate::error::{KohonenError, Result};
use crate::som::DistanceMetric;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Asymptotic learning-rate floor reached at the last iteration.
pub const FINAL_LEARNING_RATE: f64 = 0.01;

/// Asymptotic neighborhood-radius floor reached at the last iteration.
pub const FINAL_RADIUS: f64 = 1.0;

/// How the lattice is updated during training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingMode {
    /// One update per sample, samples shuffled every iteration.
    Incremental,
    /// One kernel-smoothed re-estimate of the whole lattice per iteration.
    Batch,
}

impl FromStr for TrainingMode {
    type Err = KohonenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "incremental" | "online" => Ok(TrainingMode::Incremental),
            "batch" => Ok(TrainingMode::Batch),
            other => Err(KohonenError::Configuration(format!(
                "Unknown training mode '{}' (expected 'incremental' or 'batch')",
                other
            ))),
        }
    }
}

impl fmt::Display for TrainingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainingMode::Incremental => write!(f, "incremental"),
            TrainingMode::Batch => write!(f, "batch"),
        }
    }
}

/// Weight initialization policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitPolicy {
    /// Every component drawn uniformly from `[0, 1)`.
    Uniform,
    /// Rows built from Dirichlet-sampled stochastic blocks. Needs a square `dw`.
    Simplex,
}

impl FromStr for InitPolicy {
    type Err = KohonenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "uniform" => Ok(InitPolicy::Uniform),
            "simplex" => Ok(InitPolicy::Simplex),
            other => Err(KohonenError::Configuration(format!(
                "Unknown initialization policy '{}' (expected 'uniform' or 'simplex')",
                other
            ))),
        }
    }
}

impl fmt::Display for InitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitPolicy::Uniform => write!(f, "uniform"),
            InitPolicy::Simplex => write!(f, "simplex"),
        }
    }
}

/// SOM flavour: winner criterion plus update rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    /// Distance-minimizing winner, neighborhood-weighted pull towards the input.
    Standard,
    /// Inner-product winner, prototypes kept on the unit hypersphere.
    DotProduct,
}

impl FromStr for Variant {
    type Err = KohonenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "standard" | "som" => Ok(Variant::Standard),
            "dot" | "dotproduct" | "dot-product" => Ok(Variant::DotProduct),
            other => Err(KohonenError::Configuration(format!(
                "Unknown SOM variant '{}' (expected 'standard' or 'dot')",
                other
            ))),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Standard => write!(f, "standard"),
            Variant::DotProduct => write!(f, "dot"),
        }
    }
}

/// Self-Organizing Map configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SomConfig {
    /// Grid width.
    /// Default: 10.
    pub dx: usize,

    /// Grid height.
    /// Default: 10.
    pub dy: usize,

    /// Weight vector length.
    /// Default: 3.
    pub dw: usize,

    /// Initial learning rate, in `[0, 1]`. Unused by batch training.
    /// Default: 0.8.
    pub learning_rate: f64,

    /// Final learning rate.
    /// Default: 0.01.
    pub final_learning_rate: f64,

    /// Initial neighborhood radius in grid units. Must be greater than 1.
    /// Default: 5.
    pub radius: usize,

    /// Final neighborhood radius.
    /// Default: 1.0.
    pub final_radius: f64,

    /// Number of training iterations (passes over the data).
    /// Default: 100.
    pub iterations: usize,

    /// Distance metric used for winner search.
    /// Default: Euclidean.
    pub metric: DistanceMetric,

    /// Training mode.
    /// Default: Incremental.
    pub mode: TrainingMode,

    /// Weight initialization policy.
    /// Default: Uniform.
    pub init: InitPolicy,

    /// SOM variant.
    /// Default: Standard.
    pub variant: Variant,

    /// Use toroidal boundary conditions for grid distances.
    /// Default: false.
    pub toroidal: bool,

    /// Random seed for reproducibility.
    /// Default: None (random).
    pub seed: Option<u64>,
}

impl Default for SomConfig {
    fn default() -> Self {
        Self {
            dx: 10,
            dy: 10,
            dw: 3,
            learning_rate: 0.8,
            final_learning_rate: FINAL_LEARNING_RATE,
            radius: 5,
            final_radius: FINAL_RADIUS,
            iterations: 100,
            metric: DistanceMetric::Euclidean,
            mode: TrainingMode::Incremental,
            init: InitPolicy::Uniform,
            variant: Variant::Standard,
            toroidal: false,
            seed: None,
        }
    }
}

impl SomConfig {
    /// Returns the total number of units in the lattice.
    #[inline]
    pub fn total_units(&self) -> usize {
        self.dx * self.dy
    }

    /// Checks every parameter, failing on the first invalid one.
    pub fn validate(&self) -> Result<()> {
        if self.dx < 1 || self.dy < 1 || self.dw < 1 {
            return Err(KohonenError::Configuration(format!(
                "Dimensions must be integers > 0, got ({}, {}, {})",
                self.dx, self.dy, self.dw
            )));
        }

        if !(0.0..=1.0).contains(&self.learning_rate) {
            return Err(KohonenError::Configuration(format!(
                "Learning rate {} not in [0, 1]",
                self.learning_rate
            )));
        }

        if !(0.0..=1.0).contains(&self.final_learning_rate) {
            return Err(KohonenError::Configuration(format!(
                "Final learning rate {} not in [0, 1]",
                self.final_learning_rate
            )));
        }

        if self.radius <= 1 {
            return Err(KohonenError::Configuration(format!(
                "Neighborhood radius must be an integer > 1, got {}",
                self.radius
            )));
        }

        if !(self.final_radius > 0.0 && self.final_radius.is_finite()) {
            return Err(KohonenError::Configuration(format!(
                "Final radius must be positive, got {}",
                self.final_radius
            )));
        }

        if self.iterations == 0 {
            return Err(KohonenError::Configuration(
                "Number of iterations must be > 0".to_string(),
            ));
        }

        if self.init == InitPolicy::Simplex && perfect_square_root(self.dw).is_none() {
            return Err(KohonenError::Configuration(format!(
                "Weight vector (len={}) must be reshapeable to a square matrix",
                self.dw
            )));
        }

        if self.variant == Variant::DotProduct && self.mode == TrainingMode::Batch {
            return Err(KohonenError::Configuration(
                "Batch training is not defined for the dot-product variant".to_string(),
            ));
        }

        Ok(())
    }
}

/// Returns `d` such that `d * d == n`, if any.
pub(crate) fn perfect_square_root(n: usize) -> Option<usize> {
    let d = (n as f64).sqrt().round() as usize;
    (d * d == n).then_some(d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SomConfig::default();
        assert_eq!(config.total_units(), 100);
        assert_eq!(config.mode, TrainingMode::Incremental);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_dimensions() {
        let config = SomConfig {
            dy: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(KohonenError::Configuration(_))));
    }

    #[test]
    fn test_learning_rate_bounds() {
        for eta in [-0.1, 1.5, f64::NAN] {
            let config = SomConfig {
                learning_rate: eta,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "eta={} accepted", eta);
        }

        let config = SomConfig {
            learning_rate: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_radius_must_exceed_one() {
        let config = SomConfig {
            radius: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_simplex_requires_square_dw() {
        let config = SomConfig {
            dw: 3,
            init: InitPolicy::Simplex,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SomConfig {
            dw: 9,
            init: InitPolicy::Simplex,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_dot_variant_rejects_batch() {
        let config = SomConfig {
            variant: Variant::DotProduct,
            mode: TrainingMode::Batch,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("batch".parse::<TrainingMode>().unwrap(), TrainingMode::Batch);
        assert_eq!("Simplex".parse::<InitPolicy>().unwrap(), InitPolicy::Simplex);
        assert_eq!("dot".parse::<Variant>().unwrap(), Variant::DotProduct);
        assert!("minibatch".parse::<TrainingMode>().is_err());
    }

    #[test]
    fn test_perfect_square_root() {
        assert_eq!(perfect_square_root(1), Some(1));
        assert_eq!(perfect_square_root(16), Some(4));
        assert_eq!(perfect_square_root(15), None);
    }
}
