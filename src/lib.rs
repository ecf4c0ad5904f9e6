//! # Kohonen - Self-Organizing Map Engine
//!
//! Kohonen trains Self-Organizing Maps: a 2D lattice of prototype vectors that
//! learns a topology-preserving embedding of high-dimensional data through
//! competitive, winner-take-all updates with a shrinking neighborhood.
//!
//! ## Key Features
//!
//! - **Incremental training**: per-sample updates, reshuffled every iteration
//! - **Batch training**: deterministic kernel-smoothed re-estimates
//! - **Dot-product variant**: inner-product winners, prototypes on the unit sphere
//! - **Pluggable metrics**: Euclidean, squared Euclidean, city-block, Chebyshev, cosine
//! - **Calibration**: label units from a reference set and classify new inputs
//! - **Binary snapshots** for persistence
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kohonen::{Som, SomConfig, TrainingMode};
//! use ndarray::array;
//!
//! let config = SomConfig {
//!     dx: 10,
//!     dy: 10,
//!     dw: 2,
//!     mode: TrainingMode::Batch,
//!     seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let mut som: Som = Som::new(&config)?;
//! let data = array![[0.0, 0.1], [0.9, 1.0], [0.1, 0.0]];
//! som.fit(data.view())?;
//!
//! println!("quantization error: {:?}", som.quantization_error());
//! let bmus = som.transform(data.view())?;
//! ```
//!
//! ## Architecture
//!
//! - [`config`] - Training configuration and validation
//! - [`som`] - Lattice state, winner search, neighborhoods, decay, training
//! - [`storage`] - Binary snapshot format

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod som;
pub mod storage;

// Re-export commonly used types
pub use config::{InitPolicy, SomConfig, TrainingMode, Variant, FINAL_LEARNING_RATE, FINAL_RADIUS};
pub use error::{KohonenError, Result};
pub use som::{
    DecayKind, DecaySchedule, DistanceMetric, Grid, IterationReport, Match, Som, Strategy,
    UpdateRule, WinnerCriterion, Winners,
};
pub use storage::SnapshotFormat;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_final_value_constants() {
        assert!((FINAL_LEARNING_RATE - 0.01).abs() < 1e-12);
        assert!((FINAL_RADIUS - 1.0).abs() < 1e-12);
    }
}
