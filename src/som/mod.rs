//! Self-Organizing Map (SOM) module.
//!
//! The lattice state lives in [`Som`]; the pieces it is built from are
//! independent and pure:
//!
//! - **Grid**: coordinate enumeration and grid distances (grid.rs)
//! - **Decay**: learning-rate and radius schedules (decay.rs)
//! - **Metric**: distances between inputs and prototypes (metric.rs)
//! - **Neighborhood**: Gaussian influence around a winner (neighborhood.rs)
//! - **Winner search**: best-matching units (winner.rs)
//! - **Strategy**: winner criterion and update rule per variant (strategy.rs)
//!
//! Training is split into incremental (training.rs) and batch (batch.rs)
//! regimes; calibration.rs and quality.rs work on a trained lattice.

mod batch;
mod calibration;
pub mod decay;
pub mod grid;
mod lattice;
pub mod metric;
pub mod neighborhood;
mod quality;
pub mod strategy;
pub mod training;
pub mod winner;

pub use decay::{DecayIter, DecayKind, DecaySchedule};
pub use grid::Grid;
pub use lattice::Som;
pub use metric::DistanceMetric;
pub use strategy::{Strategy, UpdateRule, WinnerCriterion};
pub use training::IterationReport;
pub use winner::{Match, Winners};
