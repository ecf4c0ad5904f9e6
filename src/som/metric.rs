//! Distance metrics between input vectors and prototype vectors.

use crate::error::{KohonenError, Result};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pairwise distance between two vectors of equal length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// L2 distance.
    Euclidean,
    /// Squared L2 distance.
    SqEuclidean,
    /// L1 (city-block / Manhattan) distance.
    Cityblock,
    /// L-infinity distance.
    Chebyshev,
    /// One minus the cosine of the angle between the vectors.
    Cosine,
}

impl DistanceMetric {
    /// Computes the distance between `a` and `b`.
    pub fn distance(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        debug_assert_eq!(a.len(), b.len(), "Vector lengths must match");

        match self {
            DistanceMetric::Euclidean => squared_l2(a, b).sqrt(),
            DistanceMetric::SqEuclidean => squared_l2(a, b),
            DistanceMetric::Cityblock => a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum(),
            DistanceMetric::Chebyshev => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y).abs())
                .fold(0.0, f64::max),
            DistanceMetric::Cosine => {
                let norm_a = a.dot(&a).sqrt();
                let norm_b = b.dot(&b).sqrt();
                if norm_a < 1e-300 || norm_b < 1e-300 {
                    // No direction to compare.
                    1.0
                } else {
                    1.0 - a.dot(&b) / (norm_a * norm_b)
                }
            }
        }
    }

    /// Canonical name, as accepted by `FromStr`.
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::SqEuclidean => "sqeuclidean",
            DistanceMetric::Cityblock => "cityblock",
            DistanceMetric::Chebyshev => "chebyshev",
            DistanceMetric::Cosine => "cosine",
        }
    }
}

#[inline]
fn squared_l2(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

impl Default for DistanceMetric {
    fn default() -> Self {
        DistanceMetric::Euclidean
    }
}

impl FromStr for DistanceMetric {
    type Err = KohonenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" | "l2" => Ok(DistanceMetric::Euclidean),
            "sqeuclidean" => Ok(DistanceMetric::SqEuclidean),
            "cityblock" | "manhattan" | "l1" => Ok(DistanceMetric::Cityblock),
            "chebyshev" => Ok(DistanceMetric::Chebyshev),
            "cosine" => Ok(DistanceMetric::Cosine),
            other => Err(KohonenError::Configuration(format!(
                "Unknown distance metric '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
