//! Winner criterion and update rule pairs for the SOM variants.

use crate::config::Variant;
use crate::som::DistanceMetric;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Norms at or below this are treated as zero.
const NORM_EPSILON: f64 = 1e-12;

/// How the best-matching unit is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinnerCriterion {
    /// Smallest distance under the metric wins.
    MinDistance(DistanceMetric),
    /// Largest inner product wins.
    MaxInnerProduct,
}

/// How prototypes move towards a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateRule {
    /// `w <- w + eta * h * (x - w)`.
    Attract,
    /// `w <- normalize(w + eta * h * x)`; rows stay on the unit sphere. A row
    /// whose sum vanishes keeps its previous direction.
    NormalizedSum,
}

/// A winner criterion paired with its update rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    /// Winner criterion.
    pub criterion: WinnerCriterion,
    /// Update rule.
    pub rule: UpdateRule,
}

impl Strategy {
    /// Strategy for a configured variant.
    pub fn for_variant(variant: Variant, metric: DistanceMetric) -> Self {
        match variant {
            Variant::Standard => Self {
                criterion: WinnerCriterion::MinDistance(metric),
                rule: UpdateRule::Attract,
            },
            Variant::DotProduct => Self {
                criterion: WinnerCriterion::MaxInnerProduct,
                rule: UpdateRule::NormalizedSum,
            },
        }
    }
}

impl UpdateRule {
    /// Moves every row of `weights` towards `sample`, scaled by `eta` and the
    /// per-unit neighborhood weight.
    pub fn apply(
        &self,
        weights: &mut Array2<f64>,
        sample: ArrayView1<'_, f64>,
        neighborhood: &Array1<f64>,
        eta: f64,
    ) {
        debug_assert_eq!(weights.nrows(), neighborhood.len());

        for (mut row, &h) in weights.rows_mut().into_iter().zip(neighborhood.iter()) {
            let influence = eta * h;
            match self {
                UpdateRule::Attract => {
                    row.zip_mut_with(&sample, |w, &x| *w += influence * (x - *w));
                }
                UpdateRule::NormalizedSum => {
                    let mut next = row.to_owned();
                    next.scaled_add(influence, &sample);
                    let norm = next.dot(&next).sqrt();
                    // A sum that cancels out has no direction; keep the old one.
                    if norm > NORM_EPSILON {
                        next /= norm;
                        row.assign(&next);
                    }
                }
            }
        }
    }
}

/// Scales a vector to unit length. Zero vectors are left untouched.
pub fn normalize(mut v: ndarray::ArrayViewMut1<'_, f64>) {
    let norm = v.dot(&v).sqrt();
    if norm > NORM_EPSILON {
        v.mapv_inplace(|w| w / norm);
    }
}
