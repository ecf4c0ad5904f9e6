//! Best-matching unit search.
//!
//! Ties are resolved by taking the first best index in enumeration order, so
//! the search is fully deterministic.

use crate::error::{KohonenError, Result};
use crate::som::WinnerCriterion;
use ndarray::{Array1, ArrayView1, ArrayView2, ArrayViewD, Ix1, Ix2};
use rayon::prelude::*;

/// Best-matching unit for a single input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    /// Flat index of the winning unit.
    pub index: usize,
    /// Squared distance to the winner. Always zero for inner-product search.
    pub error: f64,
}

/// Result of a winner search on a vector or a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Winners {
    /// A single input vector.
    Single {
        /// Winning unit.
        index: usize,
        /// Per-unit squared distances, or inner products for inner-product search.
        scores: Array1<f64>,
    },
    /// A batch of input rows.
    Batch {
        /// Winning unit per row.
        indices: Vec<usize>,
        /// Sum of the per-row squared winner distances.
        error: f64,
    },
}

/// Per-unit scores of `input`: squared distances, or inner products.
pub fn scores(
    input: ArrayView1<'_, f64>,
    weights: ArrayView2<'_, f64>,
    criterion: &WinnerCriterion,
) -> Array1<f64> {
    match criterion {
        WinnerCriterion::MinDistance(metric) => weights
            .rows()
            .into_iter()
            .map(|w| metric.distance(input, w).powi(2))
            .collect(),
        WinnerCriterion::MaxInnerProduct => weights.dot(&input),
    }
}

/// Finds the best-matching unit of one input vector.
pub fn best_match(
    input: ArrayView1<'_, f64>,
    weights: ArrayView2<'_, f64>,
    criterion: &WinnerCriterion,
) -> Match {
    match criterion {
        WinnerCriterion::MinDistance(metric) => {
            let (index, dist) =
                first_min(weights.rows().into_iter().map(|w| metric.distance(input, w)));
            Match {
                index,
                error: dist * dist,
            }
        }
        WinnerCriterion::MaxInnerProduct => {
            let (index, _) = first_max(weights.rows().into_iter().map(|w| w.dot(&input)));
            Match { index, error: 0.0 }
        }
    }
}

/// Single-vector winner search: winning index and the per-unit scores.
pub fn find_winner(
    input: ArrayView1<'_, f64>,
    weights: ArrayView2<'_, f64>,
    criterion: &WinnerCriterion,
) -> Result<(usize, Array1<f64>)> {
    check_width(input.len(), weights.ncols())?;

    let scores = scores(input, weights, criterion);
    let index = match criterion {
        WinnerCriterion::MinDistance(_) => first_min(scores.iter().copied()).0,
        WinnerCriterion::MaxInnerProduct => first_max(scores.iter().copied()).0,
    };
    Ok((index, scores))
}

/// Batch winner search: winner per row and the summed squared winner distance.
///
/// Rows are searched in parallel; results keep row order and the error is
/// summed sequentially, so the outcome matches a sequential search exactly.
pub fn find_winners(
    data: ArrayView2<'_, f64>,
    weights: ArrayView2<'_, f64>,
    criterion: &WinnerCriterion,
) -> Result<(Vec<usize>, f64)> {
    check_batch(data, weights.ncols())?;

    let matches: Vec<Match> = (0..data.nrows())
        .into_par_iter()
        .map(|i| best_match(data.row(i), weights, criterion))
        .collect();

    let error = matches.iter().map(|m| m.error).sum();
    let indices = matches.into_iter().map(|m| m.index).collect();
    Ok((indices, error))
}

/// Winner search on input of unknown dimensionality.
///
/// One-dimensional input is a single vector, two-dimensional input is a batch
/// of rows. Anything else fails with a shape error.
pub fn find_winners_dyn(
    input: ArrayViewD<'_, f64>,
    weights: ArrayView2<'_, f64>,
    criterion: &WinnerCriterion,
) -> Result<Winners> {
    match input.ndim() {
        1 => {
            let vector = input.into_dimensionality::<Ix1>()?;
            let (index, scores) = find_winner(vector, weights, criterion)?;
            Ok(Winners::Single { index, scores })
        }
        2 => {
            let batch = input.into_dimensionality::<Ix2>()?;
            let (indices, error) = find_winners(batch, weights, criterion)?;
            Ok(Winners::Batch { indices, error })
        }
        n => Err(KohonenError::Shape(format!(
            "Wrong dimension of input data: {}",
            n
        ))),
    }
}

/// For every unit, the index of its best-matching sample in `data`.
///
/// This is the transposed search used by calibration: the minimum runs over
/// samples instead of units.
pub fn best_samples(
    data: ArrayView2<'_, f64>,
    weights: ArrayView2<'_, f64>,
    criterion: &WinnerCriterion,
) -> Result<Vec<usize>> {
    check_batch(data, weights.ncols())?;

    Ok(weights
        .rows()
        .into_iter()
        .map(|unit| match criterion {
            WinnerCriterion::MinDistance(metric) => {
                first_min(data.rows().into_iter().map(|x| metric.distance(x, unit))).0
            }
            WinnerCriterion::MaxInnerProduct => {
                first_max(data.rows().into_iter().map(|x| x.dot(&unit))).0
            }
        })
        .collect())
}

/// The `k` best units for `input`, best first, as `(index, score)` pairs.
pub fn k_nearest(
    input: ArrayView1<'_, f64>,
    weights: ArrayView2<'_, f64>,
    criterion: &WinnerCriterion,
    k: usize,
) -> Result<Vec<(usize, f64)>> {
    check_width(input.len(), weights.ncols())?;

    let mut ranked: Vec<(usize, f64)> = scores(input, weights, criterion)
        .iter()
        .copied()
        .enumerate()
        .collect();

    // Stable sort keeps enumeration order among ties.
    match criterion {
        WinnerCriterion::MinDistance(_) => ranked.sort_by(|a, b| a.1.total_cmp(&b.1)),
        WinnerCriterion::MaxInnerProduct => ranked.sort_by(|a, b| b.1.total_cmp(&a.1)),
    }
    ranked.truncate(k);
    Ok(ranked)
}

/// Groups sample indices by their winning unit.
///
/// Entry `u` holds, in sample order, every sample whose winner is `u`.
pub fn distribute(bmus: &[usize], n_units: usize) -> Vec<Vec<usize>> {
    let mut groups = vec![Vec::new(); n_units];
    for (sample, &unit) in bmus.iter().enumerate() {
        if let Some(group) = groups.get_mut(unit) {
            group.push(sample);
        }
    }
    groups
}

fn check_width(width: usize, dw: usize) -> Result<()> {
    if width != dw {
        return Err(KohonenError::Shape(format!(
            "Input dimension {} does not match weight dimension {}",
            width, dw
        )));
    }
    Ok(())
}

fn check_batch(data: ArrayView2<'_, f64>, dw: usize) -> Result<()> {
    if data.nrows() == 0 {
        return Err(KohonenError::Shape("Input data has no rows".to_string()));
    }
    check_width(data.ncols(), dw)
}

/// Index and value of the first minimum. NaN never wins.
#[inline]
fn first_min(values: impl Iterator<Item = f64>) -> (usize, f64) {
    let mut best_idx = 0;
    let mut best = f64::INFINITY;
    for (i, v) in values.enumerate() {
        if v < best {
            best = v;
            best_idx = i;
        }
    }
    (best_idx, best)
}

/// Index and value of the first maximum. NaN never wins.
#[inline]
fn first_max(values: impl Iterator<Item = f64>) -> (usize, f64) {
    let mut best_idx = 0;
    let mut best = f64::NEG_INFINITY;
    for (i, v) in values.enumerate() {
        if v > best {
            best = v;
            best_idx = i;
        }
    }
    (best_idx, best)
}
