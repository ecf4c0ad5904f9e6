//! Self-Organizing Map lattice state.

use crate::config::{perfect_square_root, InitPolicy, SomConfig, Variant};
use crate::error::{KohonenError, Result};
use crate::som::strategy::normalize;
use crate::som::winner::{self, Match, Winners};
use crate::som::{Grid, Strategy};
use log::debug;
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, ArrayViewD};
use rand::distributions::{Distribution, Uniform};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::Dirichlet;
use serde::{Deserialize, Serialize};

/// Dirichlet concentration of the off-diagonal entries of a simplex block.
const SIMPLEX_ALPHA: f64 = 500.0;

/// Dirichlet concentration of the diagonal entry of a simplex block.
const SIMPLEX_ALPHA_DIAGONAL: f64 = 1000.0;

/// A Self-Organizing Map.
///
/// The lattice is a `dx` by `dy` grid of units, each holding a prototype
/// vector of length `dw`. Besides the weights it tracks how often each unit
/// won, the quantization error of every training iteration, the winner
/// trajectory of incremental training, and an optional label per unit set by
/// calibration.
///
/// `L` is the label type used by calibration and prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Som<L = String> {
    pub(crate) config: SomConfig,
    pub(crate) grid: Grid,
    pub(crate) strategy: Strategy,
    /// Prototype vectors, one row per unit.
    pub(crate) weights: Array2<f64>,
    /// Number of times each unit was the winner during training.
    pub(crate) winner_histogram: Array1<u64>,
    /// Aggregate quantization error, one entry per completed iteration.
    pub(crate) quantization_error: Vec<f64>,
    /// Winner of every sample processed by incremental training.
    pub(crate) trajectory: Vec<usize>,
    /// Label per unit, present once calibrated.
    pub(crate) calibration: Option<Vec<L>>,
    pub(crate) rng: ChaCha8Rng,
}

impl<L> Som<L> {
    /// Creates a new lattice with weights drawn according to `config.init`.
    ///
    /// Fails with a configuration error before any allocation if the
    /// configuration is invalid.
    pub fn new(config: &SomConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let n_units = config.total_units();
        let mut weights = match config.init {
            InitPolicy::Uniform => uniform_weights(n_units, config.dw, &mut rng),
            InitPolicy::Simplex => simplex_weights(n_units, config.dw, &mut rng)?,
        };

        if config.variant == Variant::DotProduct {
            for row in weights.rows_mut() {
                normalize(row);
            }
        }

        let grid = if config.toroidal {
            Grid::toroidal(config.dx, config.dy)
        } else {
            Grid::new(config.dx, config.dy)
        };

        debug!(
            "Initialized {}x{}x{} lattice ({} init, {} variant)",
            config.dx, config.dy, config.dw, config.init, config.variant
        );

        Ok(Self {
            config: config.clone(),
            grid,
            strategy: Strategy::for_variant(config.variant, config.metric),
            weights,
            winner_histogram: Array1::zeros(n_units),
            quantization_error: Vec::new(),
            trajectory: Vec::new(),
            calibration: None,
            rng,
        })
    }

    /// The configuration the lattice was built from.
    pub fn config(&self) -> &SomConfig {
        &self.config
    }

    /// Grid topology.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Winner criterion and update rule.
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Lattice dimensions `(dx, dy, dw)`.
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.config.dx, self.config.dy, self.config.dw)
    }

    /// Returns the total number of units.
    #[inline]
    pub fn total_units(&self) -> usize {
        self.grid.len()
    }

    /// Weight vector length.
    #[inline]
    pub fn weight_dim(&self) -> usize {
        self.config.dw
    }

    /// The `n_units x dw` weight matrix.
    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    /// Prototype vector of one unit.
    pub fn unit(&self, index: usize) -> Option<ArrayView1<'_, f64>> {
        (index < self.total_units()).then(|| self.weights.row(index))
    }

    /// Replaces the weight matrix. The shape must stay `n_units x dw`.
    pub fn set_weights(&mut self, weights: Array2<f64>) -> Result<()> {
        if weights.dim() != self.weights.dim() {
            return Err(KohonenError::Shape(format!(
                "Weight matrix must be {:?}, got {:?}",
                self.weights.dim(),
                weights.dim()
            )));
        }
        self.weights = weights;
        Ok(())
    }

    /// How often each unit won during training.
    pub fn winner_histogram(&self) -> &Array1<u64> {
        &self.winner_histogram
    }

    /// Quantization error of every completed iteration.
    pub fn quantization_error(&self) -> &[f64] {
        &self.quantization_error
    }

    /// Winner of every sample processed by incremental training, in order.
    pub fn trajectory(&self) -> &[usize] {
        &self.trajectory
    }

    /// Finds the best-matching unit of one input vector.
    pub fn find_bmu(&self, input: ArrayView1<'_, f64>) -> Result<Match> {
        if input.len() != self.weight_dim() {
            return Err(KohonenError::Shape(format!(
                "Input dimension {} does not match weight dimension {}",
                input.len(),
                self.weight_dim()
            )));
        }
        Ok(winner::best_match(input, self.weights.view(), &self.strategy.criterion))
    }

    /// Winner search on a single vector or a batch of rows.
    pub fn winners(&self, input: ArrayViewD<'_, f64>) -> Result<Winners> {
        winner::find_winners_dyn(input, self.weights.view(), &self.strategy.criterion)
    }

    /// The `k` best units for an input, best first.
    pub fn find_k_nearest(&self, input: ArrayView1<'_, f64>, k: usize) -> Result<Vec<(usize, f64)>> {
        winner::k_nearest(input, self.weights.view(), &self.strategy.criterion, k)
    }

    /// Groups the rows of `data` by their winning unit.
    pub fn distribute(&self, data: ArrayView2<'_, f64>) -> Result<Vec<Vec<usize>>> {
        let (bmus, _) =
            winner::find_winners(data, self.weights.view(), &self.strategy.criterion)?;
        Ok(winner::distribute(&bmus, self.total_units()))
    }

    pub(crate) fn check_data(&self, data: ArrayView2<'_, f64>) -> Result<()> {
        if data.nrows() == 0 {
            return Err(KohonenError::Shape("Input data has no rows".to_string()));
        }
        if data.ncols() != self.weight_dim() {
            return Err(KohonenError::Shape(format!(
                "Input dimension {} does not match weight dimension {}",
                data.ncols(),
                self.weight_dim()
            )));
        }
        Ok(())
    }
}

fn uniform_weights<R: Rng>(n_units: usize, dw: usize, rng: &mut R) -> Array2<f64> {
    let uniform = Uniform::new(0.0, 1.0);
    Array2::from_shape_fn((n_units, dw), |_| rng.sample(uniform))
}

/// Rows of `d` concatenated `d`-dimensional Dirichlet samples, `dw = d * d`.
///
/// Block `b` of every row is drawn with a concentration that doubles at
/// position `b`, so the blocks read as rows of a diagonally dominant
/// stochastic matrix.
fn simplex_weights<R: Rng>(n_units: usize, dw: usize, rng: &mut R) -> Result<Array2<f64>> {
    let d = perfect_square_root(dw).ok_or_else(|| {
        KohonenError::Configuration(format!(
            "Weight vector (len={}) must be reshapeable to a square matrix",
            dw
        ))
    })?;

    if d == 1 {
        return Ok(Array2::ones((n_units, 1)));
    }

    let mut weights = Array2::zeros((n_units, dw));
    for block in 0..d {
        let mut alpha = vec![SIMPLEX_ALPHA; d];
        alpha[block] = SIMPLEX_ALPHA_DIAGONAL;
        let dirichlet =
            Dirichlet::new(&alpha).map_err(|e| KohonenError::Configuration(e.to_string()))?;

        for mut row in weights.rows_mut() {
            let sample: Vec<f64> = dirichlet.sample(rng);
            row.slice_mut(s![block * d..(block + 1) * d])
                .assign(&ArrayView1::from(&sample[..]));
        }
    }
    Ok(weights)
}
