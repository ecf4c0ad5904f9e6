//! Lattice topology: coordinate enumeration and grid distances.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// A `dx` by `dy` rectangular grid of units.
///
/// Units are enumerated in row-major order: flat index `i` maps to
/// `(i / dy, i % dy)`. This is the canonical mapping used by every other
/// component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    dx: usize,
    dy: usize,
    toroidal: bool,
}

impl Grid {
    /// Creates a bounded grid.
    pub fn new(dx: usize, dy: usize) -> Self {
        Self {
            dx,
            dy,
            toroidal: false,
        }
    }

    /// Creates a grid whose edges wrap around.
    pub fn toroidal(dx: usize, dy: usize) -> Self {
        Self {
            dx,
            dy,
            toroidal: true,
        }
    }

    /// Grid width.
    #[inline]
    pub fn dx(&self) -> usize {
        self.dx
    }

    /// Grid height.
    #[inline]
    pub fn dy(&self) -> usize {
        self.dy
    }

    /// Whether distances wrap around the edges.
    #[inline]
    pub fn is_toroidal(&self) -> bool {
        self.toroidal
    }

    /// Total number of units.
    #[inline]
    pub fn len(&self) -> usize {
        self.dx * self.dy
    }

    /// True for a grid without units.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Center unit of the grid.
    #[inline]
    pub fn center(&self) -> (usize, usize) {
        (self.dx / 2, self.dy / 2)
    }

    /// Converts a flat index to its `(x, y)` coordinate.
    #[inline]
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index / self.dy, index % self.dy)
    }

    /// Converts an `(x, y)` coordinate to its flat index.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        x * self.dy + y
    }

    /// All coordinates as an `n_units x 2` array, row-major.
    pub fn coordinates(&self) -> Array2<usize> {
        Array2::from_shape_fn((self.len(), 2), |(i, axis)| {
            let (x, y) = self.coords(i);
            if axis == 0 {
                x
            } else {
                y
            }
        })
    }

    /// Iterates over `(x, y)` in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.len()).map(move |i| self.coords(i))
    }

    /// Squared Euclidean distance between two coordinates in grid space.
    #[inline]
    pub fn distance_squared(&self, a: (usize, usize), b: (usize, usize)) -> f64 {
        let dr = axis_offset(a.0, b.0, self.dx, self.toroidal);
        let dc = axis_offset(a.1, b.1, self.dy, self.toroidal);
        dr * dr + dc * dc
    }

    /// In-bounds von Neumann neighbours of a unit (wrapped on a torus).
    pub fn neighbors4(&self, index: usize) -> Vec<usize> {
        let (x, y) = self.coords(index);
        let (x, y) = (x as isize, y as isize);
        let mut out = Vec::with_capacity(4);

        for (ox, oy) in [(-1isize, 0isize), (1, 0), (0, -1), (0, 1)] {
            if let Some(n) = self.offset(x + ox, y + oy) {
                if n != index && !out.contains(&n) {
                    out.push(n);
                }
            }
        }
        out
    }

    /// True if two units touch, diagonals included.
    pub fn are_adjacent(&self, a: usize, b: usize) -> bool {
        let (ax, ay) = self.coords(a);
        let (bx, by) = self.coords(b);
        let dr = axis_offset(ax, bx, self.dx, self.toroidal);
        let dc = axis_offset(ay, by, self.dy, self.toroidal);
        dr <= 1.0 && dc <= 1.0
    }

    fn offset(&self, x: isize, y: isize) -> Option<usize> {
        let (dx, dy) = (self.dx as isize, self.dy as isize);
        if self.toroidal {
            Some(self.index(x.rem_euclid(dx) as usize, y.rem_euclid(dy) as usize))
        } else if x < 0 || x >= dx || y < 0 || y >= dy {
            None
        } else {
            Some(self.index(x as usize, y as usize))
        }
    }
}

#[inline]
fn axis_offset(a: usize, b: usize, extent: usize, toroidal: bool) -> f64 {
    let d = (a as i64 - b as i64).abs();
    if toroidal {
        d.min(extent as i64 - d) as f64
    } else {
        d as f64
    }
}
