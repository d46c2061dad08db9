//! Mathematical utilities for constraint and assembly calculations

pub mod sparse;

use nalgebra::{DMatrix, DVector};

// Re-export sparse utilities
pub use sparse::{reverse_cuthill_mckee, SparseMatrixBuilder};

pub type Mat = DMatrix<f64>;
pub type Vec = DVector<f64>;

/// Cross product of two 3D vectors
pub fn cross3(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Euclidean length of a vector
pub fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Index and absolute value of the largest-magnitude component
///
/// Ties resolve to the lowest index, so `argmax_abs(n) == argmax_abs(-n)`.
pub fn argmax_abs(v: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, x) in v.iter().enumerate() {
        let a = x.abs();
        match best {
            Some((_, b)) if a <= b => {}
            _ => best = Some((i, a)),
        }
    }
    best
}

/// Scale a matrix in place, returning it
pub fn scaled(mut m: Mat, factor: f64) -> Mat {
    m *= factor;
    m
}
