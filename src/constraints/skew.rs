//! DOF partition and transformation for skew boundaries
//!
//! Given a unit normal `n` (one component per spatial dimension `dim`)
//! and a node with `ndf` DOFs, the largest normal component `k` picks the
//! translational axis that anchors the relation. The first `dim` DOFs are
//! translations, the remaining `ndf - dim` are rotations.
//!
//! Symmetry: the translation is confined to the plane (`u . n = 0`), so
//! `u_k` is constrained with `Ccr[k][j] = -n_j / n_k`. The rotation vector
//! must stay parallel to `n`; with three rotations the two axes other than
//! `k` are constrained to the retained rotation `k`
//! (`theta_a = n_a / n_k * theta_k`). A single (out-of-plane) rotation is
//! constrained to zero.
//!
//! Antisymmetry swaps the two relations: the translation stays parallel
//! to `n` and the rotation is confined to the plane.

use log::warn;

use crate::error::{FEAError, FEAResult};
use crate::math::{argmax_abs, Mat};

/// Which side of the boundary condition a skew constraint enforces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SkewKind {
    Symmetry,
    AntiSymmetry,
}

/// Constrained/retained partition plus `Ccr`
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Transform {
    pub constrained: Vec<usize>,
    pub retained: Vec<usize>,
    pub ccr: Mat,
}

/// Index of the largest-magnitude normal component
pub(crate) fn anchor_axis(normal: &[f64]) -> FEAResult<usize> {
    match argmax_abs(normal) {
        Some((k, max)) if max > 0.0 && max.is_finite() => Ok(k),
        _ => Err(FEAError::DegenerateNormal(format!(
            "normal {:?} has a zero maximum component",
            normal
        ))),
    }
}

/// Rotational DOFs that travel with the anchor axis `k`
fn paired_rotations(k: usize, dim: usize, nrot: usize) -> Vec<usize> {
    match nrot {
        0 => vec![],
        1 => vec![dim],
        3 => (0..3).filter(|&a| a != k).map(|a| dim + a).collect(),
        _ => {
            warn!(
                "node has {} rotational DOFs; only 1 or 3 take part in a skew constraint",
                nrot
            );
            vec![]
        }
    }
}

fn complement(set: &[usize], ndf: usize) -> Vec<usize> {
    (0..ndf).filter(|i| !set.contains(i)).collect()
}

pub(crate) fn compute(kind: SkewKind, normal: &[f64], ndf: usize) -> FEAResult<Transform> {
    let dim = normal.len();
    if ndf < dim {
        return Err(FEAError::InvalidGeometry(format!(
            "node with {} DOFs cannot carry a {}D skew constraint",
            ndf, dim
        )));
    }
    let k = anchor_axis(normal)?;
    let nrot = ndf - dim;

    let mut anchored = vec![k];
    anchored.extend(paired_rotations(k, dim, nrot));
    anchored.sort_unstable();

    let (constrained, retained) = match kind {
        SkewKind::Symmetry => {
            let retained = complement(&anchored, ndf);
            (anchored, retained)
        }
        SkewKind::AntiSymmetry => {
            let constrained = complement(&anchored, ndf);
            (constrained, anchored)
        }
    };

    let mut ccr = Mat::zeros(constrained.len(), retained.len());
    for (row, &i) in constrained.iter().enumerate() {
        for (col, &j) in retained.iter().enumerate() {
            ccr[(row, col)] = coupling(kind, normal, k, dim, nrot, i, j);
        }
    }

    Ok(Transform {
        constrained,
        retained,
        ccr,
    })
}

/// Entry of `Ccr` relating constrained DOF `i` to retained DOF `j`
fn coupling(kind: SkewKind, n: &[f64], k: usize, dim: usize, nrot: usize, i: usize, j: usize) -> f64 {
    if i < dim && j < dim {
        return match kind {
            SkewKind::Symmetry if i == k => -n[j] / n[k],
            SkewKind::AntiSymmetry if j == k => n[i] / n[k],
            _ => 0.0,
        };
    }

    // Rotation-to-rotation terms exist only for a full set of three axes.
    // Translation-rotation cross terms stay zero.
    if nrot != 3 || i < dim || j < dim {
        return 0.0;
    }
    let component = |axis: usize| n.get(axis).copied().unwrap_or(0.0);
    let (a, b) = (i - dim, j - dim);
    match kind {
        SkewKind::Symmetry if b == k => component(a) / n[k],
        SkewKind::AntiSymmetry if a == k => -component(b) / n[k],
        _ => 0.0,
    }
}
