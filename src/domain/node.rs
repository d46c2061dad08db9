//! Node - a point carrying degrees of freedom

use serde::{Deserialize, Serialize};

use crate::error::{FEAError, FEAResult};
use crate::math::{Mat, Vec as FEVec};

/// A node in the finite element domain
///
/// The first `dim()` DOFs are translations, any further DOFs are
/// rotations (one in 2D frames, three in 3D frames).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    tag: i32,
    /// Coordinates, one per spatial dimension
    coords: Vec<f64>,
    /// Number of degrees of freedom
    ndf: usize,
    /// Lumped nodal mass (ndf x ndf)
    mass: Mat,
    /// Optional nodal damping (ndf x ndf)
    damping: Option<Mat>,
    /// Unbalanced nodal load
    load: FEVec,
    /// Trial displacement
    trial_disp: FEVec,

    /// Tag of the DOF group currently numbering this node
    #[serde(skip)]
    dof_group: Option<i32>,
}

impl Node {
    /// Create a node with `ndf` degrees of freedom at the given coordinates
    pub fn new(tag: i32, coords: &[f64], ndf: usize) -> FEAResult<Self> {
        if coords.is_empty() || coords.len() > 3 {
            return Err(FEAError::InvalidGeometry(format!(
                "node {} has {} coordinates, expected 1 to 3",
                tag,
                coords.len()
            )));
        }
        if ndf == 0 {
            return Err(FEAError::InvalidSize(ndf));
        }
        Ok(Self {
            tag,
            coords: coords.to_vec(),
            ndf,
            mass: Mat::zeros(ndf, ndf),
            damping: None,
            load: FEVec::zeros(ndf),
            trial_disp: FEVec::zeros(ndf),
            dof_group: None,
        })
    }

    /// 2D node with translations `ux, uy`
    pub fn planar(tag: i32, x: f64, y: f64) -> Self {
        Self::fixed_size(tag, vec![x, y], 2)
    }

    /// 2D frame node with `ux, uy, rz`
    pub fn planar_frame(tag: i32, x: f64, y: f64) -> Self {
        Self::fixed_size(tag, vec![x, y], 3)
    }

    /// 3D frame node with `ux, uy, uz, rx, ry, rz`
    pub fn spatial_frame(tag: i32, x: f64, y: f64, z: f64) -> Self {
        Self::fixed_size(tag, vec![x, y, z], 6)
    }

    fn fixed_size(tag: i32, coords: Vec<f64>, ndf: usize) -> Self {
        Self {
            tag,
            coords,
            ndf,
            mass: Mat::zeros(ndf, ndf),
            damping: None,
            load: FEVec::zeros(ndf),
            trial_disp: FEVec::zeros(ndf),
            dof_group: None,
        }
    }

    /// Set a full nodal mass matrix
    pub fn with_mass(mut self, mass: Mat) -> FEAResult<Self> {
        check_square(&mass, self.ndf)?;
        self.mass = mass;
        Ok(self)
    }

    /// Lumped translational mass `m` on every translational DOF
    pub fn with_lumped_mass(mut self, m: f64) -> Self {
        for i in 0..self.dim().min(self.ndf) {
            self.mass[(i, i)] = m;
        }
        self
    }

    /// Set a nodal damping matrix
    pub fn with_damping(mut self, damping: Mat) -> FEAResult<Self> {
        check_square(&damping, self.ndf)?;
        self.damping = Some(damping);
        Ok(self)
    }

    pub fn tag(&self) -> i32 {
        self.tag
    }

    /// Number of degrees of freedom
    pub fn ndf(&self) -> usize {
        self.ndf
    }

    /// Spatial dimension (number of coordinates)
    pub fn dim(&self) -> usize {
        self.coords.len()
    }

    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    /// Calculate distance to another node
    pub fn distance_to(&self, other: &Node) -> f64 {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .map(|(a, b)| (b - a) * (b - a))
            .sum::<f64>()
            .sqrt()
    }

    pub fn mass(&self) -> &Mat {
        &self.mass
    }

    /// Nodal damping, zero when none was assigned
    pub fn damping(&self) -> Mat {
        self.damping
            .clone()
            .unwrap_or_else(|| Mat::zeros(self.ndf, self.ndf))
    }

    /// Unbalanced nodal load
    pub fn unbalanced_load(&self) -> &FEVec {
        &self.load
    }

    /// Add `factor * load` to the unbalanced load
    pub fn add_unbalanced_load(&mut self, load: &[f64], factor: f64) -> FEAResult<()> {
        if load.len() != self.ndf {
            return Err(FEAError::ShapeMismatch {
                expected: format!("load of length {}", self.ndf),
                found: format!("length {}", load.len()),
            });
        }
        for (i, p) in load.iter().enumerate() {
            self.load[i] += factor * p;
        }
        Ok(())
    }

    pub fn zero_unbalanced_load(&mut self) {
        self.load.fill(0.0);
    }

    pub fn trial_disp(&self) -> &FEVec {
        &self.trial_disp
    }

    pub fn set_trial_disp(&mut self, disp: &FEVec) -> FEAResult<()> {
        if disp.len() != self.ndf {
            return Err(FEAError::ShapeMismatch {
                expected: format!("displacement of length {}", self.ndf),
                found: format!("length {}", disp.len()),
            });
        }
        self.trial_disp.copy_from(disp);
        Ok(())
    }

    /// Tag of the DOF group numbering this node, if any
    pub fn dof_group(&self) -> Option<i32> {
        self.dof_group
    }

    pub(crate) fn set_dof_group(&mut self, group: Option<i32>) {
        self.dof_group = group;
    }
}

fn check_square(m: &Mat, n: usize) -> FEAResult<()> {
    if m.nrows() != n || m.ncols() != n {
        return Err(FEAError::ShapeMismatch {
            expected: format!("{}x{}", n, n),
            found: format!("{}x{}", m.nrows(), m.ncols()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let node = Node::new(1, &[1.0, 2.0, 3.0], 6).unwrap();
        assert_eq!(node.tag(), 1);
        assert_eq!(node.dim(), 3);
        assert_eq!(node.ndf(), 6);
        assert!(node.dof_group().is_none());
    }

    #[test]
    fn test_node_rejects_bad_input() {
        assert!(matches!(Node::new(1, &[], 2), Err(FEAError::InvalidGeometry(_))));
        assert!(matches!(Node::new(1, &[0.0, 0.0], 0), Err(FEAError::InvalidSize(0))));
    }

    #[test]
    fn test_node_distance() {
        let n1 = Node::planar(1, 0.0, 0.0);
        let n2 = Node::planar(2, 3.0, 4.0);
        assert!((n1.distance_to(&n2) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_lumped_mass_is_translational_only() {
        let node = Node::planar_frame(1, 0.0, 0.0).with_lumped_mass(2.5);
        assert_eq!(node.mass()[(0, 0)], 2.5);
        assert_eq!(node.mass()[(1, 1)], 2.5);
        assert_eq!(node.mass()[(2, 2)], 0.0);
    }

    #[test]
    fn test_mass_shape_is_checked() {
        let result = Node::planar(1, 0.0, 0.0).with_mass(Mat::identity(3, 3));
        assert!(matches!(result, Err(FEAError::ShapeMismatch { .. })));
    }
}
