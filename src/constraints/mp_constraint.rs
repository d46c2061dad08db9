//! Multi-freedom constraints `U_c = Ccr * U_r`

use log::debug;
use serde::{Deserialize, Serialize};

use crate::constraints::geometry::SkewGeometry;
use crate::constraints::skew::{self, SkewKind, Transform};
use crate::domain::Domain;
use crate::error::{FEAError, FEAResult};
use crate::math::Mat;

/// How a constraint derives its DOF partition and `Ccr`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// Explicit DOF sets and matrix supplied by the caller
    GeneralLinear,
    /// Symmetry (skew roller) boundary: motion confined to the plane
    Skew(SkewGeometry),
    /// Antisymmetry boundary: motion normal to the plane only
    AntiSymmetry(SkewGeometry),
}

impl ConstraintKind {
    /// Compute the transform for a constraint against the current domain
    fn compute_transform(
        &self,
        constraint: &MFreedomConstraint,
        domain: &Domain,
    ) -> FEAResult<Transform> {
        let constrained_node = domain.try_node(constraint.constrained_node)?;
        let retained_node = domain.try_node(constraint.retained_node)?;

        match self {
            ConstraintKind::GeneralLinear => {
                for &dof in &constraint.constrained_dofs {
                    check_dof(dof, constrained_node.ndf())?;
                }
                for &dof in &constraint.retained_dofs {
                    check_dof(dof, retained_node.ndf())?;
                }
                Ok(Transform {
                    constrained: constraint.constrained_dofs.clone(),
                    retained: constraint.retained_dofs.clone(),
                    ccr: constraint.ccr.clone(),
                })
            }
            ConstraintKind::Skew(geometry) | ConstraintKind::AntiSymmetry(geometry) => {
                if geometry.dim() != constrained_node.dim() {
                    return Err(FEAError::InvalidGeometry(format!(
                        "{}D boundary applied to {}D node {}",
                        geometry.dim(),
                        constrained_node.dim(),
                        constrained_node.tag()
                    )));
                }
                let normal = geometry.unit_normal()?;
                let kind = match self {
                    ConstraintKind::AntiSymmetry(_) => SkewKind::AntiSymmetry,
                    _ => SkewKind::Symmetry,
                };
                skew::compute(kind, &normal, constrained_node.ndf())
            }
        }
    }
}

fn check_dof(dof: usize, ndf: usize) -> FEAResult<()> {
    if dof >= ndf {
        return Err(FEAError::IndexOutOfRange {
            index: dof,
            size: ndf,
        });
    }
    Ok(())
}

fn check_distinct(dofs: &[usize], what: &str) -> FEAResult<()> {
    for (i, dof) in dofs.iter().enumerate() {
        if dofs[..i].contains(dof) {
            return Err(FEAError::InvalidInput(format!(
                "{} DOF {} listed twice",
                what, dof
            )));
        }
    }
    Ok(())
}

/// A linear multi-freedom constraint between two nodes
///
/// Skew and antisymmetry constraints tie a node to itself, so
/// `constrained_node == retained_node`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MFreedomConstraint {
    tag: i32,
    constrained_node: i32,
    retained_node: i32,
    kind: ConstraintKind,
    constrained_dofs: Vec<usize>,
    retained_dofs: Vec<usize>,
    ccr: Mat,
    #[serde(skip)]
    configured: bool,
}

impl MFreedomConstraint {
    /// Constraint with explicit DOF sets and `Ccr`
    ///
    /// `ccr` must be `constrained_dofs.len() x retained_dofs.len()` with
    /// finite entries.
    pub fn general(
        tag: i32,
        constrained_node: i32,
        retained_node: i32,
        constrained_dofs: Vec<usize>,
        retained_dofs: Vec<usize>,
        ccr: Mat,
    ) -> FEAResult<Self> {
        let (c, r) = (constrained_dofs.len(), retained_dofs.len());
        if ccr.nrows() != c || ccr.ncols() != r {
            return Err(FEAError::ShapeMismatch {
                expected: format!("{}x{}", c, r),
                found: format!("{}x{}", ccr.nrows(), ccr.ncols()),
            });
        }
        if ccr.iter().any(|x| !x.is_finite()) {
            return Err(FEAError::ShapeMismatch {
                expected: "finite entries".to_string(),
                found: "a non-finite entry".to_string(),
            });
        }
        check_distinct(&constrained_dofs, "constrained")?;
        check_distinct(&retained_dofs, "retained")?;
        if constrained_node == retained_node
            && constrained_dofs.iter().any(|d| retained_dofs.contains(d))
        {
            return Err(FEAError::InvalidInput(
                "a DOF cannot be both constrained and retained".to_string(),
            ));
        }

        Ok(Self {
            tag,
            constrained_node,
            retained_node,
            kind: ConstraintKind::GeneralLinear,
            constrained_dofs,
            retained_dofs,
            ccr,
            configured: false,
        })
    }

    /// Symmetry constraint of `node` against a line (2D) or plane (3D)
    pub fn skew(tag: i32, node: i32, geometry: impl Into<SkewGeometry>) -> Self {
        Self::unconfigured(tag, node, ConstraintKind::Skew(geometry.into()))
    }

    /// Antisymmetry constraint of `node` against a line (2D) or plane (3D)
    pub fn antisymmetry(tag: i32, node: i32, geometry: impl Into<SkewGeometry>) -> Self {
        Self::unconfigured(tag, node, ConstraintKind::AntiSymmetry(geometry.into()))
    }

    fn unconfigured(tag: i32, node: i32, kind: ConstraintKind) -> Self {
        Self {
            tag,
            constrained_node: node,
            retained_node: node,
            kind,
            constrained_dofs: vec![],
            retained_dofs: vec![],
            ccr: Mat::zeros(0, 0),
            configured: false,
        }
    }

    /// Resolve nodes and compute the DOF partition and `Ccr`
    ///
    /// Every call recomputes from scratch. On failure the constraint is
    /// left unconfigured.
    pub fn setup(&mut self, domain: &Domain) -> FEAResult<()> {
        self.configured = false;
        let transform = self.kind.compute_transform(self, domain)?;

        debug!(
            "constraint {}: constrained {:?}, retained {:?}",
            self.tag, transform.constrained, transform.retained
        );
        self.constrained_dofs = transform.constrained;
        self.retained_dofs = transform.retained;
        self.ccr = transform.ccr;
        self.configured = true;
        Ok(())
    }

    pub fn tag(&self) -> i32 {
        self.tag
    }

    pub fn kind(&self) -> &ConstraintKind {
        &self.kind
    }

    pub fn constrained_node_tag(&self) -> i32 {
        self.constrained_node
    }

    pub fn retained_node_tag(&self) -> i32 {
        self.retained_node
    }

    /// Local DOF indices at the constrained node
    pub fn constrained_dofs(&self) -> &[usize] {
        &self.constrained_dofs
    }

    /// Local DOF indices at the retained node
    pub fn retained_dofs(&self) -> &[usize] {
        &self.retained_dofs
    }

    /// `Ccr`, constrained x retained
    pub fn constraint_matrix(&self) -> &Mat {
        &self.ccr
    }

    pub fn num_constrained(&self) -> usize {
        self.constrained_dofs.len()
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{Line, Plane};
    use crate::domain::Node;
    use approx::assert_relative_eq;

    fn domain_with(nodes: Vec<Node>) -> Domain {
        let mut domain = Domain::new();
        for node in nodes {
            domain.add_node(node).unwrap();
        }
        domain
    }

    #[test]
    fn test_vertical_symmetry_plane() {
        let domain = domain_with(vec![Node::planar_frame(1, 0.0, 0.0)]);
        let mut mp = MFreedomConstraint::skew(1, 1, Line::with_normal([1.0, 0.0]));
        assert!(!mp.is_configured());

        mp.setup(&domain).unwrap();
        assert!(mp.is_configured());
        assert_eq!(mp.constrained_dofs(), &[0, 2]);
        assert_eq!(mp.retained_dofs(), &[1]);
        // ux does not couple to uy when the normal has no y-component
        assert_eq!(mp.constraint_matrix()[(0, 0)], 0.0);
        assert_eq!(mp.constraint_matrix()[(1, 0)], 0.0);
    }

    #[test]
    fn test_unknown_node() {
        let domain = Domain::new();
        let mut mp = MFreedomConstraint::skew(1, 42, Line::with_normal([1.0, 0.0]));
        assert!(matches!(mp.setup(&domain), Err(FEAError::UnknownNode(42))));
        assert!(!mp.is_configured());
    }

    #[test]
    fn test_degenerate_normal() {
        let domain = domain_with(vec![Node::spatial_frame(1, 0.0, 0.0, 0.0)]);
        let mut mp = MFreedomConstraint::skew(1, 1, Plane::with_normal([0.0, 0.0, 0.0]));
        assert!(matches!(
            mp.setup(&domain),
            Err(FEAError::DegenerateNormal(_))
        ));
    }

    #[test]
    fn test_geometry_dimension_must_match_node() {
        let domain = domain_with(vec![Node::planar(1, 0.0, 0.0)]);
        let mut mp = MFreedomConstraint::skew(1, 1, Plane::with_normal([0.0, 0.0, 1.0]));
        assert!(matches!(mp.setup(&domain), Err(FEAError::InvalidGeometry(_))));
    }

    #[test]
    fn test_setup_recomputes_from_scratch() {
        let mut domain = domain_with(vec![Node::planar(1, 0.0, 0.0)]);
        let mut mp = MFreedomConstraint::antisymmetry(1, 1, Line::with_normal([0.6, 0.8]));
        mp.setup(&domain).unwrap();
        let first = mp.constraint_matrix().clone();
        mp.setup(&domain).unwrap();
        assert_eq!(&first, mp.constraint_matrix());
        assert_relative_eq!(first[(0, 0)], 0.75, epsilon = 1e-12);

        domain.remove_node(1).unwrap();
        assert!(mp.setup(&domain).is_err());
        assert!(!mp.is_configured());
    }

    #[test]
    fn test_general_shape_mismatch() {
        let result = MFreedomConstraint::general(
            1,
            1,
            2,
            vec![0, 1],
            vec![0],
            Mat::from_element(1, 1, 1.0),
        );
        assert!(matches!(result, Err(FEAError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_general_rejects_non_finite_and_duplicates() {
        let nan = MFreedomConstraint::general(1, 1, 2, vec![0], vec![0], Mat::from_element(1, 1, f64::NAN));
        assert!(matches!(nan, Err(FEAError::ShapeMismatch { .. })));

        let dup = MFreedomConstraint::general(1, 1, 2, vec![0, 0], vec![1], Mat::zeros(2, 1));
        assert!(matches!(dup, Err(FEAError::InvalidInput(_))));

        let overlap = MFreedomConstraint::general(1, 1, 1, vec![0], vec![0], Mat::zeros(1, 1));
        assert!(matches!(overlap, Err(FEAError::InvalidInput(_))));
    }

    #[test]
    fn test_general_setup_checks_dof_range() {
        let domain = domain_with(vec![Node::planar(1, 0.0, 0.0), Node::planar(2, 1.0, 0.0)]);
        let mut mp =
            MFreedomConstraint::general(1, 1, 2, vec![1], vec![3], Mat::from_element(1, 1, 1.0))
                .unwrap();
        assert!(matches!(
            mp.setup(&domain),
            Err(FEAError::IndexOutOfRange { index: 3, size: 2 })
        ));

        let mut tie =
            MFreedomConstraint::general(2, 1, 2, vec![1], vec![1], Mat::from_element(1, 1, 1.0))
                .unwrap();
        tie.setup(&domain).unwrap();
        assert_eq!(tie.constrained_dofs(), &[1]);
        assert_eq!(tie.retained_dofs(), &[1]);
    }
}
