//! Element contract consumed by the assembler

use crate::domain::Domain;
use crate::error::FEAResult;
use crate::math::{Mat, Vec as FEVec};

/// A domain element
///
/// Local matrices are ordered node by node following
/// `external_nodes()`, each node contributing all of its DOFs.
pub trait Element: std::fmt::Debug {
    fn tag(&self) -> i32;

    /// Tags of the connected nodes
    fn external_nodes(&self) -> &[i32];

    /// Tangent stiffness in global coordinates
    fn tangent_stiff(&self, domain: &Domain) -> FEAResult<Mat>;

    /// Mass matrix in global coordinates
    fn mass(&self, domain: &Domain) -> FEAResult<Mat>;

    /// Damping matrix, zero unless the element defines one
    fn damp(&self, domain: &Domain) -> FEAResult<Mat> {
        let n = self.num_dof(domain)?;
        Ok(Mat::zeros(n, n))
    }

    /// Internal resisting force at the current trial displacements
    fn resisting_force(&self, domain: &Domain) -> FEAResult<FEVec>;

    /// Total number of local DOFs
    fn num_dof(&self, domain: &Domain) -> FEAResult<usize> {
        self.external_nodes()
            .iter()
            .map(|&tag| domain.try_node(tag).map(|n| n.ndf()))
            .sum()
    }
}
