//! Two-node axial bar in 1D, 2D or 3D
//!
//! Stiffness acts only on the translational DOFs of each node; rotational
//! DOFs (if the nodes carry any) receive zero rows and columns. Mass is
//! lumped, half of `rho * L` at each end.

use serde::{Deserialize, Serialize};

use crate::domain::{Domain, Element, Node};
use crate::error::{FEAError, FEAResult};
use crate::math::{Mat, Vec as FEVec};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Truss {
    tag: i32,
    nodes: [i32; 2],
    /// Modulus of elasticity
    pub e: f64,
    /// Cross-sectional area
    pub a: f64,
    /// Mass per unit length
    pub rho: f64,
}

impl Truss {
    pub fn new(tag: i32, i_node: i32, j_node: i32, e: f64, a: f64) -> Self {
        Self {
            tag,
            nodes: [i_node, j_node],
            e,
            a,
            rho: 0.0,
        }
    }

    /// Set the mass per unit length
    pub fn with_rho(mut self, rho: f64) -> Self {
        self.rho = rho;
        self
    }

    fn end_nodes<'a>(&self, domain: &'a Domain) -> FEAResult<(&'a Node, &'a Node)> {
        let ni = domain.try_node(self.nodes[0])?;
        let nj = domain.try_node(self.nodes[1])?;
        if ni.dim() != nj.dim() {
            return Err(FEAError::InvalidGeometry(format!(
                "truss {} joins a {}D node to a {}D node",
                self.tag,
                ni.dim(),
                nj.dim()
            )));
        }
        for node in [ni, nj] {
            if node.ndf() < node.dim() {
                return Err(FEAError::InvalidGeometry(format!(
                    "truss {} needs {} translational DOFs at node {}, found {}",
                    self.tag,
                    node.dim(),
                    node.tag(),
                    node.ndf()
                )));
            }
        }
        Ok((ni, nj))
    }

    /// Length and direction cosines
    fn geometry(&self, ni: &Node, nj: &Node) -> FEAResult<(f64, Vec<f64>)> {
        let length = ni.distance_to(nj);
        if length < 1e-10 {
            return Err(FEAError::InvalidGeometry(format!(
                "truss {} has zero length",
                self.tag
            )));
        }
        let cosines = ni
            .coords()
            .iter()
            .zip(nj.coords())
            .map(|(a, b)| (b - a) / length)
            .collect();
        Ok((length, cosines))
    }
}

impl Element for Truss {
    fn tag(&self) -> i32 {
        self.tag
    }

    fn external_nodes(&self) -> &[i32] {
        &self.nodes
    }

    fn tangent_stiff(&self, domain: &Domain) -> FEAResult<Mat> {
        let (ni, nj) = self.end_nodes(domain)?;
        let (length, c) = self.geometry(ni, nj)?;
        let k = self.e * self.a / length;

        let offset_j = ni.ndf();
        let mut stiff = Mat::zeros(ni.ndf() + nj.ndf(), ni.ndf() + nj.ndf());
        let dim = c.len();
        for p in 0..dim {
            for q in 0..dim {
                let kpq = k * c[p] * c[q];
                stiff[(p, q)] += kpq;
                stiff[(p, offset_j + q)] -= kpq;
                stiff[(offset_j + p, q)] -= kpq;
                stiff[(offset_j + p, offset_j + q)] += kpq;
            }
        }
        Ok(stiff)
    }

    fn mass(&self, domain: &Domain) -> FEAResult<Mat> {
        let (ni, nj) = self.end_nodes(domain)?;
        let (length, c) = self.geometry(ni, nj)?;
        let half = 0.5 * self.rho * length;

        let offset_j = ni.ndf();
        let mut mass = Mat::zeros(ni.ndf() + nj.ndf(), ni.ndf() + nj.ndf());
        for p in 0..c.len() {
            mass[(p, p)] = half;
            mass[(offset_j + p, offset_j + p)] = half;
        }
        Ok(mass)
    }

    fn resisting_force(&self, domain: &Domain) -> FEAResult<FEVec> {
        let (ni, nj) = self.end_nodes(domain)?;
        let disp = FEVec::from_iterator(
            ni.ndf() + nj.ndf(),
            ni.trial_disp().iter().chain(nj.trial_disp().iter()).copied(),
        );
        Ok(self.tangent_stiff(domain)? * disp)
    }
}
