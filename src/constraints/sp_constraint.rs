//! Single-freedom constraints (prescribed DOF values)

use serde::{Deserialize, Serialize};

use crate::domain::Domain;
use crate::error::{FEAError, FEAResult};

/// Prescribes `value` for one local DOF of a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SFreedomConstraint {
    tag: i32,
    node: i32,
    dof: usize,
    value: f64,
}

impl SFreedomConstraint {
    pub fn new(tag: i32, node: i32, dof: usize, value: f64) -> Self {
        Self {
            tag,
            node,
            dof,
            value,
        }
    }

    /// Fix a DOF at zero
    pub fn homogeneous(tag: i32, node: i32, dof: usize) -> Self {
        Self::new(tag, node, dof, 0.0)
    }

    /// Check the node exists and carries the DOF
    pub fn validate(&self, domain: &Domain) -> FEAResult<()> {
        let node = domain.try_node(self.node)?;
        if self.dof >= node.ndf() {
            return Err(FEAError::IndexOutOfRange {
                index: self.dof,
                size: node.ndf(),
            });
        }
        Ok(())
    }

    pub fn tag(&self) -> i32 {
        self.tag
    }

    pub fn node_tag(&self) -> i32 {
        self.node
    }

    pub fn dof(&self) -> usize {
        self.dof
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}
