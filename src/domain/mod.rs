//! Domain - the authoritative registry of nodes, elements and constraints

mod element;
mod node;
mod truss;

pub use element::Element;
pub use node::Node;
pub use truss::Truss;

use std::collections::BTreeMap;

use log::debug;

use crate::constraints::{MFreedomConstraint, SFreedomConstraint};
use crate::error::{FEAError, FEAResult};

/// Container for the physical model
///
/// All collections are keyed by tag and iterate in ascending tag order,
/// which gives every assembly pass a deterministic visiting order.
#[derive(Debug, Default)]
pub struct Domain {
    nodes: BTreeMap<i32, Node>,
    elements: BTreeMap<i32, Box<dyn Element>>,
    mp_constraints: BTreeMap<i32, MFreedomConstraint>,
    sp_constraints: BTreeMap<i32, SFreedomConstraint>,
}

impl Domain {
    /// Create a new empty domain
    pub fn new() -> Self {
        Self::default()
    }

    // ========================
    // Model Building Methods
    // ========================

    /// Add a node to the domain
    pub fn add_node(&mut self, node: Node) -> FEAResult<()> {
        if self.nodes.contains_key(&node.tag()) {
            return Err(FEAError::DuplicateTag(format!("node {}", node.tag())));
        }
        self.nodes.insert(node.tag(), node);
        Ok(())
    }

    /// Add an element; all of its nodes must already exist
    pub fn add_element<E: Element + 'static>(&mut self, element: E) -> FEAResult<()> {
        for &tag in element.external_nodes() {
            if !self.nodes.contains_key(&tag) {
                return Err(FEAError::UnknownNode(tag));
            }
        }
        if self.elements.contains_key(&element.tag()) {
            return Err(FEAError::DuplicateTag(format!("element {}", element.tag())));
        }
        self.elements.insert(element.tag(), Box::new(element));
        Ok(())
    }

    /// Add a multi-freedom constraint
    ///
    /// Node tags are resolved later, in [`Domain::setup_constraints`].
    pub fn add_mp_constraint(&mut self, constraint: MFreedomConstraint) -> FEAResult<()> {
        if self.mp_constraints.contains_key(&constraint.tag()) {
            return Err(FEAError::DuplicateTag(format!(
                "mp constraint {}",
                constraint.tag()
            )));
        }
        self.mp_constraints.insert(constraint.tag(), constraint);
        Ok(())
    }

    /// Add a single-freedom (prescribed value) constraint
    pub fn add_sp_constraint(&mut self, constraint: SFreedomConstraint) -> FEAResult<()> {
        if self.sp_constraints.contains_key(&constraint.tag()) {
            return Err(FEAError::DuplicateTag(format!(
                "sp constraint {}",
                constraint.tag()
            )));
        }
        self.sp_constraints.insert(constraint.tag(), constraint);
        Ok(())
    }

    /// Remove a node that is no longer numbered by any DOF group
    pub fn remove_node(&mut self, tag: i32) -> FEAResult<Node> {
        let node = self.nodes.get(&tag).ok_or(FEAError::UnknownNode(tag))?;
        if let Some(group) = node.dof_group() {
            return Err(FEAError::InvalidInput(format!(
                "node {} is still referenced by DOF group {}",
                tag, group
            )));
        }
        self.nodes.remove(&tag).ok_or(FEAError::UnknownNode(tag))
    }

    /// Run `setup` on every multi-freedom constraint
    ///
    /// Stops at the first failing constraint. Constraints already set up
    /// keep their state.
    pub fn setup_constraints(&mut self) -> FEAResult<()> {
        let mut constraints = std::mem::take(&mut self.mp_constraints);
        let mut result = Ok(());
        for constraint in constraints.values_mut() {
            result = constraint.setup(self);
            if result.is_err() {
                break;
            }
        }
        self.mp_constraints = constraints;
        result?;

        for sp in self.sp_constraints.values() {
            sp.validate(self)?;
        }
        debug!(
            "set up {} mp and {} sp constraints",
            self.mp_constraints.len(),
            self.sp_constraints.len()
        );
        Ok(())
    }

    // ========================
    // Access Methods
    // ========================

    pub fn node(&self, tag: i32) -> Option<&Node> {
        self.nodes.get(&tag)
    }

    /// Look up a node, failing with `UnknownNode`
    pub fn try_node(&self, tag: i32) -> FEAResult<&Node> {
        self.nodes.get(&tag).ok_or(FEAError::UnknownNode(tag))
    }

    pub fn node_mut(&mut self, tag: i32) -> Option<&mut Node> {
        self.nodes.get_mut(&tag)
    }

    pub fn try_node_mut(&mut self, tag: i32) -> FEAResult<&mut Node> {
        self.nodes.get_mut(&tag).ok_or(FEAError::UnknownNode(tag))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn element(&self, tag: i32) -> Option<&dyn Element> {
        self.elements.get(&tag).map(|e| e.as_ref())
    }

    pub fn elements(&self) -> impl Iterator<Item = &dyn Element> {
        self.elements.values().map(|e| e.as_ref())
    }

    pub fn mp_constraint(&self, tag: i32) -> Option<&MFreedomConstraint> {
        self.mp_constraints.get(&tag)
    }

    pub fn mp_constraints(&self) -> impl Iterator<Item = &MFreedomConstraint> {
        self.mp_constraints.values()
    }

    pub fn sp_constraint(&self, tag: i32) -> Option<&SFreedomConstraint> {
        self.sp_constraints.get(&tag)
    }

    pub fn sp_constraints(&self) -> impl Iterator<Item = &SFreedomConstraint> {
        self.sp_constraints.values()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }
}
