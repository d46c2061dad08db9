//! DOF groups - per-node equation-number tables

use serde::{Deserialize, Serialize};

use crate::domain::{Domain, Node};
use crate::error::{FEAError, FEAResult};
use crate::math::{scaled, Mat, Vec as FEVec};

/// Equation number held by one local DOF
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EqnSlot {
    /// Not yet numbered
    #[default]
    Unset,
    /// No global unknown corresponds to this DOF
    Excluded,
    /// Global equation index
    Equation(usize),
}

impl EqnSlot {
    pub fn equation(&self) -> Option<usize> {
        match self {
            EqnSlot::Equation(eq) => Some(*eq),
            _ => None,
        }
    }

    pub fn is_excluded(&self) -> bool {
        matches!(self, EqnSlot::Excluded)
    }
}

/// Which nodal matrix a DOF group contributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodalMatrix {
    Mass,
    Damping,
}

/// The equation numbers of one node, or of a set of Lagrange multipliers
///
/// A group bound to a node has one slot per node DOF. A multiplier group
/// has no node and represents synthetic unknowns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DofGroup {
    tag: i32,
    slots: Vec<EqnSlot>,
    node: Option<i32>,
}

impl DofGroup {
    /// Group numbering all DOFs of `node`
    pub fn bind(tag: i32, node: &Node) -> FEAResult<Self> {
        if node.ndf() == 0 {
            return Err(FEAError::InvalidSize(0));
        }
        Ok(Self {
            tag,
            slots: vec![EqnSlot::Unset; node.ndf()],
            node: Some(node.tag()),
        })
    }

    /// Group of `size` unknowns with no node (Lagrange multipliers)
    pub fn with_size(tag: i32, size: usize) -> FEAResult<Self> {
        if size == 0 {
            return Err(FEAError::InvalidSize(size));
        }
        Ok(Self {
            tag,
            slots: vec![EqnSlot::Unset; size],
            node: None,
        })
    }

    pub fn tag(&self) -> i32 {
        self.tag
    }

    /// Tag of the bound node, `None` for multiplier groups
    pub fn node_tag(&self) -> Option<i32> {
        self.node
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[EqnSlot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> FEAResult<EqnSlot> {
        self.slots
            .get(index)
            .copied()
            .ok_or(FEAError::IndexOutOfRange {
                index,
                size: self.slots.len(),
            })
    }

    /// Set one equation-number slot
    ///
    /// The value itself is not checked; that is the numberer's job.
    pub fn set_slot(&mut self, index: usize, value: EqnSlot) -> FEAResult<()> {
        let size = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(FEAError::IndexOutOfRange { index, size })?;
        *slot = value;
        Ok(())
    }

    /// Replace every slot; the length must match
    pub fn set_all(&mut self, values: &[EqnSlot]) -> FEAResult<()> {
        if values.len() != self.slots.len() {
            return Err(FEAError::InvalidSize(values.len()));
        }
        self.slots.copy_from_slice(values);
        Ok(())
    }

    /// Number of slots that are not excluded
    pub fn free_count(&self) -> usize {
        self.slots.len() - self.excluded_count()
    }

    pub fn excluded_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_excluded()).count()
    }

    /// Append this group's global indices to `ids`
    ///
    /// Excluded slots yield `None`. An unset slot means the numberer never
    /// ran and fails with `Unnumbered`.
    pub fn equation_ids(&self, ids: &mut Vec<Option<usize>>) -> FEAResult<()> {
        for slot in &self.slots {
            match slot {
                EqnSlot::Unset => return Err(FEAError::Unnumbered(self.tag)),
                EqnSlot::Excluded => ids.push(None),
                EqnSlot::Equation(eq) => ids.push(Some(*eq)),
            }
        }
        Ok(())
    }

    fn bound_node<'a>(&self, domain: &'a Domain) -> FEAResult<&'a Node> {
        let tag = self.node.ok_or(FEAError::NoBoundNode(self.tag))?;
        domain.try_node(tag)
    }

    /// Nodal mass or damping scaled by `factor`
    pub fn form_tangent(&self, domain: &Domain, mode: NodalMatrix, factor: f64) -> FEAResult<Mat> {
        let node = self.bound_node(domain)?;
        let m = match mode {
            NodalMatrix::Mass => node.mass().clone(),
            NodalMatrix::Damping => node.damping(),
        };
        Ok(scaled(m, factor))
    }

    /// Unbalanced nodal load scaled by `factor`
    pub fn form_residual(&self, domain: &Domain, factor: f64) -> FEAResult<FEVec> {
        let node = self.bound_node(domain)?;
        Ok(node.unbalanced_load() * factor)
    }

    /// Pull this group's local vector out of a global vector
    ///
    /// Slots without an equation (or outside `global`) read as zero.
    pub fn gather(&self, global: &FEVec) -> FEVec {
        FEVec::from_iterator(
            self.slots.len(),
            self.slots.iter().map(|slot| {
                slot.equation()
                    .and_then(|eq| global.get(eq).copied())
                    .unwrap_or(0.0)
            }),
        )
    }

    /// Add a local vector into a global vector
    pub fn scatter_add(&self, local: &FEVec, global: &mut FEVec) -> FEAResult<()> {
        if local.len() != self.slots.len() {
            return Err(FEAError::ShapeMismatch {
                expected: format!("vector of length {}", self.slots.len()),
                found: format!("length {}", local.len()),
            });
        }
        for (slot, value) in self.slots.iter().zip(local.iter()) {
            if let Some(eq) = slot.equation() {
                if eq >= global.len() {
                    return Err(FEAError::AssemblyIndexOutOfRange {
                        index: eq,
                        size: global.len(),
                    });
                }
                global[eq] += value;
            }
        }
        Ok(())
    }

    /// Write the gathered global solution into the node's trial displacement
    pub fn set_node_displacement(&self, domain: &mut Domain, global: &FEVec) -> FEAResult<()> {
        let tag = self.node.ok_or(FEAError::NoBoundNode(self.tag))?;
        let local = self.gather(global);
        domain.try_node_mut(tag)?.set_trial_disp(&local)
    }

    /// Point the bound node's back-reference at this group
    pub(crate) fn attach(&self, domain: &mut Domain) -> FEAResult<()> {
        if let Some(tag) = self.node {
            domain.try_node_mut(tag)?.set_dof_group(Some(self.tag));
        }
        Ok(())
    }

    /// Clear the bound node's back-reference if it still points here
    pub(crate) fn detach(&self, domain: &mut Domain) {
        if let Some(node) = self.node.and_then(|tag| domain.node_mut(tag)) {
            if node.dof_group() == Some(self.tag) {
                node.set_dof_group(None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_to_node() {
        let node = Node::planar_frame(5, 0.0, 0.0);
        let group = DofGroup::bind(0, &node).unwrap();
        assert_eq!(group.size(), 3);
        assert_eq!(group.node_tag(), Some(5));
        assert_eq!(group.free_count(), 3);
    }

    #[test]
    fn test_zero_size_is_invalid() {
        assert!(matches!(DofGroup::with_size(1, 0), Err(FEAError::InvalidSize(0))));
    }

    #[test]
    fn test_set_slot_out_of_range() {
        let mut group = DofGroup::with_size(1, 2).unwrap();
        assert!(matches!(
            group.set_slot(2, EqnSlot::Equation(0)),
            Err(FEAError::IndexOutOfRange { index: 2, size: 2 })
        ));
        assert!(group.slot(5).is_err());
    }

    #[test]
    fn test_counts_always_add_up() {
        let mut group = DofGroup::with_size(1, 4).unwrap();
        let sequence = [
            (0, EqnSlot::Excluded),
            (1, EqnSlot::Equation(7)),
            (0, EqnSlot::Equation(3)),
            (3, EqnSlot::Excluded),
            (2, EqnSlot::Excluded),
            (3, EqnSlot::Unset),
        ];
        for (index, value) in sequence {
            group.set_slot(index, value).unwrap();
            assert_eq!(group.free_count() + group.excluded_count(), group.size());
        }
        assert_eq!(group.excluded_count(), 1);
    }

    #[test]
    fn test_set_all_length_must_match() {
        let mut group = DofGroup::with_size(1, 2).unwrap();
        assert!(group.set_all(&[EqnSlot::Excluded]).is_err());
        group
            .set_all(&[EqnSlot::Excluded, EqnSlot::Equation(4)])
            .unwrap();
        assert_eq!(group.slots(), &[EqnSlot::Excluded, EqnSlot::Equation(4)]);
    }

    #[test]
    fn test_equation_ids() {
        let mut group = DofGroup::with_size(1, 2).unwrap();
        let mut ids = Vec::new();
        assert!(matches!(group.equation_ids(&mut ids), Err(FEAError::Unnumbered(1))));

        group.set_all(&[EqnSlot::Equation(3), EqnSlot::Excluded]).unwrap();
        ids.clear();
        group.equation_ids(&mut ids).unwrap();
        assert_eq!(ids, vec![Some(3), None]);
    }

    #[test]
    fn test_multiplier_group_has_no_nodal_terms() {
        let domain = Domain::new();
        let group = DofGroup::with_size(9, 1).unwrap();
        assert!(matches!(
            group.form_tangent(&domain, NodalMatrix::Mass, 1.0),
            Err(FEAError::NoBoundNode(9))
        ));
        assert!(matches!(group.form_residual(&domain, 1.0), Err(FEAError::NoBoundNode(9))));
    }

    #[test]
    fn test_nodal_mass_and_load() {
        let mut domain = Domain::new();
        let node = Node::planar(1, 0.0, 0.0).with_lumped_mass(2.0);
        let group = DofGroup::bind(0, &node).unwrap();
        domain.add_node(node).unwrap();
        domain.try_node_mut(1).unwrap().add_unbalanced_load(&[1.0, -3.0], 2.0).unwrap();

        let m = group.form_tangent(&domain, NodalMatrix::Mass, -0.5).unwrap();
        assert_eq!(m, Mat::from_diagonal_element(2, 2, -1.0));
        let c = group.form_tangent(&domain, NodalMatrix::Damping, 1.0).unwrap();
        assert_eq!(c, Mat::zeros(2, 2));
        let p = group.form_residual(&domain, 1.0).unwrap();
        assert_eq!(p.as_slice(), &[2.0, -6.0]);
    }

    #[test]
    fn test_gather_scatter() {
        let mut domain = Domain::new();
        let node = Node::planar(1, 0.0, 0.0);
        let mut group = DofGroup::bind(0, &node).unwrap();
        domain.add_node(node).unwrap();
        group.set_all(&[EqnSlot::Equation(2), EqnSlot::Excluded]).unwrap();

        let global = FEVec::from_vec(vec![0.0, 0.0, 1.5]);
        assert_eq!(group.gather(&global).as_slice(), &[1.5, 0.0]);

        let mut target = FEVec::zeros(3);
        group.scatter_add(&FEVec::from_vec(vec![2.0, 9.0]), &mut target).unwrap();
        assert_eq!(target.as_slice(), &[0.0, 0.0, 2.0]);

        let mut short = FEVec::zeros(2);
        assert!(matches!(
            group.scatter_add(&FEVec::from_vec(vec![2.0, 9.0]), &mut short),
            Err(FEAError::AssemblyIndexOutOfRange { index: 2, size: 2 })
        ));

        group.set_node_displacement(&mut domain, &global).unwrap();
        assert_eq!(domain.node(1).unwrap().trial_disp().as_slice(), &[1.5, 0.0]);
    }

    #[test]
    fn test_attach_detach() {
        let mut domain = Domain::new();
        let node = Node::planar(1, 0.0, 0.0);
        let group = DofGroup::bind(4, &node).unwrap();
        domain.add_node(node).unwrap();

        group.attach(&mut domain).unwrap();
        assert_eq!(domain.node(1).unwrap().dof_group(), Some(4));
        group.detach(&mut domain);
        assert_eq!(domain.node(1).unwrap().dof_group(), None);
    }
}
