//! Analysis model - owner of DOF groups and FE elements

use std::collections::BTreeMap;

use log::debug;

use crate::analysis::dof_group::DofGroup;
use crate::analysis::fe_element::FeElement;
use crate::domain::Domain;
use crate::error::{FEAError, FEAResult};
use crate::math::Vec as FEVec;

/// Registry of the analysis-side objects built from a `Domain`
///
/// Nodes keep only the tag of their DOF group; the group itself lives
/// here and is looked up by tag.
#[derive(Debug, Default)]
pub struct AnalysisModel {
    dof_groups: BTreeMap<i32, DofGroup>,
    fe_elements: BTreeMap<i32, Box<dyn FeElement>>,
    num_eqn: usize,
}

impl AnalysisModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a DOF group and point its node back at it
    pub fn add_dof_group(&mut self, group: DofGroup, domain: &mut Domain) -> FEAResult<()> {
        if self.dof_groups.contains_key(&group.tag()) {
            return Err(FEAError::DuplicateTag(format!("DOF group {}", group.tag())));
        }
        if let Some(node_tag) = group.node_tag() {
            if let Some(other) = domain.try_node(node_tag)?.dof_group() {
                return Err(FEAError::InvalidInput(format!(
                    "node {} is already numbered by DOF group {}",
                    node_tag, other
                )));
            }
        }
        group.attach(domain)?;
        self.dof_groups.insert(group.tag(), group);
        Ok(())
    }

    /// Remove a DOF group, clearing its node's back-reference first
    pub fn remove_dof_group(&mut self, tag: i32, domain: &mut Domain) -> Option<DofGroup> {
        let group = self.dof_groups.remove(&tag)?;
        group.detach(domain);
        Some(group)
    }

    pub fn add_fe_element<F: FeElement + 'static>(&mut self, fe: F) -> FEAResult<()> {
        if self.fe_elements.contains_key(&fe.tag()) {
            return Err(FEAError::DuplicateTag(format!("FE element {}", fe.tag())));
        }
        for &group in fe.dof_group_tags() {
            if !self.dof_groups.contains_key(&group) {
                return Err(FEAError::InvalidInput(format!(
                    "FE element {} refers to missing DOF group {}",
                    fe.tag(),
                    group
                )));
            }
        }
        self.fe_elements.insert(fe.tag(), Box::new(fe));
        Ok(())
    }

    /// Drop everything and release all node back-references
    pub fn clear_all(&mut self, domain: &mut Domain) {
        for group in self.dof_groups.values() {
            group.detach(domain);
        }
        debug!(
            "cleared {} DOF groups and {} FE elements",
            self.dof_groups.len(),
            self.fe_elements.len()
        );
        self.dof_groups.clear();
        self.fe_elements.clear();
        self.num_eqn = 0;
    }

    pub fn dof_group(&self, tag: i32) -> Option<&DofGroup> {
        self.dof_groups.get(&tag)
    }

    pub fn dof_group_mut(&mut self, tag: i32) -> Option<&mut DofGroup> {
        self.dof_groups.get_mut(&tag)
    }

    /// DOF group numbering the given node
    pub fn node_dof_group(&self, domain: &Domain, node_tag: i32) -> FEAResult<&DofGroup> {
        let tag = domain
            .try_node(node_tag)?
            .dof_group()
            .ok_or_else(|| FEAError::InvalidInput(format!("node {} has no DOF group", node_tag)))?;
        self.dof_groups
            .get(&tag)
            .ok_or_else(|| FEAError::InvalidInput(format!("DOF group {} is not in the model", tag)))
    }

    pub fn dof_groups(&self) -> impl Iterator<Item = &DofGroup> {
        self.dof_groups.values()
    }

    pub fn dof_groups_mut(&mut self) -> impl Iterator<Item = &mut DofGroup> {
        self.dof_groups.values_mut()
    }

    pub fn fe_element(&self, tag: i32) -> Option<&dyn FeElement> {
        self.fe_elements.get(&tag).map(|fe| fe.as_ref())
    }

    pub fn fe_elements(&self) -> impl Iterator<Item = &dyn FeElement> {
        self.fe_elements.values().map(|fe| fe.as_ref())
    }

    pub fn num_dof_groups(&self) -> usize {
        self.dof_groups.len()
    }

    pub fn num_fe_elements(&self) -> usize {
        self.fe_elements.len()
    }

    /// Concatenated global indices of an FE element's DOF groups
    ///
    /// `ids` is cleared first so callers can reuse one buffer.
    pub fn equation_ids(&self, fe: &dyn FeElement, ids: &mut Vec<Option<usize>>) -> FEAResult<()> {
        ids.clear();
        for &tag in fe.dof_group_tags() {
            let group = self.dof_groups.get(&tag).ok_or_else(|| {
                FEAError::InvalidInput(format!(
                    "FE element {} refers to missing DOF group {}",
                    fe.tag(),
                    tag
                ))
            })?;
            group.equation_ids(ids)?;
        }
        Ok(())
    }

    pub fn num_eqn(&self) -> usize {
        self.num_eqn
    }

    pub(crate) fn set_num_eqn(&mut self, n: usize) {
        self.num_eqn = n;
    }

    /// Push a global solution vector into the nodes' trial displacements
    pub fn update_domain(&self, domain: &mut Domain, u: &FEVec) -> FEAResult<()> {
        if u.len() != self.num_eqn {
            return Err(FEAError::ShapeMismatch {
                expected: format!("vector of length {}", self.num_eqn),
                found: format!("length {}", u.len()),
            });
        }
        for group in self.dof_groups.values() {
            if group.node_tag().is_some() {
                group.set_node_displacement(domain, u)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fe_element::ElementFe;
    use crate::domain::{Node, Truss};

    fn two_node_domain() -> Domain {
        let mut domain = Domain::new();
        domain.add_node(Node::planar(1, 0.0, 0.0)).unwrap();
        domain.add_node(Node::planar(2, 1.0, 0.0)).unwrap();
        domain.add_element(Truss::new(1, 1, 2, 1.0, 1.0)).unwrap();
        domain
    }

    #[test]
    fn test_node_cannot_have_two_groups() {
        let mut domain = two_node_domain();
        let mut model = AnalysisModel::new();
        let node = domain.node(1).unwrap().clone();
        model.add_dof_group(DofGroup::bind(0, &node).unwrap(), &mut domain).unwrap();
        let result = model.add_dof_group(DofGroup::bind(1, &node).unwrap(), &mut domain);
        assert!(matches!(result, Err(FEAError::InvalidInput(_))));
        assert_eq!(domain.node(1).unwrap().dof_group(), Some(0));
    }

    #[test]
    fn test_fe_element_needs_groups() {
        let mut model = AnalysisModel::new();
        let result = model.add_fe_element(ElementFe::new(0, 1, vec![0, 1]));
        assert!(matches!(result, Err(FEAError::InvalidInput(_))));
    }

    #[test]
    fn test_clear_all_releases_nodes() {
        let mut domain = two_node_domain();
        let mut model = AnalysisModel::new();
        for (tag, node_tag) in [(0, 1), (1, 2)] {
            let node = domain.node(node_tag).unwrap().clone();
            model
                .add_dof_group(DofGroup::bind(tag, &node).unwrap(), &mut domain)
                .unwrap();
        }
        assert_eq!(domain.node(2).unwrap().dof_group(), Some(1));

        model.clear_all(&mut domain);
        assert_eq!(model.num_dof_groups(), 0);
        assert!(domain.nodes().all(|n| n.dof_group().is_none()));
    }

    #[test]
    fn test_remove_dof_group_detaches() {
        let mut domain = two_node_domain();
        let mut model = AnalysisModel::new();
        let node = domain.node(1).unwrap().clone();
        model.add_dof_group(DofGroup::bind(4, &node).unwrap(), &mut domain).unwrap();

        let removed = model.remove_dof_group(4, &mut domain).unwrap();
        assert_eq!(removed.tag(), 4);
        assert!(domain.node(1).unwrap().dof_group().is_none());
        assert!(model.remove_dof_group(4, &mut domain).is_none());
    }
}
