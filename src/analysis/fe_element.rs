//! Assembler-facing element contract

use crate::domain::{Domain, Element};
use crate::error::{FEAError, FEAResult};
use crate::math::{Mat, Vec as FEVec};

/// Which local matrix an assembly pass asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TangentMode {
    Stiffness,
    Mass,
    Damping,
}

/// Anything that contributes a local tangent and residual to the global
/// system
///
/// The local-to-global map is the concatenation of the slots of the DOF
/// groups returned by `dof_group_tags()`, in that order.
pub trait FeElement: std::fmt::Debug {
    fn tag(&self) -> i32;

    fn dof_group_tags(&self) -> &[i32];

    fn form_tangent(&self, mode: TangentMode, domain: &Domain) -> FEAResult<Mat>;

    fn form_residual(&self, domain: &Domain) -> FEAResult<FEVec>;
}

/// Wraps a domain element
#[derive(Debug, Clone)]
pub struct ElementFe {
    tag: i32,
    element: i32,
    groups: Vec<i32>,
}

impl ElementFe {
    /// `groups[i]` numbers the element's i-th external node
    pub fn new(tag: i32, element: i32, groups: Vec<i32>) -> Self {
        Self {
            tag,
            element,
            groups,
        }
    }

    pub fn element_tag(&self) -> i32 {
        self.element
    }

    fn element<'a>(&self, domain: &'a Domain) -> FEAResult<&'a dyn Element> {
        domain.element(self.element).ok_or_else(|| {
            FEAError::InvalidInput(format!("element {} is not in the domain", self.element))
        })
    }
}

impl FeElement for ElementFe {
    fn tag(&self) -> i32 {
        self.tag
    }

    fn dof_group_tags(&self) -> &[i32] {
        &self.groups
    }

    fn form_tangent(&self, mode: TangentMode, domain: &Domain) -> FEAResult<Mat> {
        let element = self.element(domain)?;
        match mode {
            TangentMode::Stiffness => element.tangent_stiff(domain),
            TangentMode::Mass => element.mass(domain),
            TangentMode::Damping => element.damp(domain),
        }
    }

    /// Negated resisting force, so that external minus internal sums to
    /// the unbalance
    fn form_residual(&self, domain: &Domain) -> FEAResult<FEVec> {
        Ok(-self.element(domain)?.resisting_force(domain)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Node, Truss};

    fn domain() -> Domain {
        let mut domain = Domain::new();
        domain.add_node(Node::planar(1, 0.0, 0.0)).unwrap();
        domain.add_node(Node::planar(2, 2.0, 0.0)).unwrap();
        domain.add_element(Truss::new(7, 1, 2, 10.0, 1.0)).unwrap();
        domain
            .try_node_mut(2)
            .unwrap()
            .set_trial_disp(&FEVec::from_vec(vec![0.1, 0.0]))
            .unwrap();
        domain
    }

    #[test]
    fn test_wraps_domain_element() {
        let domain = domain();
        let fe = ElementFe::new(0, 7, vec![0, 1]);
        assert_eq!(fe.element_tag(), 7);

        let k = fe.form_tangent(TangentMode::Stiffness, &domain).unwrap();
        assert_eq!(k[(0, 0)], 5.0);
        let c = fe.form_tangent(TangentMode::Damping, &domain).unwrap();
        assert_eq!(c, Mat::zeros(4, 4));

        // Bar stretched by 0.1: internal force 0.5, residual is its negative
        let r = fe.form_residual(&domain).unwrap();
        assert!((r[0] - 0.5).abs() < 1e-12);
        assert!((r[2] + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_missing_element() {
        let domain = domain();
        let fe = ElementFe::new(0, 99, vec![0, 1]);
        assert!(matches!(
            fe.form_tangent(TangentMode::Mass, &domain),
            Err(FEAError::InvalidInput(_))
        ));
    }
}
