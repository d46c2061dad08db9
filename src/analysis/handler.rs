//! Constraint handler - builds the analysis model from a domain

use log::info;

use crate::analysis::dof_group::DofGroup;
use crate::analysis::fe_element::ElementFe;
use crate::analysis::lagrange::{LagrangeMpFe, LagrangeSpFe};
use crate::analysis::model::AnalysisModel;
use crate::domain::Domain;
use crate::error::{FEAError, FEAResult};

/// Enforces every constraint with Lagrange multipliers
///
/// Builds, in order: one DOF group per node (ascending node tag), one
/// `ElementFe` per domain element, then a multiplier group and a
/// Lagrange element for each MP constraint followed by each SP
/// constraint. Group and FE tags are assigned sequentially from 0.
#[derive(Debug, Clone, Copy)]
pub struct LagrangeConstraintHandler {
    alpha: f64,
}

impl Default for LagrangeConstraintHandler {
    fn default() -> Self {
        Self { alpha: 1.0 }
    }
}

impl LagrangeConstraintHandler {
    pub fn new(alpha: f64) -> FEAResult<Self> {
        if !alpha.is_finite() || alpha == 0.0 {
            return Err(FEAError::InvalidInput(format!(
                "Lagrange scale factor must be finite and non-zero, got {}",
                alpha
            )));
        }
        Ok(Self { alpha })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Build the DOF groups and FE elements for `domain`
    ///
    /// All MP constraints must already be set up. On error any node
    /// back-references set so far are released.
    pub fn handle(&self, domain: &mut Domain) -> FEAResult<AnalysisModel> {
        let mut model = AnalysisModel::new();
        match self.populate(&mut model, domain) {
            Ok(()) => {
                info!(
                    "Lagrange handler: {} DOF groups, {} FE elements",
                    model.num_dof_groups(),
                    model.num_fe_elements()
                );
                Ok(model)
            }
            Err(e) => {
                model.clear_all(domain);
                Err(e)
            }
        }
    }

    fn populate(&self, model: &mut AnalysisModel, domain: &mut Domain) -> FEAResult<()> {
        if let Some(mp) = domain.mp_constraints().find(|mp| !mp.is_configured()) {
            return Err(FEAError::NotConfigured(mp.tag()));
        }

        let mut group_tag = 0;
        let mut fe_tag = 0;

        let nodes: Vec<DofGroup> = domain
            .nodes()
            .enumerate()
            .map(|(i, node)| DofGroup::bind(i as i32, node))
            .collect::<FEAResult<_>>()?;
        for group in nodes {
            model.add_dof_group(group, domain)?;
            group_tag += 1;
        }

        let elements: Vec<(i32, Vec<i32>)> = domain
            .elements()
            .map(|e| (e.tag(), e.external_nodes().to_vec()))
            .collect();
        for (ele_tag, node_tags) in elements {
            let groups = node_tags
                .iter()
                .map(|&n| model.node_dof_group(domain, n).map(|g| g.tag()))
                .collect::<FEAResult<Vec<_>>>()?;
            model.add_fe_element(ElementFe::new(fe_tag, ele_tag, groups))?;
            fe_tag += 1;
        }

        let mps: Vec<(i32, i32, i32, usize)> = domain
            .mp_constraints()
            .map(|mp| {
                (
                    mp.tag(),
                    mp.constrained_node_tag(),
                    mp.retained_node_tag(),
                    mp.num_constrained(),
                )
            })
            .collect();
        for (mp_tag, constrained, retained, count) in mps {
            // A fully retained constraint has nothing to enforce
            if count == 0 {
                continue;
            }
            let constrained_group = model.node_dof_group(domain, constrained)?.tag();
            let retained_group = model.node_dof_group(domain, retained)?.tag();
            model.add_dof_group(DofGroup::with_size(group_tag, count)?, domain)?;
            model.add_fe_element(LagrangeMpFe::new(
                fe_tag,
                mp_tag,
                constrained_group,
                retained_group,
                group_tag,
                self.alpha,
            ))?;
            group_tag += 1;
            fe_tag += 1;
        }

        let sps: Vec<(i32, i32)> = domain
            .sp_constraints()
            .map(|sp| (sp.tag(), sp.node_tag()))
            .collect();
        for (sp_tag, node) in sps {
            let node_group = model.node_dof_group(domain, node)?.tag();
            model.add_dof_group(DofGroup::with_size(group_tag, 1)?, domain)?;
            model.add_fe_element(LagrangeSpFe::new(
                fe_tag,
                sp_tag,
                node_group,
                group_tag,
                self.alpha,
            ))?;
            group_tag += 1;
            fe_tag += 1;
        }
        Ok(())
    }
}
