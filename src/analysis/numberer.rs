//! DOF numberers - assign global equation numbers to DOF group slots

use std::collections::BTreeMap;

use log::{debug, info};

use crate::analysis::dof_group::EqnSlot;
use crate::analysis::model::AnalysisModel;
use crate::error::{FEAError, FEAResult};
use crate::math::reverse_cuthill_mckee;

/// Gives every non-excluded slot in the model a unique equation number
///
/// Implementations produce a bijection onto `0..n` and record `n` on the
/// model.
pub trait DofNumberer: std::fmt::Debug {
    fn number(&self, model: &mut AnalysisModel) -> FEAResult<usize>;
}

/// Numbers DOF groups in ascending tag order
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainNumberer;

impl DofNumberer for PlainNumberer {
    fn number(&self, model: &mut AnalysisModel) -> FEAResult<usize> {
        let order: Vec<i32> = model.dof_groups().map(|g| g.tag()).collect();
        let n = number_in_order(model, &order)?;
        info!("plain numbering: {} equations", n);
        Ok(n)
    }
}

/// Numbers DOF groups in reverse Cuthill-McKee order
///
/// Two groups are adjacent when some FE element touches both, so
/// multiplier groups end up next to the nodes they constrain.
#[derive(Debug, Clone, Copy, Default)]
pub struct RcmNumberer;

impl DofNumberer for RcmNumberer {
    fn number(&self, model: &mut AnalysisModel) -> FEAResult<usize> {
        let tags: Vec<i32> = model.dof_groups().map(|g| g.tag()).collect();
        let index: BTreeMap<i32, usize> = tags.iter().enumerate().map(|(i, &t)| (t, i)).collect();

        let mut adj: Vec<Vec<usize>> = vec![Vec::new(); tags.len()];
        for fe in model.fe_elements() {
            let groups = fe
                .dof_group_tags()
                .iter()
                .map(|t| {
                    index.get(t).copied().ok_or_else(|| {
                        FEAError::InvalidInput(format!(
                            "FE element {} refers to missing DOF group {}",
                            fe.tag(),
                            t
                        ))
                    })
                })
                .collect::<FEAResult<Vec<usize>>>()?;
            for &a in &groups {
                for &b in &groups {
                    if a != b {
                        adj[a].push(b);
                    }
                }
            }
        }

        let order: Vec<i32> = reverse_cuthill_mckee(&adj)
            .into_iter()
            .map(|i| tags[i])
            .collect();
        debug!("RCM group order: {:?}", order);

        let n = number_in_order(model, &order)?;
        info!("RCM numbering: {} equations", n);
        Ok(n)
    }
}

fn number_in_order(model: &mut AnalysisModel, order: &[i32]) -> FEAResult<usize> {
    let mut next = 0;
    for &tag in order {
        let group = model
            .dof_group_mut(tag)
            .ok_or_else(|| FEAError::InvalidInput(format!("DOF group {} is not in the model", tag)))?;
        for i in 0..group.size() {
            if !group.slot(i)?.is_excluded() {
                group.set_slot(i, EqnSlot::Equation(next))?;
                next += 1;
            }
        }
    }
    model.set_num_eqn(next);
    Ok(next)
}
