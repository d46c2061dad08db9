//! Eigen integrators - drive the assembly of K and M

use log::debug;

use crate::analysis::dof_group::{DofGroup, NodalMatrix};
use crate::analysis::fe_element::{FeElement, TangentMode};
use crate::analysis::model::AnalysisModel;
use crate::analysis::soe::EigenSoe;
use crate::domain::Domain;
use crate::error::{FEAError, FEAResult};
use crate::math::Vec as FEVec;

/// Which matrix the current pass is building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormingMode {
    #[default]
    Stiffness,
    Mass,
}

/// Assembles the eigenproblem `K x = lambda M x` into an [`EigenSoe`]
///
/// Each pass zeroes its target matrix and then visits every FE element in
/// ascending tag order through `form_ele_tangent`; the mass pass may also
/// visit DOF groups through `form_node_tangent`.
pub trait EigenIntegrator: std::fmt::Debug {
    fn form_stiffness(
        &mut self,
        model: &AnalysisModel,
        domain: &Domain,
        soe: &mut dyn EigenSoe,
    ) -> FEAResult<()>;

    fn form_mass(
        &mut self,
        model: &AnalysisModel,
        domain: &Domain,
        soe: &mut dyn EigenSoe,
    ) -> FEAResult<()>;

    /// Add one FE element's contribution for the current pass
    fn form_ele_tangent(
        &mut self,
        fe: &dyn FeElement,
        model: &AnalysisModel,
        domain: &Domain,
        soe: &mut dyn EigenSoe,
    ) -> FEAResult<()>;

    /// Add one DOF group's nodal contribution for the current pass
    fn form_node_tangent(
        &mut self,
        group: &DofGroup,
        domain: &Domain,
        soe: &mut dyn EigenSoe,
    ) -> FEAResult<()>;

    /// Assemble element and nodal residuals into `rhs` (length `num_eqn`)
    fn form_unbalance(
        &mut self,
        model: &AnalysisModel,
        domain: &Domain,
        rhs: &mut FEVec,
    ) -> FEAResult<()>;
}

/// Generalized problem: element and nodal masses form `M`
#[derive(Debug, Clone, Default)]
pub struct GeneralizedEigenIntegrator {
    mode: FormingMode,
    ids: Vec<Option<usize>>,
}

impl GeneralizedEigenIntegrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> FormingMode {
        self.mode
    }
}

impl EigenIntegrator for GeneralizedEigenIntegrator {
    fn form_stiffness(
        &mut self,
        model: &AnalysisModel,
        domain: &Domain,
        soe: &mut dyn EigenSoe,
    ) -> FEAResult<()> {
        self.mode = FormingMode::Stiffness;
        soe.zero_stiffness();
        for fe in model.fe_elements() {
            self.form_ele_tangent(fe, model, domain, soe)?;
        }
        debug!("stiffness formed from {} FE elements", model.num_fe_elements());
        Ok(())
    }

    fn form_mass(
        &mut self,
        model: &AnalysisModel,
        domain: &Domain,
        soe: &mut dyn EigenSoe,
    ) -> FEAResult<()> {
        self.mode = FormingMode::Mass;
        soe.zero_mass();
        for fe in model.fe_elements() {
            self.form_ele_tangent(fe, model, domain, soe)?;
        }
        for group in model.dof_groups() {
            self.form_node_tangent(group, domain, soe)?;
        }
        debug!(
            "mass formed from {} FE elements and {} DOF groups",
            model.num_fe_elements(),
            model.num_dof_groups()
        );
        Ok(())
    }

    fn form_ele_tangent(
        &mut self,
        fe: &dyn FeElement,
        model: &AnalysisModel,
        domain: &Domain,
        soe: &mut dyn EigenSoe,
    ) -> FEAResult<()> {
        model.equation_ids(fe, &mut self.ids)?;
        match self.mode {
            FormingMode::Stiffness => {
                let k = fe.form_tangent(TangentMode::Stiffness, domain)?;
                soe.add_to_stiffness(&k, &self.ids)
            }
            FormingMode::Mass => {
                let m = fe.form_tangent(TangentMode::Mass, domain)?;
                soe.add_to_mass(&m, &self.ids)
            }
        }
    }

    fn form_node_tangent(
        &mut self,
        group: &DofGroup,
        domain: &Domain,
        soe: &mut dyn EigenSoe,
    ) -> FEAResult<()> {
        // Multiplier groups carry no mass
        if self.mode != FormingMode::Mass || group.node_tag().is_none() {
            return Ok(());
        }
        self.ids.clear();
        group.equation_ids(&mut self.ids)?;
        let m = group.form_tangent(domain, NodalMatrix::Mass, 1.0)?;
        soe.add_to_mass(&m, &self.ids)
    }

    fn form_unbalance(
        &mut self,
        model: &AnalysisModel,
        domain: &Domain,
        rhs: &mut FEVec,
    ) -> FEAResult<()> {
        assemble_unbalance(model, domain, rhs, &mut self.ids)
    }
}

/// Standard problem: `M` is the identity
#[derive(Debug, Clone, Default)]
pub struct StandardEigenIntegrator {
    ids: Vec<Option<usize>>,
}

impl StandardEigenIntegrator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EigenIntegrator for StandardEigenIntegrator {
    fn form_stiffness(
        &mut self,
        model: &AnalysisModel,
        domain: &Domain,
        soe: &mut dyn EigenSoe,
    ) -> FEAResult<()> {
        soe.zero_stiffness();
        for fe in model.fe_elements() {
            self.form_ele_tangent(fe, model, domain, soe)?;
        }
        debug!("stiffness formed from {} FE elements", model.num_fe_elements());
        Ok(())
    }

    fn form_mass(
        &mut self,
        _model: &AnalysisModel,
        _domain: &Domain,
        soe: &mut dyn EigenSoe,
    ) -> FEAResult<()> {
        soe.set_identity_mass();
        debug!("identity mass of size {}", soe.size());
        Ok(())
    }

    /// Only ever called from the stiffness pass
    fn form_ele_tangent(
        &mut self,
        fe: &dyn FeElement,
        model: &AnalysisModel,
        domain: &Domain,
        soe: &mut dyn EigenSoe,
    ) -> FEAResult<()> {
        model.equation_ids(fe, &mut self.ids)?;
        let k = fe.form_tangent(TangentMode::Stiffness, domain)?;
        soe.add_to_stiffness(&k, &self.ids)
    }

    fn form_node_tangent(
        &mut self,
        _group: &DofGroup,
        _domain: &Domain,
        _soe: &mut dyn EigenSoe,
    ) -> FEAResult<()> {
        Ok(())
    }

    fn form_unbalance(
        &mut self,
        model: &AnalysisModel,
        domain: &Domain,
        rhs: &mut FEVec,
    ) -> FEAResult<()> {
        assemble_unbalance(model, domain, rhs, &mut self.ids)
    }
}

fn assemble_unbalance(
    model: &AnalysisModel,
    domain: &Domain,
    rhs: &mut FEVec,
    ids: &mut Vec<Option<usize>>,
) -> FEAResult<()> {
    if rhs.len() != model.num_eqn() {
        return Err(FEAError::ShapeMismatch {
            expected: format!("vector of length {}", model.num_eqn()),
            found: format!("length {}", rhs.len()),
        });
    }
    rhs.fill(0.0);

    for fe in model.fe_elements() {
        model.equation_ids(fe, ids)?;
        let resid = fe.form_residual(domain)?;
        if resid.len() != ids.len() {
            return Err(FEAError::ShapeMismatch {
                expected: format!("residual of length {}", ids.len()),
                found: format!("length {}", resid.len()),
            });
        }
        for (id, value) in ids.iter().zip(resid.iter()) {
            if let Some(eq) = *id {
                if eq >= rhs.len() {
                    return Err(FEAError::AssemblyIndexOutOfRange {
                        index: eq,
                        size: rhs.len(),
                    });
                }
                rhs[eq] += value;
            }
        }
    }

    for group in model.dof_groups().filter(|g| g.node_tag().is_some()) {
        let load = group.form_residual(domain, 1.0)?;
        group.scatter_add(&load, rhs)?;
    }
    Ok(())
}
