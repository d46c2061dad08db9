//! Lagrange-multiplier enforcement of constraints
//!
//! Each constraint becomes an ordinary FE element whose tangent is the
//! bordered block `[[0, a*C^T], [a*C, 0]]`, so the integrator assembles
//! it without knowing it is a constraint.

use crate::analysis::fe_element::{FeElement, TangentMode};
use crate::constraints::{MFreedomConstraint, SFreedomConstraint};
use crate::domain::Domain;
use crate::error::{FEAError, FEAResult};
use crate::math::{Mat, Vec as FEVec};

/// Enforces an `MFreedomConstraint` with one multiplier per constrained DOF
///
/// Local layout: constrained node DOFs, retained node DOFs, multipliers.
/// Row `l` of `C` holds `-1` at `constrained_dofs[l]` and `Ccr[l][j]` at
/// `retained_dofs[j]`.
#[derive(Debug, Clone)]
pub struct LagrangeMpFe {
    tag: i32,
    constraint: i32,
    /// [constrained group, retained group, multiplier group]
    groups: [i32; 3],
    alpha: f64,
}

impl LagrangeMpFe {
    pub fn new(
        tag: i32,
        constraint: i32,
        constrained_group: i32,
        retained_group: i32,
        multiplier_group: i32,
        alpha: f64,
    ) -> Self {
        Self {
            tag,
            constraint,
            groups: [constrained_group, retained_group, multiplier_group],
            alpha,
        }
    }

    pub fn constraint_tag(&self) -> i32 {
        self.constraint
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    fn constraint<'a>(&self, domain: &'a Domain) -> FEAResult<&'a MFreedomConstraint> {
        let mp = domain.mp_constraint(self.constraint).ok_or_else(|| {
            FEAError::InvalidInput(format!("mp constraint {} is not in the domain", self.constraint))
        })?;
        if !mp.is_configured() {
            return Err(FEAError::NotConfigured(mp.tag()));
        }
        Ok(mp)
    }

    /// (constrained ndf, retained ndf, multipliers)
    ///
    /// The partition must still fit the nodes as they are now.
    fn layout(&self, mp: &MFreedomConstraint, domain: &Domain) -> FEAResult<(usize, usize, usize)> {
        let ndf_c = domain.try_node(mp.constrained_node_tag())?.ndf();
        let ndf_r = domain.try_node(mp.retained_node_tag())?.ndf();
        let checks = [(mp.constrained_dofs(), ndf_c), (mp.retained_dofs(), ndf_r)];
        for (dofs, ndf) in checks {
            if let Some(&index) = dofs.iter().find(|&&d| d >= ndf) {
                return Err(FEAError::IndexOutOfRange { index, size: ndf });
            }
        }
        Ok((ndf_c, ndf_r, mp.num_constrained()))
    }
}

impl FeElement for LagrangeMpFe {
    fn tag(&self) -> i32 {
        self.tag
    }

    fn dof_group_tags(&self) -> &[i32] {
        &self.groups
    }

    fn form_tangent(&self, mode: TangentMode, domain: &Domain) -> FEAResult<Mat> {
        let mp = self.constraint(domain)?;
        let (ndf_c, ndf_r, num_mult) = self.layout(mp, domain)?;
        let size = ndf_c + ndf_r + num_mult;
        let mut tang = Mat::zeros(size, size);
        if mode != TangentMode::Stiffness {
            return Ok(tang);
        }

        let ccr = mp.constraint_matrix();
        for (l, &dof_c) in mp.constrained_dofs().iter().enumerate() {
            let row = ndf_c + ndf_r + l;
            tang[(row, dof_c)] = -self.alpha;
            tang[(dof_c, row)] = -self.alpha;
            for (j, &dof_r) in mp.retained_dofs().iter().enumerate() {
                let col = ndf_c + dof_r;
                let value = self.alpha * ccr[(l, j)];
                tang[(row, col)] = value;
                tang[(col, row)] = value;
            }
        }
        Ok(tang)
    }

    fn form_residual(&self, domain: &Domain) -> FEAResult<FEVec> {
        let mp = self.constraint(domain)?;
        let (ndf_c, ndf_r, num_mult) = self.layout(mp, domain)?;
        Ok(FEVec::zeros(ndf_c + ndf_r + num_mult))
    }
}

/// Enforces an `SFreedomConstraint` with a single multiplier
///
/// Local layout: node DOFs followed by the multiplier.
#[derive(Debug, Clone)]
pub struct LagrangeSpFe {
    tag: i32,
    constraint: i32,
    /// [node group, multiplier group]
    groups: [i32; 2],
    alpha: f64,
}

impl LagrangeSpFe {
    pub fn new(tag: i32, constraint: i32, node_group: i32, multiplier_group: i32, alpha: f64) -> Self {
        Self {
            tag,
            constraint,
            groups: [node_group, multiplier_group],
            alpha,
        }
    }

    pub fn constraint_tag(&self) -> i32 {
        self.constraint
    }

    fn constraint<'a>(&self, domain: &'a Domain) -> FEAResult<&'a SFreedomConstraint> {
        domain.sp_constraint(self.constraint).ok_or_else(|| {
            FEAError::InvalidInput(format!("sp constraint {} is not in the domain", self.constraint))
        })
    }
}

impl FeElement for LagrangeSpFe {
    fn tag(&self) -> i32 {
        self.tag
    }

    fn dof_group_tags(&self) -> &[i32] {
        &self.groups
    }

    fn form_tangent(&self, mode: TangentMode, domain: &Domain) -> FEAResult<Mat> {
        let sp = self.constraint(domain)?;
        sp.validate(domain)?;
        let ndf = domain.try_node(sp.node_tag())?.ndf();
        let mut tang = Mat::zeros(ndf + 1, ndf + 1);
        if mode == TangentMode::Stiffness {
            tang[(sp.dof(), ndf)] = self.alpha;
            tang[(ndf, sp.dof())] = self.alpha;
        }
        Ok(tang)
    }

    /// `alpha * (value - trial)` at the multiplier row
    fn form_residual(&self, domain: &Domain) -> FEAResult<FEVec> {
        let sp = self.constraint(domain)?;
        sp.validate(domain)?;
        let node = domain.try_node(sp.node_tag())?;
        let ndf = node.ndf();
        let mut resid = FEVec::zeros(ndf + 1);
        resid[ndf] = self.alpha * (sp.value() - node.trial_disp()[sp.dof()]);
        Ok(resid)
    }
}
