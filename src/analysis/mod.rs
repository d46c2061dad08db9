//! Analysis - from a constrained domain to assembled eigen matrices

pub mod dof_group;
pub mod fe_element;
pub mod handler;
pub mod integrator;
pub mod lagrange;
pub mod model;
pub mod numberer;
pub mod soe;

pub use dof_group::{DofGroup, EqnSlot, NodalMatrix};
pub use fe_element::{ElementFe, FeElement, TangentMode};
pub use handler::LagrangeConstraintHandler;
pub use integrator::{
    EigenIntegrator, FormingMode, GeneralizedEigenIntegrator, StandardEigenIntegrator,
};
pub use lagrange::{LagrangeMpFe, LagrangeSpFe};
pub use model::AnalysisModel;
pub use numberer::{DofNumberer, PlainNumberer, RcmNumberer};
pub use soe::{DenseEigenSoe, EigenSoe, SparseEigenSoe};

use log::info;
use serde::{Deserialize, Serialize};

use crate::domain::Domain;
use crate::error::{FEAError, FEAResult};
use crate::math::Mat;

/// Equation numbering scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NumbererType {
    /// Ascending DOF group tag
    #[default]
    Plain,
    /// Reverse Cuthill-McKee over DOF group connectivity
    Rcm,
}

/// How the mass matrix is formed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MassFormulation {
    /// Element and nodal masses (`K x = lambda M x`)
    #[default]
    Generalized,
    /// Identity mass (`K x = lambda x`)
    Identity,
}

/// Storage of the assembled matrices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SoeStorage {
    #[default]
    Dense,
    Sparse,
}

/// Options for eigen assembly
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    pub numberer: NumbererType,
    pub mass: MassFormulation,
    pub storage: SoeStorage,
    /// Scale factor applied to every Lagrange constraint block
    pub alpha: f64,
    /// Enable progress output
    pub log: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            numberer: NumbererType::Plain,
            mass: MassFormulation::Generalized,
            storage: SoeStorage::Dense,
            alpha: 1.0,
            log: false,
        }
    }
}

impl AnalysisOptions {
    /// Generalized eigenproblem with default settings
    pub fn generalized() -> Self {
        Self::default()
    }

    /// Standard eigenproblem with identity mass
    pub fn standard() -> Self {
        Self {
            mass: MassFormulation::Identity,
            ..Self::default()
        }
    }

    /// Parse options from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> FEAResult<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn with_numberer(mut self, numberer: NumbererType) -> Self {
        self.numberer = numberer;
        self
    }

    pub fn with_storage(mut self, storage: SoeStorage) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Enable logging
    pub fn with_logging(mut self) -> Self {
        self.log = true;
        self
    }

    pub fn validate(&self) -> FEAResult<()> {
        if !self.alpha.is_finite() || self.alpha == 0.0 {
            return Err(FEAError::InvalidInput(format!(
                "alpha must be finite and non-zero, got {}",
                self.alpha
            )));
        }
        Ok(())
    }
}

/// Result of an assembly run
#[derive(Debug)]
pub struct AssembledEigenProblem {
    pub model: AnalysisModel,
    pub soe: Box<dyn EigenSoe>,
}

impl AssembledEigenProblem {
    pub fn num_eqn(&self) -> usize {
        self.model.num_eqn()
    }

    pub fn stiffness(&self) -> Mat {
        self.soe.stiffness()
    }

    pub fn mass(&self) -> Mat {
        self.soe.mass()
    }

    /// Release the DOF groups and the nodes' back-references
    pub fn teardown(mut self, domain: &mut Domain) {
        self.model.clear_all(domain);
    }
}

/// Drives constraint setup, handling, numbering and assembly
#[derive(Debug, Clone, Default)]
pub struct EigenAnalysis {
    options: AnalysisOptions,
}

impl EigenAnalysis {
    pub fn new(options: AnalysisOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Assemble `K` and `M` for `domain`
    ///
    /// The domain's nodes stay linked to the returned model's DOF groups
    /// until [`AssembledEigenProblem::teardown`] is called. On error all
    /// links made so far are released.
    pub fn assemble(&self, domain: &mut Domain) -> FEAResult<AssembledEigenProblem> {
        self.options.validate()?;
        domain.setup_constraints()?;

        let handler = LagrangeConstraintHandler::new(self.options.alpha)?;
        let mut model = handler.handle(domain)?;

        match self.build(&mut model, domain) {
            Ok(soe) => {
                if self.options.log {
                    info!(
                        "assembled eigenproblem: {} equations, {} nodes, {} elements",
                        model.num_eqn(),
                        domain.num_nodes(),
                        domain.num_elements()
                    );
                }
                Ok(AssembledEigenProblem { model, soe })
            }
            Err(e) => {
                model.clear_all(domain);
                Err(e)
            }
        }
    }

    fn build(&self, model: &mut AnalysisModel, domain: &Domain) -> FEAResult<Box<dyn EigenSoe>> {
        let numberer: Box<dyn DofNumberer> = match self.options.numberer {
            NumbererType::Plain => Box::new(PlainNumberer),
            NumbererType::Rcm => Box::new(RcmNumberer),
        };
        let num_eqn = numberer.number(model)?;

        let mut soe: Box<dyn EigenSoe> = match self.options.storage {
            SoeStorage::Dense => Box::new(DenseEigenSoe::default()),
            SoeStorage::Sparse => Box::new(SparseEigenSoe::default()),
        };
        soe.set_size(num_eqn);

        let mut integrator: Box<dyn EigenIntegrator> = match self.options.mass {
            MassFormulation::Generalized => Box::new(GeneralizedEigenIntegrator::new()),
            MassFormulation::Identity => Box::new(StandardEigenIntegrator::new()),
        };
        integrator.form_stiffness(model, domain, soe.as_mut())?;
        integrator.form_mass(model, domain, soe.as_mut())?;
        Ok(soe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_json() {
        let options =
            AnalysisOptions::from_json(r#"{"numberer": "Rcm", "storage": "Sparse", "alpha": 10.0}"#)
                .unwrap();
        assert_eq!(options.numberer, NumbererType::Rcm);
        assert_eq!(options.storage, SoeStorage::Sparse);
        assert_eq!(options.mass, MassFormulation::Generalized);
        assert_eq!(options.alpha, 10.0);
    }

    #[test]
    fn test_options_reject_zero_alpha() {
        assert!(matches!(
            AnalysisOptions::from_json(r#"{"alpha": 0.0}"#),
            Err(FEAError::InvalidInput(_))
        ));
        assert!(matches!(
            AnalysisOptions::from_json("{not json"),
            Err(FEAError::SerializationError(_))
        ));
    }

    #[test]
    fn test_builders() {
        let options = AnalysisOptions::standard()
            .with_numberer(NumbererType::Rcm)
            .with_alpha(2.0)
            .with_logging();
        assert_eq!(options.mass, MassFormulation::Identity);
        assert_eq!(options.alpha, 2.0);
        assert!(options.log);
    }
}
