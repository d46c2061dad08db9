//! FEA Constraints - skew constraints and Lagrange assembly for eigen analysis
//!
//! This library builds the global stiffness and mass matrices of a
//! structural model whose nodes are tied by kinematic constraints:
//! - Symmetry / antisymmetry about a line (2D) or plane (3D)
//! - General linear multi-freedom constraints
//! - Prescribed single-freedom values
//!
//! Every constraint is enforced with Lagrange multipliers, so the
//! assembled stiffness is the bordered saddle-point matrix.
//!
//! ## Example
//! ```rust
//! use fea_constraints::prelude::*;
//!
//! let mut domain = Domain::new();
//! domain.add_node(Node::planar(1, 0.0, 0.0))?;
//! domain.add_node(Node::planar(2, 3.0, 4.0).with_lumped_mass(1.0))?;
//! domain.add_element(Truss::new(1, 1, 2, 200e9, 1e-4))?;
//!
//! // Pin node 1
//! domain.add_sp_constraint(SFreedomConstraint::homogeneous(1, 1, 0))?;
//! domain.add_sp_constraint(SFreedomConstraint::homogeneous(2, 1, 1))?;
//!
//! // Node 2 lies on the symmetry line x = 3
//! domain.add_mp_constraint(MFreedomConstraint::skew(1, 2, Line::with_normal([1.0, 0.0])))?;
//!
//! let problem = EigenAnalysis::new(AnalysisOptions::default()).assemble(&mut domain)?;
//!
//! // 4 node DOFs, 2 SP multipliers, 1 MP multiplier
//! assert_eq!(problem.num_eqn(), 7);
//! problem.teardown(&mut domain);
//! # Ok::<(), FEAError>(())
//! ```

pub mod analysis;
pub mod constraints;
pub mod domain;
pub mod error;
pub mod math;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{
        AnalysisModel, AnalysisOptions, AssembledEigenProblem, DofGroup, EigenAnalysis,
        EigenIntegrator, EigenSoe, EqnSlot, MassFormulation, NumbererType, SoeStorage,
    };
    pub use crate::constraints::{
        ConstraintKind, Line, MFreedomConstraint, Plane, SFreedomConstraint, SkewGeometry,
    };
    pub use crate::domain::{Domain, Element, Node, Truss};
    pub use crate::error::{FEAError, FEAResult};
}
