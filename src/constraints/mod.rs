//! Kinematic constraints

mod geometry;
mod mp_constraint;
mod skew;
mod sp_constraint;

pub use geometry::{Line, Plane, SkewGeometry};
pub use mp_constraint::{ConstraintKind, MFreedomConstraint};
pub use sp_constraint::SFreedomConstraint;
