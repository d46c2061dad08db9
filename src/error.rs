//! Error types for constraint setup, numbering and assembly

use thiserror::Error;

/// Main error type for FEA operations
///
/// Every variant is a configuration fault detected before or during an
/// assembly pass. None of them is retried; the caller decides whether the
/// whole analysis is abandoned.
#[derive(Error, Debug)]
pub enum FEAError {
    #[error("Node {0} not found in domain")]
    UnknownNode(i32),

    #[error("Degenerate normal: {0}")]
    DegenerateNormal(String),

    #[error("Invalid size {0}")]
    InvalidSize(usize),

    #[error("Index {index} out of range for size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("Shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: String, found: String },

    #[error("Equation {index} is outside the system of size {size}")]
    AssemblyIndexOutOfRange { index: usize, size: usize },

    #[error("DOF group {0} is not bound to a node")]
    NoBoundNode(i32),

    #[error("DOF group {0} has an unnumbered slot")]
    Unnumbered(i32),

    #[error("Constraint {0} has not been set up")]
    NotConfigured(i32),

    #[error("Duplicate tag '{0}' already exists")]
    DuplicateTag(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for FEA operations
pub type FEAResult<T> = Result<T, FEAError>;
