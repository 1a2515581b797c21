//! Error types for the pile modeler

use thiserror::Error;

use crate::modeler::ModelState;

/// Main error type for pile modeling operations
#[derive(Error, Debug)]
pub enum PileError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid layering: {0}")]
    InvalidLayering(String),

    #[error("Stage requires model state {required:?} but the model is {actual:?}")]
    Sequencing {
        required: ModelState,
        actual: ModelState,
    },

    #[error("Solver did not converge at step {step} after {iterations} iterations")]
    SolverNonconvergence { step: usize, iterations: usize },

    #[error("Singular stiffness matrix - pile model is unstable or insufficiently restrained")]
    SolverSingular,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Pile index {0} is out of range")]
    PileIndex(usize),

    #[error("Node {0} not found in domain")]
    NodeNotFound(usize),

    #[error("Element {0} not found in domain")]
    ElementNotFound(usize),

    #[error("Duplicate tag {0} already exists")]
    DuplicateTag(usize),

    #[error("Domain not analyzed - run the analysis first")]
    NotAnalyzed,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for pile modeling operations
pub type PileResult<T> = Result<T, PileError>;
