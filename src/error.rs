//! Error types for the formulation engine.
//!
//! Command-level code wraps these in [`anyhow::Error`] with extra context; the library core
//! returns them directly so callers can tell the failure kinds apart.
use crate::solver::SolveStatus;
use thiserror::Error;

/// Convenience alias for results produced by the library core
pub type ScucResult<T> = Result<T, ScucError>;

/// The ways in which loading, formulating or solving a problem can fail
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScucError {
    /// A field in the input document is malformed or missing
    #[error("Invalid input for `{field}`: {message}")]
    InputFormat {
        /// Path to the offending field
        field: String,
        /// What is wrong with it
        message: String,
    },
    /// A time series does not match the length of the time horizon
    #[error("`{field}` has {found} entries but the time horizon is {expected} hours")]
    DimensionMismatch {
        /// Path to the offending field
        field: String,
        /// Length of the time horizon
        expected: usize,
        /// Number of entries supplied
        found: usize,
    },
    /// The reduced network matrix cannot be inverted
    #[error("Invalid network topology: {0}")]
    Topology(String),
    /// An outage cannot be represented with distribution factors
    #[error("Outage of line `{line}` islands part of the network")]
    ContingencySingularity {
        /// Name of the outaged line
        line: String,
    },
    /// Internal inconsistency while building the model
    #[error("Model construction failed: {0}")]
    ModelConstruction(String),
    /// The solver finished without a usable solution
    #[error("Solver finished with status: {status}")]
    SolverStatus {
        /// The status reported by the solver
        status: SolveStatus,
    },
}

impl ScucError {
    /// Create a new [`ScucError::InputFormat`]
    pub fn input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InputFormat {
            field: field.into(),
            message: message.into(),
        }
    }
}
