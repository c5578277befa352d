//! Error types for solver operations
//!
//! Every public operation has its own error enum so callers can match on
//! exactly the failures that operation can produce. Internal errors signal a
//! broken tableau rather than bad input; after one the solver should be reset.

use thiserror::Error;

/// A failure of the simplex machinery itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InternalSolverError {
    #[error("the objective is unbounded")]
    ObjectiveUnbounded,
    #[error("dual optimization found no entering symbol")]
    DualOptimizeFailed,
    #[error("failed to find a leaving row for the constraint marker")]
    MissingLeavingRow,
    #[error("exceeded the limit of {0} pivots in a single optimization")]
    IterationLimitExceeded(usize),
    #[error("the solver rejected a synthesized edit constraint")]
    EditConstraintRejected,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddConstraintError {
    #[error("the constraint has already been added to the solver")]
    DuplicateConstraint,
    #[error("the required constraint cannot be satisfied")]
    UnsatisfiableConstraint,
    #[error("internal solver error: {0}")]
    Internal(#[from] InternalSolverError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoveConstraintError {
    #[error("the constraint has not been added to the solver")]
    UnknownConstraint,
    #[error("internal solver error: {0}")]
    Internal(#[from] InternalSolverError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddEditVariableError {
    #[error("the variable is already an edit variable")]
    DuplicateEditVariable,
    #[error("an edit variable cannot have required strength")]
    BadRequiredStrength,
    #[error("internal solver error: {0}")]
    Internal(#[from] InternalSolverError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoveEditVariableError {
    #[error("the variable is not an edit variable")]
    UnknownEditVariable,
    #[error("internal solver error: {0}")]
    Internal(#[from] InternalSolverError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SuggestValueError {
    #[error("the variable is not an edit variable")]
    UnknownEditVariable,
    #[error("the suggested value is not a finite number")]
    NonFiniteValue,
    #[error("internal solver error: {0}")]
    Internal(#[from] InternalSolverError),
}
