//! An incremental implementation of the Cassowary linear constraint solver.
//!
//! Constraints are linear (in)equalities over [`Variable`]s, each held at a
//! [`Strength`]. The [`Solver`] keeps every required constraint satisfied and
//! the others as close to satisfied as possible, strongest first, while
//! constraints come and go and edit variables are dragged around.

mod changes;
mod constraint;
mod error;
mod expression;
mod row;
mod solver;
mod strength;
mod symbol;
mod variable;

#[cfg(test)]
mod proptests;

pub use constraint::{Constraint, RelationalOperator};
pub use error::{
    AddConstraintError, AddEditVariableError, InternalSolverError, RemoveConstraintError,
    RemoveEditVariableError, SuggestValueError,
};
pub use expression::{Expression, Term};
pub use solver::Solver;
pub use strength::Strength;
pub use variable::Variable;
