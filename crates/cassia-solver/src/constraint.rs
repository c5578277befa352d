use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::expression::Expression;
use crate::strength::Strength;

static NEXT_CONSTRAINT_ID: AtomicUsize = AtomicUsize::new(1);

/// How a constraint's expression relates to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RelationalOperator {
    /// Less than or equal (<=)
    LessOrEqual,
    /// Equal (==)
    Equal,
    /// Greater than or equal (>=)
    GreaterOrEqual,
}

impl fmt::Display for RelationalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationalOperator::LessOrEqual => write!(f, "<="),
            RelationalOperator::Equal => write!(f, "=="),
            RelationalOperator::GreaterOrEqual => write!(f, ">="),
        }
    }
}

#[derive(Debug)]
struct ConstraintData {
    id: usize,
    expression: Expression,
    operator: RelationalOperator,
    strength: Strength,
}

/// A linear relation `expression OP 0` held at some strength.
///
/// Constraints are compared by identity. Cloning a constraint yields another
/// handle to the same constraint; building a structurally identical one with
/// [`Constraint::new`] does not.
#[derive(Debug, Clone)]
pub struct Constraint(Arc<ConstraintData>);

impl Constraint {
    /// Create a constraint, merging repeated variables and clipping the strength.
    pub fn new(expression: Expression, operator: RelationalOperator, strength: Strength) -> Self {
        Self(Arc::new(ConstraintData {
            id: NEXT_CONSTRAINT_ID.fetch_add(1, Ordering::Relaxed),
            expression: expression.reduced(),
            operator,
            strength: strength.clip(),
        }))
    }

    pub fn id(&self) -> usize {
        self.0.id
    }

    pub fn expression(&self) -> &Expression {
        &self.0.expression
    }

    pub fn operator(&self) -> RelationalOperator {
        self.0.operator
    }

    pub fn strength(&self) -> Strength {
        self.0.strength
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Constraint {}

impl Hash for Constraint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}
