use std::ops::{Add, Mul, Neg, Sub};

use crate::constraint::{Constraint, RelationalOperator};
use crate::strength::Strength;
use crate::variable::Variable;

/// `coefficient * variable`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Term {
    pub variable: Variable,
    pub coefficient: f64,
}

impl Term {
    pub fn new(variable: Variable, coefficient: f64) -> Self {
        Self {
            variable,
            coefficient,
        }
    }
}

/// A linear expression: `constant + Σ terms`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expression {
    pub terms: Vec<Term>,
    pub constant: f64,
}

impl Expression {
    pub fn new(terms: Vec<Term>, constant: f64) -> Self {
        Self { terms, constant }
    }

    pub fn from_constant(constant: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant,
        }
    }

    pub fn from_term(term: Term) -> Self {
        Self {
            terms: vec![term],
            constant: 0.0,
        }
    }

    /// Combine terms that share a variable, keeping first-seen order.
    pub(crate) fn reduced(&self) -> Expression {
        let mut terms: Vec<Term> = Vec::with_capacity(self.terms.len());
        for term in &self.terms {
            match terms.iter_mut().find(|t| t.variable == term.variable) {
                Some(existing) => existing.coefficient += term.coefficient,
                None => terms.push(*term),
            }
        }
        Expression::new(terms, self.constant)
    }

    /// `self == rhs`
    pub fn equal_to(self, rhs: impl Into<Expression>, strength: Strength) -> Constraint {
        Constraint::new(self - rhs.into(), RelationalOperator::Equal, strength)
    }

    /// `self <= rhs`
    pub fn less_or_equal(self, rhs: impl Into<Expression>, strength: Strength) -> Constraint {
        Constraint::new(self - rhs.into(), RelationalOperator::LessOrEqual, strength)
    }

    /// `self >= rhs`
    pub fn greater_or_equal(self, rhs: impl Into<Expression>, strength: Strength) -> Constraint {
        Constraint::new(self - rhs.into(), RelationalOperator::GreaterOrEqual, strength)
    }
}

impl From<f64> for Expression {
    fn from(constant: f64) -> Self {
        Expression::from_constant(constant)
    }
}

impl From<Term> for Expression {
    fn from(term: Term) -> Self {
        Expression::from_term(term)
    }
}

impl From<Variable> for Expression {
    fn from(variable: Variable) -> Self {
        Expression::from_term(Term::new(variable, 1.0))
    }
}

impl From<Variable> for Term {
    fn from(variable: Variable) -> Self {
        Term::new(variable, 1.0)
    }
}

impl<T: Into<Expression>> Add<T> for Expression {
    type Output = Expression;

    fn add(mut self, rhs: T) -> Expression {
        let rhs = rhs.into();
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
        self
    }
}

impl<T: Into<Expression>> Sub<T> for Expression {
    type Output = Expression;

    fn sub(self, rhs: T) -> Expression {
        self + -rhs.into()
    }
}

impl Mul<f64> for Expression {
    type Output = Expression;

    fn mul(mut self, rhs: f64) -> Expression {
        for term in &mut self.terms {
            term.coefficient *= rhs;
        }
        self.constant *= rhs;
        self
    }
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        self * -1.0
    }
}

impl Mul<f64> for Term {
    type Output = Term;

    fn mul(self, rhs: f64) -> Term {
        Term::new(self.variable, self.coefficient * rhs)
    }
}

impl Neg for Term {
    type Output = Term;

    fn neg(self) -> Term {
        self * -1.0
    }
}

impl Mul<f64> for Variable {
    type Output = Term;

    fn mul(self, rhs: f64) -> Term {
        Term::new(self, rhs)
    }
}

impl Mul<Variable> for f64 {
    type Output = Term;

    fn mul(self, rhs: Variable) -> Term {
        Term::new(rhs, self)
    }
}

impl Neg for Variable {
    type Output = Term;

    fn neg(self) -> Term {
        Term::new(self, -1.0)
    }
}

// Variables and terms promote to expressions for every other operator.
macro_rules! promote_to_expression {
    ($($ty:ty),*) => {$(
        impl<T: Into<Expression>> Add<T> for $ty {
            type Output = Expression;

            fn add(self, rhs: T) -> Expression {
                Expression::from(self) + rhs
            }
        }

        impl<T: Into<Expression>> Sub<T> for $ty {
            type Output = Expression;

            fn sub(self, rhs: T) -> Expression {
                Expression::from(self) - rhs
            }
        }

        impl $ty {
            /// `self == rhs`
            pub fn equal_to(self, rhs: impl Into<Expression>, strength: Strength) -> Constraint {
                Expression::from(self).equal_to(rhs, strength)
            }

            /// `self <= rhs`
            pub fn less_or_equal(self, rhs: impl Into<Expression>, strength: Strength) -> Constraint {
                Expression::from(self).less_or_equal(rhs, strength)
            }

            /// `self >= rhs`
            pub fn greater_or_equal(self, rhs: impl Into<Expression>, strength: Strength) -> Constraint {
                Expression::from(self).greater_or_equal(rhs, strength)
            }
        }
    )*};
}

promote_to_expression!(Variable, Term);
