//! The incremental constraint solver.
//!
//! Constraints are encoded as rows of a simplex tableau keyed by their basic
//! symbol. Inequalities gain a slack symbol, non-required constraints gain
//! error symbols weighted by their strength in the objective, and required
//! equalities gain a dummy marker. The tableau is kept optimal after every
//! operation, so adding, removing or editing one constraint only costs the
//! pivots needed to repair the solution it disturbed.

mod dump;
mod simplex;

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use tracing::{debug, error, trace};

use crate::changes::ChangeLog;
use crate::constraint::{Constraint, RelationalOperator};
use crate::error::{
    AddConstraintError, AddEditVariableError, InternalSolverError, RemoveConstraintError,
    RemoveEditVariableError, SuggestValueError,
};
use crate::expression::Expression;
use crate::row::{Row, near_zero};
use crate::strength::Strength;
use crate::symbol::{Symbol, SymbolKind};
use crate::variable::Variable;

/// Default pivot budget for a single optimization pass.
const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// The symbols a constraint introduced into the tableau.
#[derive(Debug, Clone, Copy)]
struct Tag {
    marker: Symbol,
    other: Symbol,
}

/// State kept for a variable registered with `add_edit_variable`.
#[derive(Debug, Clone)]
struct EditInfo {
    tag: Tag,
    constraint: Constraint,
    /// Last suggested value
    constant: f64,
}

#[derive(Debug, Clone, Copy)]
struct VariableRecord {
    symbol: Symbol,
    /// Number of live constraint terms that mention the variable
    references: usize,
}

/// Which objective an optimization pass minimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObjectiveKind {
    Primary,
    /// Phase-one objective used while inserting a row without a subject
    Artificial,
}

/// The part of the solver an artificial insertion may disturb.
struct Snapshot {
    rows: BTreeMap<Symbol, Row>,
    objective: Row,
    infeasible_rows: Vec<Symbol>,
}

/// Cassowary constraint solver.
///
/// ```
/// use cassia_solver::{Solver, Strength, Variable};
///
/// let left = Variable::new();
/// let width = Variable::new();
/// let right = Variable::new();
///
/// let mut solver = Solver::new();
/// solver.add_constraint(right.equal_to(left + width, Strength::REQUIRED)).unwrap();
/// solver.add_constraint(left.equal_to(0.0, Strength::REQUIRED)).unwrap();
/// solver.add_constraint(width.greater_or_equal(0.0, Strength::REQUIRED)).unwrap();
///
/// solver.add_edit_variable(width, Strength::STRONG).unwrap();
/// solver.suggest_value(width, 50.0).unwrap();
/// solver.fetch_changes();
///
/// assert_eq!(solver.get_value(right), 50.0);
/// ```
#[derive(Debug)]
pub struct Solver {
    constraints: IndexMap<Constraint, Tag>,
    edits: IndexMap<Variable, EditInfo>,
    variables: HashMap<Variable, VariableRecord>,
    variable_for_symbol: HashMap<Symbol, Variable>,
    /// Values handed out by the last `fetch_changes`
    published: HashMap<Variable, f64>,
    names: HashMap<Variable, String>,
    changes: ChangeLog,
    rows: BTreeMap<Symbol, Row>,
    objective: Row,
    artificial: Option<Row>,
    infeasible_rows: Vec<Symbol>,
    id_tick: u64,
    max_iterations: usize,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            constraints: IndexMap::new(),
            edits: IndexMap::new(),
            variables: HashMap::new(),
            variable_for_symbol: HashMap::new(),
            published: HashMap::new(),
            names: HashMap::new(),
            changes: ChangeLog::default(),
            rows: BTreeMap::new(),
            objective: Row::new(0.0),
            artificial: None,
            infeasible_rows: Vec::new(),
            id_tick: 0,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the number of pivots a single optimization pass may perform.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Add every constraint, stopping at the first failure.
    pub fn add_constraints<I>(&mut self, constraints: I) -> Result<(), AddConstraintError>
    where
        I: IntoIterator<Item = Constraint>,
    {
        for constraint in constraints {
            self.add_constraint(constraint)?;
        }
        Ok(())
    }

    /// Add a constraint to the solver.
    ///
    /// Fails with `DuplicateConstraint` if this very constraint was already
    /// added, and with `UnsatisfiableConstraint` if it is required and
    /// contradicts the required constraints already present. In both cases
    /// the solver is left as it was.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), AddConstraintError> {
        self.insert_constraint(constraint).map(|_| ())
    }

    fn insert_constraint(&mut self, constraint: Constraint) -> Result<Tag, AddConstraintError> {
        if self.constraints.contains_key(&constraint) {
            return Err(AddConstraintError::DuplicateConstraint);
        }

        let (mut row, tag) = self.create_row(&constraint);
        let mut subject = choose_subject(&row, tag);

        // A row made only of dummies is either redundant (zero constant) or a
        // contradiction among required equalities.
        if subject.is_invalid() && row.is_all_dummy_cells() {
            if !near_zero(row.constant()) {
                self.discard_row(&constraint, tag);
                debug!(constraint = constraint.id(), "rejected unsatisfiable constraint");
                return Err(AddConstraintError::UnsatisfiableConstraint);
            }
            subject = tag.marker;
        }

        if subject.is_invalid() {
            let snapshot = self.snapshot();
            match self.add_with_artificial_variable(&row) {
                Ok(true) => {}
                Ok(false) => {
                    self.restore(snapshot);
                    self.discard_row(&constraint, tag);
                    debug!(constraint = constraint.id(), "rejected unsatisfiable constraint");
                    return Err(AddConstraintError::UnsatisfiableConstraint);
                }
                Err(err) => {
                    self.restore(snapshot);
                    self.discard_row(&constraint, tag);
                    return Err(err.into());
                }
            }
        } else {
            row.solve_for_symbol(subject);
            self.substitute(subject, &row);
            self.mark_if_external(subject);
            self.rows.insert(subject, row);
        }

        debug!(
            constraint = constraint.id(),
            operator = %constraint.operator(),
            strength = constraint.strength().value(),
            marker = %tag.marker,
            "added constraint"
        );
        self.constraints.insert(constraint, tag);

        self.optimize(ObjectiveKind::Primary)?;
        self.dual_optimize()?;
        Ok(tag)
    }

    /// Remove a previously added constraint.
    ///
    /// An unknown constraint yields `UnknownConstraint` and changes nothing.
    pub fn remove_constraint(&mut self, constraint: &Constraint) -> Result<(), RemoveConstraintError> {
        let Some(tag) = self.constraints.shift_remove(constraint) else {
            return Err(RemoveConstraintError::UnknownConstraint);
        };

        // The objective must forget the error symbols before their rows go.
        self.remove_constraint_effects(constraint, tag);

        if self.rows.remove(&tag.marker).is_none() {
            let Some((leaving, mut row)) = self.take_marker_leaving_row(tag.marker) else {
                error!(constraint = constraint.id(), marker = %tag.marker, "no leaving row for marker");
                return Err(InternalSolverError::MissingLeavingRow.into());
            };
            row.solve_for_symbol_pair(leaving, tag.marker);
            self.substitute(tag.marker, &row);
            self.mark_if_external(leaving);
        }

        self.optimize(ObjectiveKind::Primary)?;
        self.dual_optimize()?;
        self.release_variables(constraint);

        // Removing an edit constraint directly retires its edit variable.
        if let Some(index) = self
            .edits
            .values()
            .position(|info| info.constraint == *constraint)
        {
            self.edits.shift_remove_index(index);
        }

        debug!(constraint = constraint.id(), "removed constraint");
        Ok(())
    }

    pub fn has_constraint(&self, constraint: &Constraint) -> bool {
        self.constraints.contains_key(constraint)
    }

    /// Constraints currently in the solver, in the order they were added.
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.keys()
    }

    /// Register `variable` so its value can be driven with `suggest_value`.
    ///
    /// The strength is clipped into `[0, REQUIRED)`; a required edit variable
    /// would pin the variable and is refused.
    pub fn add_edit_variable(
        &mut self,
        variable: Variable,
        strength: Strength,
    ) -> Result<(), AddEditVariableError> {
        if self.edits.contains_key(&variable) {
            return Err(AddEditVariableError::DuplicateEditVariable);
        }
        if strength.is_required() {
            return Err(AddEditVariableError::BadRequiredStrength);
        }
        let strength = strength.clip();

        let constraint = Constraint::new(
            Expression::from(variable),
            RelationalOperator::Equal,
            strength,
        );
        let tag = match self.insert_constraint(constraint.clone()) {
            Ok(tag) => tag,
            Err(AddConstraintError::Internal(err)) => return Err(err.into()),
            Err(err) => {
                error!(%err, "edit constraint rejected");
                return Err(InternalSolverError::EditConstraintRejected.into());
            }
        };

        debug!(variable = variable.id(), strength = strength.value(), "added edit variable");
        self.edits.insert(
            variable,
            EditInfo {
                tag,
                constraint,
                constant: 0.0,
            },
        );
        Ok(())
    }

    pub fn remove_edit_variable(&mut self, variable: Variable) -> Result<(), RemoveEditVariableError> {
        let Some(info) = self.edits.shift_remove(&variable) else {
            return Err(RemoveEditVariableError::UnknownEditVariable);
        };
        match self.remove_constraint(&info.constraint) {
            Ok(()) => {}
            Err(RemoveConstraintError::Internal(err)) => return Err(err.into()),
            Err(RemoveConstraintError::UnknownConstraint) => {
                debug!(variable = variable.id(), "edit constraint already removed");
            }
        }
        debug!(variable = variable.id(), "removed edit variable");
        Ok(())
    }

    pub fn has_edit_variable(&self, variable: Variable) -> bool {
        self.edits.contains_key(&variable)
    }

    /// Edit variables in the order they were added.
    pub fn edit_variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.edits.keys().copied()
    }

    /// Suggest a value for an edit variable and re-solve.
    pub fn suggest_value(&mut self, variable: Variable, value: f64) -> Result<(), SuggestValueError> {
        let Some(info) = self.edits.get_mut(&variable) else {
            return Err(SuggestValueError::UnknownEditVariable);
        };
        if !value.is_finite() {
            debug!(variable = variable.id(), value, "rejected non-finite suggestion");
            return Err(SuggestValueError::NonFiniteValue);
        }
        let delta = value - info.constant;
        info.constant = value;
        let tag = info.tag;
        if delta == 0.0 {
            return Ok(());
        }
        trace!(
            variable = variable.id(),
            value,
            delta,
            pending = self.changes.pending(),
            "suggest value"
        );

        if let Some(row) = self.rows.get_mut(&tag.marker) {
            if row.add_constant(-delta) < 0.0 {
                self.infeasible_rows.push(tag.marker);
            }
        } else if let Some(row) = self.rows.get_mut(&tag.other) {
            if row.add_constant(delta) < 0.0 {
                self.infeasible_rows.push(tag.other);
            }
        } else {
            for (&symbol, row) in self.rows.iter_mut() {
                let coefficient = row.coefficient_for(tag.marker);
                if coefficient == 0.0 {
                    continue;
                }
                let constant = row.add_constant(delta * coefficient);
                if symbol.is_external() {
                    if let Some(&changed) = self.variable_for_symbol.get(&symbol) {
                        self.changes.mark(changed);
                    }
                } else if constant < 0.0 {
                    self.infeasible_rows.push(symbol);
                }
            }
        }

        self.dual_optimize()?;
        Ok(())
    }

    /// Publish solved values and return the variables whose value changed
    /// since the previous call.
    ///
    /// Each change is reported exactly once, carrying the latest value; a
    /// variable that moved and came back between two calls is not reported.
    pub fn fetch_changes(&mut self) -> Vec<(Variable, f64)> {
        let touched = self.changes.close_generation();
        let mut changes = Vec::new();
        for variable in touched {
            // Adding zero turns a -0.0 left by row scaling into 0.0.
            let value = self.solved_value(variable) + 0.0;
            let previous = self.published.get(&variable).copied().unwrap_or(0.0);
            if value != previous {
                changes.push((variable, value));
            }
            if value == 0.0 && !self.variables.contains_key(&variable) {
                self.published.remove(&variable);
            } else {
                self.published.insert(variable, value);
            }
        }
        trace!(
            generation = self.changes.generation(),
            changed = changes.len(),
            "fetched changes"
        );
        changes
    }

    /// The value published for `variable` by the last `fetch_changes`.
    pub fn get_value(&self, variable: Variable) -> f64 {
        self.published.get(&variable).copied().unwrap_or(0.0)
    }

    /// Attach a name to `variable` for `dump` output.
    pub fn name_variable(&mut self, variable: Variable, name: impl Into<String>) {
        self.names.insert(variable, name.into());
    }

    /// The name attached with `name_variable`, if any.
    pub fn variable_name(&self, variable: Variable) -> Option<&str> {
        self.names.get(&variable).map(String::as_str)
    }

    /// Drop every constraint, edit variable and published value.
    ///
    /// The pivot limit is kept.
    pub fn reset(&mut self) {
        debug!(constraints = self.constraints.len(), "reset solver");
        *self = Self::new().with_max_iterations(self.max_iterations);
    }

    /// The current tableau value of `variable`: its row constant when basic,
    /// zero otherwise.
    fn solved_value(&self, variable: Variable) -> f64 {
        self.variables
            .get(&variable)
            .and_then(|record| self.rows.get(&record.symbol))
            .map_or(0.0, Row::constant)
    }

    fn new_symbol(&mut self, kind: SymbolKind) -> Symbol {
        self.id_tick += 1;
        Symbol::new(self.id_tick, kind)
    }

    /// The external symbol for `variable`, created on first use. Each call
    /// takes one reference, given back by `release_variables`.
    fn acquire_variable(&mut self, variable: Variable) -> Symbol {
        if let Some(record) = self.variables.get_mut(&variable) {
            record.references += 1;
            return record.symbol;
        }
        let symbol = self.new_symbol(SymbolKind::External);
        self.variables.insert(
            variable,
            VariableRecord {
                symbol,
                references: 1,
            },
        );
        self.variable_for_symbol.insert(symbol, variable);
        symbol
    }

    fn release_variables(&mut self, constraint: &Constraint) {
        for term in &constraint.expression().terms {
            if near_zero(term.coefficient) {
                continue;
            }
            let Some(record) = self.variables.get_mut(&term.variable) else {
                continue;
            };
            record.references = record.references.saturating_sub(1);
            if record.references > 0 {
                continue;
            }
            let symbol = record.symbol;
            self.variables.remove(&term.variable);
            self.variable_for_symbol.remove(&symbol);
            self.changes.mark(term.variable);
        }
    }

    fn mark_if_external(&mut self, symbol: Symbol) {
        if symbol.is_external() {
            if let Some(&variable) = self.variable_for_symbol.get(&symbol) {
                self.changes.mark(variable);
            }
        }
    }

    /// Build the tableau row for `constraint`.
    ///
    /// Basic variables are replaced by their rows so that the result only
    /// mentions non-basic symbols. The returned row has a non-negative constant.
    fn create_row(&mut self, constraint: &Constraint) -> (Row, Tag) {
        let expression = constraint.expression();
        let mut row = Row::new(expression.constant);

        for term in &expression.terms {
            if near_zero(term.coefficient) {
                continue;
            }
            let symbol = self.acquire_variable(term.variable);
            match self.rows.get(&symbol) {
                Some(basic) => {
                    row.add_row(basic, term.coefficient);
                }
                None => row.add_symbol(symbol, term.coefficient),
            }
        }

        let strength = constraint.strength();
        let tag = match constraint.operator() {
            RelationalOperator::LessOrEqual | RelationalOperator::GreaterOrEqual => {
                let coefficient = if constraint.operator() == RelationalOperator::LessOrEqual {
                    1.0
                } else {
                    -1.0
                };
                let slack = self.new_symbol(SymbolKind::Slack);
                row.add_symbol(slack, coefficient);

                let mut other = Symbol::invalid();
                if !strength.is_required() {
                    let error = self.new_symbol(SymbolKind::Error);
                    row.add_symbol(error, -coefficient);
                    self.objective.add_symbol(error, strength.value());
                    other = error;
                }
                Tag {
                    marker: slack,
                    other,
                }
            }
            RelationalOperator::Equal if strength.is_required() => {
                let dummy = self.new_symbol(SymbolKind::Dummy);
                row.add_symbol(dummy, 1.0);
                Tag {
                    marker: dummy,
                    other: Symbol::invalid(),
                }
            }
            RelationalOperator::Equal => {
                let err_plus = self.new_symbol(SymbolKind::Error);
                let err_minus = self.new_symbol(SymbolKind::Error);
                row.add_symbol(err_plus, -1.0);
                row.add_symbol(err_minus, 1.0);
                self.objective.add_symbol(err_plus, strength.value());
                self.objective.add_symbol(err_minus, strength.value());
                Tag {
                    marker: err_plus,
                    other: err_minus,
                }
            }
        };

        if row.constant() < 0.0 {
            row.reverse_sign();
        }
        (row, tag)
    }

    /// Undo the bookkeeping `create_row` did for a constraint that was not added.
    fn discard_row(&mut self, constraint: &Constraint, tag: Tag) {
        for symbol in [tag.marker, tag.other] {
            if symbol.is_error() {
                self.objective.remove(symbol);
            }
        }
        self.release_variables(constraint);
    }

    fn remove_constraint_effects(&mut self, constraint: &Constraint, tag: Tag) {
        let strength = constraint.strength().value();
        for marker in [tag.marker, tag.other] {
            if !marker.is_error() {
                continue;
            }
            match self.rows.get(&marker) {
                Some(row) => {
                    self.objective.add_row(row, -strength);
                }
                None => self.objective.add_symbol(marker, -strength),
            }
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            rows: self.rows.clone(),
            objective: self.objective.clone(),
            infeasible_rows: self.infeasible_rows.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.rows = snapshot.rows;
        self.objective = snapshot.objective;
        self.infeasible_rows = snapshot.infeasible_rows;
        self.artificial = None;
    }
}

/// Pick the symbol a freshly created row will be solved for.
///
/// External symbols come first so user variables become basic whenever
/// possible. Otherwise a slack or error marker with a negative coefficient
/// keeps the row's constant non-negative once solved. Returns an invalid
/// symbol when neither applies.
fn choose_subject(row: &Row, tag: Tag) -> Symbol {
    if let Some((symbol, _)) = row.cells().find(|(symbol, _)| symbol.is_external()) {
        return symbol;
    }
    for candidate in [tag.marker, tag.other] {
        if candidate.is_pivotable() && row.coefficient_for(candidate) < 0.0 {
            return candidate;
        }
    }
    Symbol::invalid()
}
