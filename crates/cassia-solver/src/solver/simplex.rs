//! Primal and dual simplex passes over the solver's tableau.

use tracing::{error, trace};

use super::{ObjectiveKind, Solver};
use crate::error::InternalSolverError;
use crate::row::{Row, near_zero};
use crate::symbol::{Symbol, SymbolKind};

impl Solver {
    /// Minimize the chosen objective with the primal simplex method.
    ///
    /// Assumes every restricted row is feasible. Fails if the objective is
    /// unbounded or the pivot budget runs out.
    pub(super) fn optimize(&mut self, kind: ObjectiveKind) -> Result<(), InternalSolverError> {
        let mut pivots = 0;
        loop {
            let objective = match kind {
                ObjectiveKind::Primary => &self.objective,
                ObjectiveKind::Artificial => match &self.artificial {
                    Some(artificial) => artificial,
                    None => return Ok(()),
                },
            };
            let entering = entering_symbol(objective);
            if entering.is_invalid() {
                return Ok(());
            }
            if pivots == self.max_iterations {
                error!(limit = self.max_iterations, ?kind, "primal optimization did not converge");
                return Err(InternalSolverError::IterationLimitExceeded(self.max_iterations));
            }
            let Some((leaving, row)) = self.take_leaving_row(entering) else {
                error!(%entering, ?kind, "objective is unbounded");
                return Err(InternalSolverError::ObjectiveUnbounded);
            };
            self.pivot(leaving, row, entering);
            pivots += 1;
        }
    }

    /// Restore feasibility of the rows queued as infeasible while keeping the
    /// objective optimal.
    ///
    /// Rows are taken from the back of the queue; entries that are no longer
    /// basic or no longer negative are skipped.
    pub(super) fn dual_optimize(&mut self) -> Result<(), InternalSolverError> {
        let mut pivots = 0;
        while let Some(leaving) = self.infeasible_rows.pop() {
            let entering = match self.rows.get(&leaving) {
                Some(row) if row.constant() < 0.0 && !near_zero(row.constant()) => {
                    self.dual_entering_symbol(row)
                }
                _ => continue,
            };
            if entering.is_invalid() {
                error!(%leaving, "dual optimization found no entering symbol");
                return Err(InternalSolverError::DualOptimizeFailed);
            }
            if pivots == self.max_iterations {
                error!(limit = self.max_iterations, "dual optimization did not converge");
                return Err(InternalSolverError::IterationLimitExceeded(self.max_iterations));
            }
            if let Some(row) = self.rows.remove(&leaving) {
                self.pivot(leaving, row, entering);
                pivots += 1;
            }
        }
        Ok(())
    }

    /// Make `entering` basic in `row`, which was keyed by `leaving` and has
    /// already been taken out of the tableau.
    fn pivot(&mut self, leaving: Symbol, mut row: Row, entering: Symbol) {
        trace!(%leaving, %entering, "pivot");
        row.solve_for_symbol_pair(leaving, entering);
        self.substitute(entering, &row);
        self.mark_if_external(leaving);
        self.mark_if_external(entering);
        self.rows.insert(entering, row);
    }

    /// Replace `symbol` by `row` in every tableau row and objective.
    pub(super) fn substitute(&mut self, symbol: Symbol, row: &Row) {
        for (&basic, other) in self.rows.iter_mut() {
            let constant_changed = other.substitute(symbol, row);
            if basic.is_external() {
                if constant_changed {
                    if let Some(&variable) = self.variable_for_symbol.get(&basic) {
                        self.changes.mark(variable);
                    }
                }
            } else if other.constant() < 0.0 {
                self.infeasible_rows.push(basic);
            }
        }
        self.objective.substitute(symbol, row);
        if let Some(artificial) = self.artificial.as_mut() {
            artificial.substitute(symbol, row);
        }
    }

    /// Ratio test: among restricted rows with a negative coefficient for
    /// `entering`, take the one that limits it most. Ties go to the lowest
    /// symbol id.
    fn take_leaving_row(&mut self, entering: Symbol) -> Option<(Symbol, Row)> {
        let mut ratio = f64::INFINITY;
        let mut found = None;
        for (&symbol, row) in &self.rows {
            if symbol.is_external() {
                continue;
            }
            let coefficient = row.coefficient_for(entering);
            if coefficient < 0.0 {
                let candidate = -row.constant() / coefficient;
                if candidate < ratio {
                    ratio = candidate;
                    found = Some(symbol);
                }
            }
        }
        let symbol = found?;
        self.rows.remove(&symbol).map(|row| (symbol, row))
    }

    /// The row to pivot a non-basic constraint marker into before dropping it.
    ///
    /// Restricted rows with a negative coefficient are preferred, then
    /// restricted rows with a positive one, then any external row.
    pub(super) fn take_marker_leaving_row(&mut self, marker: Symbol) -> Option<(Symbol, Row)> {
        let mut negative = (f64::INFINITY, None);
        let mut positive = (f64::INFINITY, None);
        let mut external = None;

        for (&symbol, row) in &self.rows {
            let coefficient = row.coefficient_for(marker);
            if coefficient == 0.0 {
                continue;
            }
            if symbol.is_external() {
                external = Some(symbol);
            } else if coefficient < 0.0 {
                let ratio = -row.constant() / coefficient;
                if ratio < negative.0 {
                    negative = (ratio, Some(symbol));
                }
            } else {
                let ratio = row.constant() / coefficient;
                if ratio < positive.0 {
                    positive = (ratio, Some(symbol));
                }
            }
        }

        let symbol = negative.1.or(positive.1).or(external)?;
        self.rows.remove(&symbol).map(|row| (symbol, row))
    }

    /// Insert a row that has no usable subject through a phase-one pass.
    ///
    /// A temporary slack symbol is made basic for the row and a copy of the
    /// row is minimized. Returns whether that copy reached zero, i.e. whether
    /// the row is satisfiable. The temporary symbol never outlives the call.
    pub(super) fn add_with_artificial_variable(
        &mut self,
        row: &Row,
    ) -> Result<bool, InternalSolverError> {
        let art = self.new_symbol(SymbolKind::Slack);
        self.rows.insert(art, row.clone());
        self.artificial = Some(row.clone());

        let optimized = self.optimize(ObjectiveKind::Artificial);
        let success = self
            .artificial
            .take()
            .is_some_and(|artificial| near_zero(artificial.constant()));
        optimized?;

        if let Some(mut art_row) = self.rows.remove(&art) {
            if art_row.is_constant() {
                return Ok(success);
            }
            let entering = art_row.any_pivotable_symbol();
            if entering.is_invalid() {
                return Ok(false);
            }
            art_row.solve_for_symbol_pair(art, entering);
            self.substitute(entering, &art_row);
            self.rows.insert(entering, art_row);
        }

        for other in self.rows.values_mut() {
            other.remove(art);
        }
        self.objective.remove(art);
        trace!(%art, success, "artificial insertion finished");
        Ok(success)
    }

    /// The dual ratio test for an infeasible `row`.
    fn dual_entering_symbol(&self, row: &Row) -> Symbol {
        let mut ratio = f64::INFINITY;
        let mut entering = Symbol::invalid();
        for (symbol, coefficient) in row.cells() {
            if coefficient > 0.0 && !symbol.is_dummy() {
                let candidate = self.objective.coefficient_for(symbol) / coefficient;
                if candidate < ratio {
                    ratio = candidate;
                    entering = symbol;
                }
            }
        }
        entering
    }
}

/// First objective cell, in symbol order, whose coefficient is negative and
/// which is not a dummy.
fn entering_symbol(objective: &Row) -> Symbol {
    objective
        .cells()
        .find(|(symbol, coefficient)| *coefficient < 0.0 && !symbol.is_dummy())
        .map_or_else(Symbol::invalid, |(symbol, _)| symbol)
}
