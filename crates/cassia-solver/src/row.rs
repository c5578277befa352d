use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use crate::symbol::Symbol;

/// Coefficients smaller than this are treated as zero.
pub(crate) const EPSILON: f64 = 1e-8;

pub(crate) fn near_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

/// A row of the simplex tableau: `constant + Σ coefficient * symbol`.
///
/// Cells never hold a near-zero coefficient. Cells are kept ordered by symbol
/// id so every scan over a row visits symbols in the same order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Row {
    cells: BTreeMap<Symbol, f64>,
    constant: f64,
}

impl Row {
    pub(crate) fn new(constant: f64) -> Self {
        Self {
            cells: BTreeMap::new(),
            constant,
        }
    }

    pub(crate) fn constant(&self) -> f64 {
        self.constant
    }

    pub(crate) fn cells(&self) -> impl Iterator<Item = (Symbol, f64)> + '_ {
        self.cells.iter().map(|(&s, &c)| (s, c))
    }

    /// Add `value` to the constant and return the new constant.
    pub(crate) fn add_constant(&mut self, value: f64) -> f64 {
        self.constant += value;
        self.constant
    }

    /// Add `coefficient * symbol` to the row.
    pub(crate) fn add_symbol(&mut self, symbol: Symbol, coefficient: f64) {
        if coefficient == 0.0 {
            return;
        }
        match self.cells.entry(symbol) {
            Entry::Vacant(entry) => {
                if !near_zero(coefficient) {
                    entry.insert(coefficient);
                }
            }
            Entry::Occupied(mut entry) => {
                let value = entry.get_mut();
                *value += coefficient;
                if near_zero(*value) {
                    entry.remove();
                }
            }
        }
    }

    /// Add `coefficient * other` to the row.
    ///
    /// Returns whether the constant changed.
    pub(crate) fn add_row(&mut self, other: &Row, coefficient: f64) -> bool {
        let diff = other.constant * coefficient;
        self.constant += diff;
        for (&symbol, &value) in &other.cells {
            self.add_symbol(symbol, value * coefficient);
        }
        diff != 0.0
    }

    pub(crate) fn remove(&mut self, symbol: Symbol) {
        self.cells.remove(&symbol);
    }

    pub(crate) fn coefficient_for(&self, symbol: Symbol) -> f64 {
        self.cells.get(&symbol).copied().unwrap_or(0.0)
    }

    pub(crate) fn reverse_sign(&mut self) {
        self.constant = -self.constant;
        for value in self.cells.values_mut() {
            *value = -*value;
        }
    }

    /// Rewrite the row so that it expresses `symbol`.
    ///
    /// The row is assumed to read `0 = constant + ... + c * symbol`; afterwards
    /// it holds `symbol = (constant + ...) / -c` with `symbol` no longer a cell.
    /// A symbol absent from the row leaves it unchanged.
    pub(crate) fn solve_for_symbol(&mut self, symbol: Symbol) {
        let Some(coefficient) = self.cells.remove(&symbol) else {
            return;
        };
        let multiplier = -1.0 / coefficient;
        self.constant *= multiplier;
        for value in self.cells.values_mut() {
            *value *= multiplier;
        }
    }

    /// Pivot a row currently keyed by `lhs` so that it is keyed by `rhs`.
    pub(crate) fn solve_for_symbol_pair(&mut self, lhs: Symbol, rhs: Symbol) {
        self.add_symbol(lhs, -1.0);
        self.solve_for_symbol(rhs);
    }

    /// Replace `symbol` by the expression held in `row`.
    ///
    /// Returns whether the constant changed.
    pub(crate) fn substitute(&mut self, symbol: Symbol, row: &Row) -> bool {
        match self.cells.remove(&symbol) {
            Some(coefficient) => self.add_row(row, coefficient),
            None => false,
        }
    }

    pub(crate) fn is_constant(&self) -> bool {
        self.cells.is_empty()
    }

    pub(crate) fn is_all_dummy_cells(&self) -> bool {
        self.cells.keys().all(Symbol::is_dummy)
    }

    /// The first slack or error cell, or an invalid symbol if there is none.
    pub(crate) fn any_pivotable_symbol(&self) -> Symbol {
        self.cells
            .keys()
            .copied()
            .find(Symbol::is_pivotable)
            .unwrap_or_else(Symbol::invalid)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.constant)?;
        for (symbol, value) in &self.cells {
            write!(f, " + {} * {}", value, symbol)?;
        }
        Ok(())
    }
}
