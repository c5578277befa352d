use std::fmt;

use super::Solver;
use crate::constraint::Constraint;
use crate::variable::Variable;

impl Solver {
    /// A human-readable listing of the solver's internal state.
    pub fn dump(&self) -> String {
        Dump(self).to_string()
    }

    fn display_name(&self, variable: Variable) -> String {
        match self.variable_name(variable) {
            Some(name) => name.to_string(),
            None => format!("var{}", variable.id()),
        }
    }

    fn write_constraint(&self, f: &mut fmt::Formatter<'_>, constraint: &Constraint) -> fmt::Result {
        let expression = constraint.expression();
        for term in &expression.terms {
            write!(f, "{} * {} + ", term.coefficient, self.display_name(term.variable))?;
        }
        write!(
            f,
            "{} {} 0 | strength = {}",
            expression.constant,
            constraint.operator(),
            constraint.strength().value()
        )
    }
}

struct Dump<'a>(&'a Solver);

fn header(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "{}", title)?;
    writeln!(f, "{}", "-".repeat(title.len()))
}

impl fmt::Display for Dump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let solver = self.0;

        header(f, "Objective")?;
        writeln!(f, "{}", solver.objective)?;
        writeln!(f)?;

        header(f, "Tableau")?;
        for (symbol, row) in &solver.rows {
            writeln!(f, "{} | {}", symbol, row)?;
        }
        writeln!(f)?;

        header(f, "Infeasible")?;
        for symbol in &solver.infeasible_rows {
            writeln!(f, "{}", symbol)?;
        }
        writeln!(f)?;

        header(f, "Variables")?;
        let mut variables: Vec<_> = solver.variables.iter().collect();
        variables.sort_by_key(|(_, record)| record.symbol);
        for (&variable, record) in variables {
            writeln!(
                f,
                "{} = {} (refs {})",
                solver.display_name(variable),
                record.symbol,
                record.references
            )?;
        }
        writeln!(f)?;

        header(f, "Edit Variables")?;
        for (&variable, info) in &solver.edits {
            writeln!(
                f,
                "{} = {} (marker {})",
                solver.display_name(variable),
                info.constant,
                info.tag.marker
            )?;
        }
        writeln!(f)?;

        header(f, "Constraints")?;
        for constraint in solver.constraints.keys() {
            solver.write_constraint(f, constraint)?;
            writeln!(f)?;
        }
        Ok(())
    }
}
