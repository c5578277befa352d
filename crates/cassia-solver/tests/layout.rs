//! Integration tests driving the solver through small layout problems.

use cassia_solver::{
    AddConstraintError, Constraint, Expression, RelationalOperator, Solver, Strength, Term,
    Variable,
};

const TOLERANCE: f64 = 1e-6;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "expected {}, got {}",
        expected,
        actual
    );
}

/// A row of equally sized columns filling a container.
struct Columns {
    container: Variable,
    lefts: Vec<Variable>,
    widths: Vec<Variable>,
}

impl Columns {
    fn new(solver: &mut Solver, count: usize, gap: f64, min_width: f64) -> Self {
        let container = Variable::new();
        let lefts: Vec<Variable> = (0..count).map(|_| Variable::new()).collect();
        let widths: Vec<Variable> = (0..count).map(|_| Variable::new()).collect();

        solver
            .add_constraint(lefts[0].equal_to(0.0, Strength::REQUIRED))
            .unwrap();
        for i in 0..count {
            solver
                .add_constraint(widths[i].greater_or_equal(min_width, Strength::REQUIRED))
                .unwrap();
            if i + 1 < count {
                solver
                    .add_constraint(
                        lefts[i + 1].equal_to(lefts[i] + widths[i] + gap, Strength::REQUIRED),
                    )
                    .unwrap();
                solver
                    .add_constraint(widths[i + 1].equal_to(widths[i], Strength::MEDIUM))
                    .unwrap();
            }
        }
        let last = count - 1;
        solver
            .add_constraint(container.equal_to(lefts[last] + widths[last], Strength::REQUIRED))
            .unwrap();
        solver
            .add_edit_variable(container, Strength::STRONG)
            .unwrap();

        Self {
            container,
            lefts,
            widths,
        }
    }
}

#[test]
fn test_columns_share_container_width() {
    let mut solver = Solver::new();
    let columns = Columns::new(&mut solver, 3, 10.0, 20.0);

    solver.suggest_value(columns.container, 320.0).unwrap();
    solver.fetch_changes();

    assert_close(solver.get_value(columns.container), 320.0);
    for (i, (&left, &width)) in columns.lefts.iter().zip(&columns.widths).enumerate() {
        assert_close(solver.get_value(width), 100.0);
        assert_close(solver.get_value(left), 110.0 * i as f64);
    }
}

#[test]
fn test_minimum_width_beats_container_suggestion() {
    let mut solver = Solver::new();
    let columns = Columns::new(&mut solver, 3, 10.0, 20.0);

    solver.suggest_value(columns.container, 50.0).unwrap();
    solver.fetch_changes();

    assert_close(solver.get_value(columns.container), 80.0);
    for &width in &columns.widths {
        assert_close(solver.get_value(width), 20.0);
    }
}

#[test]
fn test_resizing_reports_only_moved_variables() {
    let mut solver = Solver::new();
    let columns = Columns::new(&mut solver, 2, 0.0, 0.0);

    solver.suggest_value(columns.container, 200.0).unwrap();
    solver.fetch_changes();

    solver.suggest_value(columns.container, 300.0).unwrap();
    let changes = solver.fetch_changes();
    let changed: Vec<Variable> = changes.iter().map(|&(v, _)| v).collect();

    assert!(changed.contains(&columns.container));
    assert!(changed.contains(&columns.widths[0]));
    assert!(changed.contains(&columns.widths[1]));
    assert!(changed.contains(&columns.lefts[1]));
    assert!(!changed.contains(&columns.lefts[0]));
    for (variable, value) in changes {
        assert_eq!(solver.get_value(variable), value);
    }
}

#[test]
fn test_values_are_published_by_fetch() {
    let mut solver = Solver::new();
    let x = Variable::new();
    solver.add_edit_variable(x, Strength::STRONG).unwrap();
    solver.suggest_value(x, 7.0).unwrap();

    assert_eq!(solver.get_value(x), 0.0);
    solver.fetch_changes();
    assert_eq!(solver.get_value(x), 7.0);

    solver.suggest_value(x, 9.0).unwrap();
    assert_eq!(solver.get_value(x), 7.0);
}

#[test]
fn test_constraints_are_compared_by_identity() {
    let mut solver = Solver::new();
    let x = Variable::new();
    let first = x.greater_or_equal(10.0, Strength::REQUIRED);
    let second = x.greater_or_equal(10.0, Strength::REQUIRED);
    assert_ne!(first, second);
    assert_eq!(first, first.clone());

    solver.add_constraint(first.clone()).unwrap();
    solver.add_constraint(second.clone()).unwrap();
    solver.remove_constraint(&first).unwrap();

    assert!(!solver.has_constraint(&first));
    assert!(solver.has_constraint(&second));
}

#[test]
fn test_add_constraints_stops_at_first_failure() {
    let mut solver = Solver::new();
    let x = Variable::new();
    let pin = x.equal_to(1.0, Strength::REQUIRED);
    let conflict = x.equal_to(2.0, Strength::REQUIRED);
    let never_added = x.less_or_equal(5.0, Strength::WEAK);

    let result = solver.add_constraints([pin.clone(), conflict.clone(), never_added.clone()]);
    assert_eq!(result, Err(AddConstraintError::UnsatisfiableConstraint));
    assert!(solver.has_constraint(&pin));
    assert!(!solver.has_constraint(&conflict));
    assert!(!solver.has_constraint(&never_added));
    assert_eq!(solver.constraints().collect::<Vec<_>>(), vec![&pin]);
}

#[test]
fn test_explicit_expression_construction() {
    let mut solver = Solver::new();
    let x = Variable::new();
    let y = Variable::new();

    // 2x + 3y - 12 == 0, y == 2
    let expression = Expression::new(vec![Term::new(x, 2.0), Term::new(y, 3.0)], -12.0);
    solver
        .add_constraint(Constraint::new(
            expression,
            RelationalOperator::Equal,
            Strength::REQUIRED,
        ))
        .unwrap();
    solver
        .add_constraint(y.equal_to(2.0, Strength::REQUIRED))
        .unwrap();
    solver.fetch_changes();

    assert_close(solver.get_value(x), 3.0);
    assert_close(solver.get_value(y), 2.0);
}

#[test]
fn test_duplicate_terms_are_merged() {
    let x = Variable::new();
    let constraint = (x + x + 2.0 * x).equal_to(8.0, Strength::REQUIRED);
    let terms = &constraint.expression().terms;
    assert_eq!(terms.len(), 1);
    assert_eq!(terms[0].coefficient, 4.0);
    assert_eq!(constraint.expression().constant, -8.0);

    let mut solver = Solver::new();
    solver.add_constraint(constraint).unwrap();
    solver.fetch_changes();
    assert_close(solver.get_value(x), 2.0);
}

#[test]
fn test_composed_strengths() {
    assert_eq!(Strength::new(1.0, 0.0, 0.0), Strength::STRONG);
    assert_eq!(Strength::new(0.0, 1.0, 0.0), Strength::MEDIUM);
    assert_eq!(Strength::with_weight(0.0, 0.0, 1.0, 2.0).value(), 2.0);

    let mut solver = Solver::new();
    let x = Variable::new();
    solver
        .add_constraint(x.equal_to(10.0, Strength::new(0.0, 2.0, 0.0)))
        .unwrap();
    solver
        .add_constraint(x.equal_to(20.0, Strength::new(0.0, 1.0, 500.0)))
        .unwrap();
    solver.fetch_changes();
    assert_close(solver.get_value(x), 10.0);
}

#[test]
fn test_remove_edit_variable_then_resuggest_fails() {
    let mut solver = Solver::new();
    let columns = Columns::new(&mut solver, 2, 5.0, 10.0);
    solver.remove_edit_variable(columns.container).unwrap();

    assert!(solver.suggest_value(columns.container, 100.0).is_err());
    assert_eq!(solver.edit_variables().count(), 0);
}
