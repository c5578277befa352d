//! Property-based tests for the solver.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use proptest::sample::Index;

    use crate::solver::tests::{assert_published_matches_tableau, assert_tableau_invariants};
    use crate::{AddConstraintError, Constraint, Expression, Solver, Strength, Variable};

    const VARIABLES: usize = 4;
    const UPPER_BOUND: f64 = 1000.0;

    #[derive(Debug, Clone)]
    struct ConstraintSpec {
        lhs: usize,
        rhs: usize,
        coefficient: f64,
        constant: f64,
        operator: u8,
        strength: usize,
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(ConstraintSpec),
        Remove(Index),
        Suggest(f64),
    }

    // Strategy for generating small integral coefficients
    fn coefficient() -> impl Strategy<Value = f64> {
        (-2i32..=2i32).prop_map(f64::from)
    }

    // Strategy for generating `lhs op coefficient * rhs + constant`
    fn constraint_spec(strengths: usize) -> impl Strategy<Value = ConstraintSpec> {
        (
            0..VARIABLES,
            0..VARIABLES,
            coefficient(),
            (-500i32..500i32).prop_map(f64::from),
            0u8..3u8,
            0..strengths,
        )
            .prop_map(
                |(lhs, rhs, coefficient, constant, operator, strength)| ConstraintSpec {
                    lhs,
                    rhs,
                    coefficient,
                    constant,
                    operator,
                    strength,
                },
            )
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => constraint_spec(4).prop_map(Op::Add),
            2 => any::<Index>().prop_map(Op::Remove),
            2 => (-200i32..1200i32).prop_map(|v| Op::Suggest(f64::from(v))),
        ]
    }

    fn build(variables: &[Variable], spec: &ConstraintSpec) -> Constraint {
        let strength = [
            Strength::WEAK,
            Strength::MEDIUM,
            Strength::STRONG,
            Strength::REQUIRED,
        ][spec.strength];
        let lhs = Expression::from(variables[spec.lhs]);
        let rhs = variables[spec.rhs] * spec.coefficient + spec.constant;
        match spec.operator {
            0 => lhs.less_or_equal(rhs, strength),
            1 => lhs.equal_to(rhs, strength),
            _ => lhs.greater_or_equal(rhs, strength),
        }
    }

    /// Every variable boxed into `[0, UPPER_BOUND]` and weakly pulled to a target.
    fn bounded_system(targets: &[f64]) -> (Solver, Vec<Variable>) {
        let mut solver = Solver::new();
        let variables: Vec<Variable> = targets.iter().map(|_| Variable::new()).collect();
        for (&variable, &target) in variables.iter().zip(targets) {
            solver
                .add_constraints([
                    variable.greater_or_equal(0.0, Strength::REQUIRED),
                    variable.less_or_equal(UPPER_BOUND, Strength::REQUIRED),
                    variable.equal_to(target, Strength::WEAK),
                ])
                .unwrap();
        }
        (solver, variables)
    }

    fn target_values() -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec((0i32..=1000i32).prop_map(f64::from), VARIABLES)
    }

    proptest! {
        #[test]
        fn operations_keep_tableau_invariants(
            targets in target_values(),
            ops in prop::collection::vec(op(), 1..40),
        ) {
            let (mut solver, variables) = bounded_system(&targets);
            solver.add_edit_variable(variables[0], Strength::STRONG).unwrap();
            let mut added: Vec<Constraint> = Vec::new();

            for op in &ops {
                match op {
                    Op::Add(spec) => {
                        let constraint = build(&variables, spec);
                        match solver.add_constraint(constraint.clone()) {
                            Ok(()) => added.push(constraint),
                            Err(AddConstraintError::UnsatisfiableConstraint) => {
                                prop_assert!(!solver.has_constraint(&constraint));
                            }
                            Err(err) => prop_assert!(false, "unexpected error: {}", err),
                        }
                    }
                    Op::Remove(index) => {
                        if !added.is_empty() {
                            let constraint = added.remove(index.index(added.len()));
                            prop_assert!(solver.remove_constraint(&constraint).is_ok());
                        }
                    }
                    Op::Suggest(value) => {
                        prop_assert!(solver.suggest_value(variables[0], *value).is_ok());
                    }
                }
                assert_tableau_invariants(&solver);
            }

            solver.fetch_changes();
            assert_published_matches_tableau(&solver);
            prop_assert!(solver.fetch_changes().is_empty());

            for &variable in &variables {
                let value = solver.get_value(variable);
                prop_assert!((-1e-6..=UPPER_BOUND + 1e-6).contains(&value));
            }
        }

        #[test]
        fn add_then_remove_restores_values(
            targets in target_values(),
            spec in constraint_spec(4),
        ) {
            let (mut solver, variables) = bounded_system(&targets);
            solver.fetch_changes();
            for (&variable, &target) in variables.iter().zip(&targets) {
                prop_assert!((solver.get_value(variable) - target).abs() < 1e-6);
            }

            let constraint = build(&variables, &spec);
            match solver.add_constraint(constraint.clone()) {
                Ok(()) => {
                    solver.fetch_changes();
                    solver.remove_constraint(&constraint).unwrap();
                }
                Err(AddConstraintError::UnsatisfiableConstraint) => {}
                Err(err) => prop_assert!(false, "unexpected error: {}", err),
            }
            solver.fetch_changes();
            assert_tableau_invariants(&solver);

            for (&variable, &target) in variables.iter().zip(&targets) {
                let value = solver.get_value(variable);
                prop_assert!(
                    (value - target).abs() < 1e-6,
                    "expected {}, got {}", target, value
                );
            }
        }

        #[test]
        fn required_equality_is_met_exactly(
            targets in target_values(),
            offset in (-100i32..100i32).prop_map(f64::from),
        ) {
            let (mut solver, variables) = bounded_system(&targets);
            let (a, b) = (variables[0], variables[1]);
            let result = solver.add_constraint(a.equal_to(b + offset, Strength::REQUIRED));
            prop_assert!(result.is_ok());
            solver.fetch_changes();
            prop_assert!((solver.get_value(a) - solver.get_value(b) - offset).abs() < 1e-6);
        }

        #[test]
        fn suggestions_follow_the_edit_variable(
            values in prop::collection::vec((0i32..=1000i32).prop_map(f64::from), 1..10),
        ) {
            let (mut solver, variables) = bounded_system(&[0.0; VARIABLES]);
            let x = variables[0];
            solver.add_edit_variable(x, Strength::STRONG).unwrap();
            for &value in &values {
                solver.suggest_value(x, value).unwrap();
                assert_tableau_invariants(&solver);
            }
            solver.fetch_changes();
            let last = values[values.len() - 1];
            prop_assert!((solver.get_value(x) - last).abs() < 1e-6);
        }
    }
}
