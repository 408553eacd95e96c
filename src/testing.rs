//! Assertion and brute-force helpers for tests of constraints and models.
//!
//! Everything here enumerates exhaustively and is meant for small
//! instances only.

use crate::bqm::EnergyModel;
use crate::csp::Constraint;
use std::collections::HashMap;

/// Asserts the internal consistency of a constraint: every configuration has
/// the right arity and domain, and the membership predicate agrees with the
/// configuration set over the whole domain.
///
/// # Panics
///
/// Panics with a descriptive message on the first inconsistency.
pub fn assert_consistent_constraint(constraint: &Constraint) {
    let n = constraint.len();
    let vartype = constraint.vartype();

    for config in constraint.configurations() {
        assert_eq!(config.len(), n, "configuration {config:?} has wrong arity");
        assert!(
            config.iter().all(|&x| vartype.contains(x)),
            "configuration {config:?} does not match vartype {vartype}"
        );
    }

    for config in vartype.configurations(n) {
        let listed = constraint.configurations().contains(&config);
        assert_eq!(
            constraint.is_satisfied_by(&config),
            listed,
            "predicate disagrees with configurations on {config:?}"
        );

        let assignment: HashMap<String, i8> = constraint
            .variables()
            .iter()
            .cloned()
            .zip(config.iter().copied())
            .collect();
        assert_eq!(
            constraint.check(&assignment).ok(),
            Some(listed),
            "check disagrees with configurations on {config:?}"
        );
    }
}

/// Minimum energy of `model` with the variables in `pinned` held fixed,
/// minimizing over every other model variable.
///
/// Pinned labels that the model does not contain are ignored.
pub fn min_energy(model: &EnergyModel, pinned: &HashMap<String, i8>) -> f64 {
    let free: Vec<String> = model
        .variables()
        .filter(|v| !pinned.contains_key(*v))
        .map(str::to_string)
        .collect();

    let mut assignment = pinned.clone();
    let mut best = f64::INFINITY;
    for values in model.vartype().configurations(free.len()) {
        for (v, x) in free.iter().zip(values) {
            assignment.insert(v.clone(), x);
        }
        if let Ok(energy) = model.energy(&assignment) {
            best = best.min(energy);
        }
    }
    best
}

/// Ground energy of `model` over all of its variables.
pub fn ground_energy(model: &EnergyModel) -> f64 {
    min_energy(model, &HashMap::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csp::Vartype;

    #[test]
    fn test_min_energy_marginalizes_free_variables() {
        let mut m = EnergyModel::empty(Vartype::Spin);
        m.add_interaction("a", "aux", -1.0);
        m.add_variable("aux", 0.5);

        let pinned: HashMap<String, i8> = [("a".to_string(), 1)].into();
        // aux = +1: -1 + 0.5; aux = -1: 1 - 0.5
        assert_eq!(min_energy(&m, &pinned), -0.5);
        assert_eq!(ground_energy(&m), -1.5);
    }

    #[test]
    fn test_consistent_constraints_pass() {
        let free = Constraint::from_predicate(|_| true, ["a", "b", "c"], Vartype::Binary).unwrap();
        assert_consistent_constraint(&free);

        let one = Constraint::from_configurations(vec![vec![-1, 1]], ["a", "b"], Vartype::Spin).unwrap();
        assert_consistent_constraint(&one);
    }
}
