//! Closed-form penalty models for one- and two-variable constraints.
//!
//! Every infeasible configuration `c` contributes `2 * δ_c`, where `δ_c` is
//! the indicator polynomial of `c`:
//!
//! - SPIN: `δ_c(s) = Π (1 + c_i s_i) / 2`
//! - BINARY: `δ_c(x) = Π (c_i ? x_i : 1 - x_i)`
//!
//! For at most two variables the expansion is quadratic, feasible
//! configurations land at 0 and infeasible ones at exactly 2.

use crate::bqm::EnergyModel;
use crate::csp::{irreducible_components, Constraint, Vartype};
use crate::error::Result;

/// Gap realized by every closed-form fragment.
pub(crate) const CLOSED_FORM_GAP: f64 = 2.0;

/// Fragment for a constraint on one or two variables, `None` for larger
/// constraints.
pub(crate) fn closed_form(constraint: &Constraint) -> Result<Option<EnergyModel>> {
    match constraint.len() {
        1 => Ok(Some(indicator_model(constraint))),
        2 => pair(constraint).map(Some),
        _ => Ok(None),
    }
}

/// Zero model over the constraint's variables.
pub(crate) fn zero_model(constraint: &Constraint) -> EnergyModel {
    let mut model = EnergyModel::empty(constraint.vartype());
    for v in constraint.variables() {
        model.add_variable(v.clone(), 0.0);
    }
    model
}

fn pair(constraint: &Constraint) -> Result<EnergyModel> {
    if constraint.is_trivial() {
        return Ok(zero_model(constraint));
    }

    let components = irreducible_components(constraint);
    if components.len() == 1 {
        return Ok(indicator_model(constraint));
    }

    let mut model = EnergyModel::empty(constraint.vartype());
    for component in components {
        let factor = constraint.projection(component)?;
        model.merge(&indicator_model(&factor))?;
    }
    Ok(model)
}

/// `δ_c` factor for position value `c`, as `(constant, coefficient)`.
fn indicator(vartype: Vartype, value: i8) -> (f64, f64) {
    match vartype {
        Vartype::Spin => (0.5, 0.5 * f64::from(value)),
        Vartype::Binary => {
            if value == 1 {
                (0.0, 1.0)
            } else {
                (1.0, -1.0)
            }
        }
    }
}

/// Expands `2 * Σ δ_c` over the infeasible configurations of a constraint
/// with one or two variables. Positions past the second are ignored.
fn indicator_model(constraint: &Constraint) -> EnergyModel {
    let vartype = constraint.vartype();
    let vars = constraint.variables();
    let mut model = zero_model(constraint);

    let infeasible = vartype
        .configurations(vars.len())
        .filter(|c| !constraint.configurations().contains(c));

    for config in infeasible {
        let (a0, b0) = indicator(vartype, config[0]);
        // a missing second variable is the constant factor 1
        let (a1, b1) = config
            .get(1)
            .map_or((1.0, 0.0), |&x| indicator(vartype, x));

        model.add_offset(CLOSED_FORM_GAP * a0 * a1);
        model.add_variable(vars[0].clone(), CLOSED_FORM_GAP * b0 * a1);
        if let Some(v) = vars.get(1) {
            model.add_variable(v.clone(), CLOSED_FORM_GAP * a0 * b1);
            model.add_interaction(vars[0].clone(), v.clone(), CLOSED_FORM_GAP * b0 * b1);
        }
    }

    model
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ground_energy, min_energy};
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn constraint_from_mask(mask: u8, n: usize, vartype: Vartype) -> Constraint {
        let configs: Vec<Vec<i8>> = vartype
            .configurations(n)
            .enumerate()
            .filter(|(i, _)| mask >> i & 1 == 1)
            .map(|(_, c)| c)
            .collect();
        let vars = ["u", "v"];
        Constraint::from_configurations(configs, vars[..n].iter().copied(), vartype).unwrap()
    }

    /// Feasible configurations at 0, infeasible ones at least `gap` higher,
    /// and some infeasible configuration at exactly `gap` when there is one.
    fn assert_gap(model: &EnergyModel, constraint: &Constraint, exact: bool) {
        let mut smallest = f64::INFINITY;
        for config in constraint.vartype().configurations(constraint.len()) {
            let pinned: HashMap<String, i8> = constraint
                .variables()
                .iter()
                .cloned()
                .zip(config.iter().copied())
                .collect();
            let energy = min_energy(model, &pinned);
            if constraint.is_satisfied_by(&config) {
                assert_eq!(energy, 0.0, "feasible {config:?}");
            } else {
                assert!(energy >= CLOSED_FORM_GAP, "infeasible {config:?} at {energy}");
                smallest = smallest.min(energy);
            }
        }
        if exact && !constraint.is_trivial() {
            assert_eq!(smallest, CLOSED_FORM_GAP);
        }
    }

    #[test]
    fn test_single_variable_spin() {
        let c = constraint_from_mask(0b10, 1, Vartype::Spin);
        let model = closed_form(&c).unwrap().unwrap();
        assert_eq!(model.get_linear("u"), Some(-1.0));
        assert_eq!(model.offset(), 1.0);
        assert_gap(&model, &c, true);
    }

    #[test]
    fn test_single_variable_binary() {
        let c = constraint_from_mask(0b01, 1, Vartype::Binary);
        let model = closed_form(&c).unwrap().unwrap();
        // feasible x = 0
        assert_eq!(model.get_linear("u"), Some(2.0));
        assert_eq!(model.offset(), 0.0);
        assert_gap(&model, &c, true);
    }

    #[test]
    fn test_equality_and_inequality() {
        // SPIN configurations in order: (-1,-1), (-1,1), (1,-1), (1,1)
        let eq = constraint_from_mask(0b1001, 2, Vartype::Spin);
        let model = closed_form(&eq).unwrap().unwrap();
        assert_eq!(model.get_quadratic("u", "v"), Some(-1.0));
        assert_eq!(model.get_linear("u"), Some(0.0));
        assert_eq!(model.offset(), 1.0);

        let ne = constraint_from_mask(0b0110, 2, Vartype::Spin);
        let model = closed_form(&ne).unwrap().unwrap();
        assert_eq!(model.get_quadratic("u", "v"), Some(1.0));
    }

    #[test]
    fn test_trivial_pair_is_zero() {
        let c = constraint_from_mask(0b1111, 2, Vartype::Binary);
        let model = closed_form(&c).unwrap().unwrap();
        assert_eq!(model.num_variables(), 2);
        assert_eq!(model.num_interactions(), 0);
        assert_eq!(model.offset(), 0.0);
    }

    #[test]
    fn test_decomposable_pair_has_no_interaction() {
        // u = 1 and v free
        let c = constraint_from_mask(0b1100, 2, Vartype::Spin);
        let model = closed_form(&c).unwrap().unwrap();
        assert_eq!(model.num_interactions(), 0);
        assert_eq!(model.get_linear("v"), Some(0.0));
        assert_gap(&model, &c, true);
    }

    #[test]
    fn test_larger_constraints_not_covered() {
        let c = Constraint::from_predicate(|x| x[0] == x[2], ["a", "b", "c"], Vartype::Spin).unwrap();
        assert!(closed_form(&c).unwrap().is_none());
    }

    proptest! {
        #[test]
        fn prop_two_variable_tables(mask in 1u8..16, binary in any::<bool>()) {
            let vartype = if binary { Vartype::Binary } else { Vartype::Spin };
            let c = constraint_from_mask(mask, 2, vartype);
            let model = closed_form(&c).unwrap().unwrap();

            prop_assert_eq!(model.vartype(), vartype);
            prop_assert_eq!(ground_energy(&model), 0.0);
            prop_assert!(model.num_variables() == 2);
            assert_gap(&model, &c, true);
        }

        #[test]
        fn prop_one_variable_tables(mask in 1u8..4, binary in any::<bool>()) {
            let vartype = if binary { Vartype::Binary } else { Vartype::Spin };
            let c = constraint_from_mask(mask, 1, vartype);
            let model = closed_form(&c).unwrap().unwrap();
            prop_assert_eq!(ground_energy(&model), 0.0);
            assert_gap(&model, &c, true);
        }
    }
}
