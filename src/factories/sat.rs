//! 2-in-4 satisfiability constraints and random problem instances.

use crate::csp::{Constraint, Csp, Vartype};
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use tracing::debug;

const SAT2IN4_NAME: &str = "2-in-4";

/// Positions of the two true literals, one entry per feasible clause pattern.
const PATTERNS: [[bool; 4]; 6] = [
    [false, false, true, true],
    [false, true, false, true],
    [true, false, false, true],
    [false, true, true, false],
    [true, false, true, false],
    [true, true, false, false],
];

/// A 2-in-4 clause: exactly two of the four literals are true.
///
/// Variables are `pos` followed by `neg`; the literals of `neg` are negated.
///
/// # Examples
///
/// ```
/// use u_stitch::csp::Vartype;
/// use u_stitch::factories::sat2in4;
///
/// let clause = sat2in4(["a", "b", "c"], ["d"], Vartype::Binary).unwrap();
/// assert_eq!(clause.variables(), ["a", "b", "c", "d"]);
/// // a and d are true literals (d = 0 is negated)
/// assert!(clause.is_satisfied_by(&[1, 0, 0, 0]));
/// assert!(!clause.is_satisfied_by(&[1, 1, 0, 0]));
/// ```
pub fn sat2in4<P, N, S>(pos: P, neg: N, vartype: Vartype) -> Result<Constraint>
where
    P: IntoIterator<Item = S>,
    N: IntoIterator<Item = S>,
    S: Into<String>,
{
    let pos: Vec<String> = pos.into_iter().map(Into::into).collect();
    let neg: Vec<String> = neg.into_iter().map(Into::into).collect();
    let mut flips = vec![false; pos.len()];
    flips.resize(pos.len() + neg.len(), true);

    let variables: Vec<String> = pos.into_iter().chain(neg).collect();
    clause(variables, &flips, vartype)
}

/// A 2-in-4 clause over `variables`, negating the literals where `flips` is set.
fn clause(variables: Vec<String>, flips: &[bool], vartype: Vartype) -> Result<Constraint> {
    if variables.len() != 4 {
        return Err(Error::VariableCount {
            name: SAT2IN4_NAME.to_string(),
            expected: 4,
            found: variables.len(),
        });
    }

    let high = vartype.high();
    let configurations = PATTERNS.iter().map(|pattern| {
        pattern
            .iter()
            .zip(flips)
            .map(|(&literal, &flip)| {
                if literal != flip {
                    high
                } else {
                    vartype.low()
                }
            })
            .collect()
    });

    Ok(Constraint::from_configurations(configurations, variables, vartype)?.with_name(SAT2IN4_NAME))
}

fn n_choose_4(n: usize) -> u128 {
    let n = n as u128;
    n * n.saturating_sub(1) * n.saturating_sub(2) * n.saturating_sub(3) / 24
}

/// A random 2-in-4 SAT problem over variables `v0 .. v{n-1}`.
///
/// Each clause draws four distinct variables (kept in label order) and a
/// polarity for each. When `satisfiable`, a random solution is planted first
/// and every clause is chosen to be satisfied by it. Clauses are distinct;
/// every variable is in the CSP even if no clause uses it.
///
/// Fails when `num_variables < 4` or more clauses are requested than exist.
/// Complementing all four literals yields the same clause, so there are
/// `8 * C(n, 4)` clauses, of which `3 * C(n, 4)` agree with a planted
/// solution (the six patterns pair up under complement).
///
/// # Examples
///
/// ```
/// use u_stitch::csp::Vartype;
/// use u_stitch::factories::random_2in4sat;
///
/// let csp = random_2in4sat(8, 5, Vartype::Spin, true, 42).unwrap();
/// assert_eq!(csp.len(), 5);
/// assert_eq!(csp.num_variables(), 8);
/// ```
pub fn random_2in4sat(
    num_variables: usize,
    num_clauses: usize,
    vartype: Vartype,
    satisfiable: bool,
    seed: u64,
) -> Result<Csp> {
    if num_variables < 4 {
        return Err(Error::InvalidConfig(format!(
            "a 2-in-4 problem needs at least 4 variables, got {num_variables}"
        )));
    }
    let per_subset = if satisfiable { 3 } else { 8 };
    let available = per_subset * n_choose_4(num_variables);
    if num_clauses as u128 > available {
        let kind = if satisfiable { "satisfiable" } else { "distinct" };
        return Err(Error::InvalidConfig(format!(
            "{num_clauses} clauses requested, only {available} {kind} 2-in-4 clauses exist over {num_variables} variables"
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let labels: Vec<String> = (0..num_variables).map(|i| format!("v{i}")).collect();
    let planted: Option<Vec<bool>> =
        satisfiable.then(|| (0..num_variables).map(|_| rng.random_bool(0.5)).collect());

    let mut seen = HashSet::with_capacity(num_clauses);
    let mut clauses = Vec::with_capacity(num_clauses);
    while clauses.len() < num_clauses {
        let mut picked = rand::seq::index::sample(&mut rng, num_variables, 4).into_vec();
        picked.sort_unstable();

        let flips: Vec<bool> = match &planted {
            Some(solution) => {
                let pattern = PATTERNS[rng.random_range(0..PATTERNS.len())];
                picked
                    .iter()
                    .zip(pattern)
                    .map(|(&v, literal)| literal != solution[v])
                    .collect()
            }
            None => picked.iter().map(|_| rng.random_bool(0.5)).collect(),
        };

        let variables = picked.iter().map(|&v| labels[v].clone()).collect();
        let constraint = clause(variables, &flips, vartype)?;
        if seen.insert(constraint.clone()) {
            clauses.push(constraint);
        }
    }

    let mut csp = Csp::new(vartype);
    for constraint in clauses {
        csp.add_constraint(constraint)?;
    }
    for label in labels {
        csp.add_variable(label);
    }

    debug!(
        num_variables,
        num_clauses, satisfiable, seed, "generated random 2-in-4 problem"
    );
    Ok(csp)
}
