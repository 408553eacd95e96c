//! Decomposition of constraints into independent factors.
//!
//! A constraint `C` over variables `V` is reducible when `V` splits into
//! non-empty disjoint groups `A` and `B` such that a configuration is
//! feasible exactly when its restriction to `A` is feasible for `C|A` and
//! its restriction to `B` is feasible for `C|B`. Equivalently, the number of
//! feasible configurations equals the product of the number of distinct
//! projections onto `A` and onto `B`.

use super::constraint::Constraint;
use std::collections::BTreeSet;

/// Splits a constraint's variables into irreducible groups.
///
/// Each returned group is irreducible; together they partition the
/// constraint's variables. An irreducible constraint yields a single group
/// holding all its variables.
///
/// # Examples
///
/// ```
/// use u_stitch::csp::{irreducible_components, Constraint, Vartype};
///
/// let c = Constraint::from_configurations(
///     vec![vec![0, 0, 1], vec![1, 1, 1]],
///     ["a", "b", "c"],
///     Vartype::Binary,
/// )
/// .unwrap();
///
/// let mut groups = irreducible_components(&c);
/// groups.sort();
/// assert_eq!(groups, vec![vec!["a".to_string(), "b".to_string()], vec!["c".to_string()]]);
/// ```
pub fn irreducible_components(constraint: &Constraint) -> Vec<Vec<String>> {
    let components = components(constraint.configurations(), constraint.variables());
    tracing::debug!(
        constraint = constraint.name(),
        groups = components.len(),
        "decomposed constraint"
    );
    components
}

fn components(configurations: &BTreeSet<Vec<i8>>, variables: &[String]) -> Vec<Vec<String>> {
    let n = variables.len();

    // Only one side of each complementary pair needs checking.
    for size in 1..=n / 2 {
        for subset in Combinations::new(n, size) {
            let complement: Vec<usize> = (0..n).filter(|i| !subset.contains(i)).collect();

            let subset_configs = project(configurations, &subset);
            let complement_configs = project(configurations, &complement);

            if configurations.len() == subset_configs.len() * complement_configs.len() {
                let subset_vars: Vec<String> = subset.iter().map(|&i| variables[i].clone()).collect();
                let complement_vars: Vec<String> =
                    complement.iter().map(|&i| variables[i].clone()).collect();

                let mut groups = components(&subset_configs, &subset_vars);
                groups.extend(components(&complement_configs, &complement_vars));
                return groups;
            }
        }
    }

    vec![variables.to_vec()]
}

fn project(configurations: &BTreeSet<Vec<i8>>, positions: &[usize]) -> BTreeSet<Vec<i8>> {
    configurations
        .iter()
        .map(|config| positions.iter().map(|&p| config[p]).collect())
        .collect()
}

/// Lexicographic `k`-combinations of `0..n`.
struct Combinations {
    n: usize,
    current: Option<Vec<usize>>,
}

impl Combinations {
    fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            current: (k <= n).then(|| (0..k).collect()),
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let out = self.current.take()?;
        let k = out.len();

        let mut next = out.clone();
        let mut i = k;
        while i > 0 {
            i -= 1;
            if next[i] < self.n - k + i {
                next[i] += 1;
                for j in i + 1..k {
                    next[j] = next[j - 1] + 1;
                }
                self.current = Some(next);
                break;
            }
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csp::Vartype;
    use proptest::prelude::*;

    fn sorted(mut groups: Vec<Vec<String>>) -> Vec<Vec<String>> {
        for g in &mut groups {
            g.sort();
        }
        groups.sort();
        groups
    }

    fn names(groups: &[&[&str]]) -> Vec<Vec<String>> {
        sorted(
            groups
                .iter()
                .map(|g| g.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_combinations() {
        let all: Vec<Vec<usize>> = Combinations::new(4, 2).collect();
        assert_eq!(
            all,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
        assert_eq!(Combinations::new(3, 0).count(), 1);
        assert_eq!(Combinations::new(2, 3).count(), 0);
    }

    #[test]
    fn test_irreducible_components() {
        let c = Constraint::from_configurations(
            vec![vec![0, 0, 1], vec![1, 1, 1]],
            ["a", "b", "c"],
            Vartype::Binary,
        )
        .unwrap();
        assert_eq!(sorted(irreducible_components(&c)), names(&[&["a", "b"], &["c"]]));
    }

    #[test]
    fn test_one_fixed() {
        let c = Constraint::from_configurations(vec![vec![0, 1], vec![0, 0]], ["a", "b"], Vartype::Binary)
            .unwrap();
        assert_eq!(sorted(irreducible_components(&c)), names(&[&["a"], &["b"]]));
    }

    #[test]
    fn test_irreducible_stays_whole() {
        let xor = Constraint::from_predicate(|x| (x[0] != x[1]) == (x[2] == 1), ["a", "b", "c"], Vartype::Binary)
            .unwrap();
        assert_eq!(sorted(irreducible_components(&xor)), names(&[&["a", "b", "c"]]));
    }

    #[test]
    fn test_fully_free_splits_into_singletons() {
        let free = Constraint::from_predicate(|_| true, ["a", "b", "c", "d"], Vartype::Spin).unwrap();
        assert_eq!(
            sorted(irreducible_components(&free)),
            names(&[&["a"], &["b"], &["c"], &["d"]])
        );
    }

    #[test]
    fn test_interleaved_factors() {
        // a == c and b != d, declared interleaved
        let c = Constraint::from_predicate(
            |x| x[0] == x[2] && x[1] != x[3],
            ["a", "b", "c", "d"],
            Vartype::Spin,
        )
        .unwrap();
        assert_eq!(sorted(irreducible_components(&c)), names(&[&["a", "c"], &["b", "d"]]));
    }

    #[test]
    fn test_empty_constraint() {
        let c = Constraint::from_configurations(vec![vec![]], Vec::<String>::new(), Vartype::Spin).unwrap();
        assert_eq!(irreducible_components(&c), vec![Vec::<String>::new()]);
    }

    proptest! {
        #[test]
        fn prop_disjoint_product_recovers_groups(
            left in prop::sample::select(IRREDUCIBLE_PAIRS.to_vec()),
            right in prop::sample::select(IRREDUCIBLE_PAIRS.to_vec()),
        ) {
            let a = table(left, ["p", "q"]);
            let b = table(right, ["r", "s"]);
            let product = a.intersection(&b).unwrap();

            prop_assert_eq!(
                sorted(irreducible_components(&product)),
                names(&[&["p", "q"], &["r", "s"]])
            );
        }
    }

    /// Truth tables of the two-variable constraints that do not split:
    /// equality, inequality and the four single exclusions.
    const IRREDUCIBLE_PAIRS: [u16; 6] = [0b1001, 0b0110, 0b0111, 0b1011, 0b1101, 0b1110];

    #[test]
    fn test_irreducible_pairs() {
        for mask in 1u16..15 {
            let c = table(mask, ["x", "y"]);
            let whole = irreducible_components(&c).len() == 1;
            assert_eq!(whole, IRREDUCIBLE_PAIRS.contains(&mask), "mask {mask:04b}");
        }
    }

    fn table(mask: u16, variables: [&str; 2]) -> Constraint {
        let configurations: Vec<Vec<i8>> = Vartype::Binary
            .configurations(2)
            .enumerate()
            .filter(|(i, _)| mask >> i & 1 == 1)
            .map(|(_, c)| c)
            .collect();
        Constraint::from_configurations(configurations, variables, Vartype::Binary).unwrap()
    }
}
