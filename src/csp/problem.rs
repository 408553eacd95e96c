//! Constraint satisfaction problem container.

use super::constraint::Constraint;
use super::vartype::Vartype;
use crate::error::{Error, Result};
use std::collections::{BTreeMap, HashMap};

/// The ways a constraint can be handed to a CSP.
///
/// Every source is resolved once, at insertion, into the canonical
/// `(variables, configurations)` form of a [`Constraint`].
pub enum ConstraintSource<'a> {
    /// A membership predicate over positional values; configurations are
    /// found by enumerating the whole domain.
    Predicate {
        predicate: Box<dyn Fn(&[i8]) -> bool + 'a>,
        variables: Vec<String>,
    },

    /// An explicit set of feasible configurations.
    Configurations {
        configurations: Vec<Vec<i8>>,
        variables: Vec<String>,
    },

    /// A constraint built elsewhere (e.g. by a factory).
    Prebuilt(Constraint),
}

impl<'a> ConstraintSource<'a> {
    /// Convenience constructor for [`ConstraintSource::Predicate`].
    pub fn predicate<F, V, S>(predicate: F, variables: V) -> Self
    where
        F: Fn(&[i8]) -> bool + 'a,
        V: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ConstraintSource::Predicate {
            predicate: Box::new(predicate),
            variables: variables.into_iter().map(Into::into).collect(),
        }
    }

    /// Convenience constructor for [`ConstraintSource::Configurations`].
    pub fn configurations<V, S>(configurations: Vec<Vec<i8>>, variables: V) -> Self
    where
        V: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ConstraintSource::Configurations {
            configurations,
            variables: variables.into_iter().map(Into::into).collect(),
        }
    }

    /// Resolves the source into a constraint of the given vartype.
    pub fn resolve(self, vartype: Vartype) -> Result<Constraint> {
        match self {
            ConstraintSource::Predicate {
                predicate,
                variables,
            } => Constraint::from_predicate(predicate, variables, vartype),
            ConstraintSource::Configurations {
                configurations,
                variables,
            } => Constraint::from_configurations(configurations, variables, vartype),
            ConstraintSource::Prebuilt(constraint) => {
                if !constraint.is_empty() && constraint.vartype() != vartype {
                    return Err(Error::VartypeMismatch {
                        expected: vartype,
                        found: constraint.vartype(),
                    });
                }
                Ok(constraint)
            }
        }
    }
}

impl From<Constraint> for ConstraintSource<'_> {
    fn from(constraint: Constraint) -> Self {
        ConstraintSource::Prebuilt(constraint)
    }
}

/// A constraint satisfaction problem over binary-valued variables.
///
/// Constraints live in an arena addressed by insertion index; the variable
/// index maps each variable to the indices of the constraints that mention
/// it. Fixing a variable replaces the affected constraints with reduced
/// copies, all or nothing.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use u_stitch::csp::{ConstraintSatisfactionProblem, ConstraintSource, Vartype};
///
/// let mut csp = ConstraintSatisfactionProblem::new(Vartype::Spin);
/// csp.add_constraint(ConstraintSource::predicate(|x| x[0] == x[1], ["a", "b"])).unwrap();
/// csp.add_constraint(ConstraintSource::predicate(|x| x[0] != x[1], ["b", "c"])).unwrap();
///
/// let ok: HashMap<String, i8> = [("a".into(), 1), ("b".into(), 1), ("c".into(), -1)].into();
/// assert!(csp.check(&ok).unwrap());
///
/// csp.fix_variable("b", 1).unwrap();
/// let rest: HashMap<String, i8> = [("a".into(), 1), ("c".into(), -1)].into();
/// assert!(csp.check(&rest).unwrap());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintSatisfactionProblem {
    vartype: Vartype,
    constraints: Vec<Constraint>,
    variables: BTreeMap<String, Vec<usize>>,
}

/// Short alias for [`ConstraintSatisfactionProblem`].
pub type Csp = ConstraintSatisfactionProblem;

impl ConstraintSatisfactionProblem {
    /// Creates an empty problem.
    pub fn new(vartype: Vartype) -> Self {
        Self {
            vartype,
            constraints: Vec::new(),
            variables: BTreeMap::new(),
        }
    }

    pub fn vartype(&self) -> Vartype {
        self.vartype
    }

    /// Adds a constraint and returns its index.
    pub fn add_constraint<'a>(&mut self, source: impl Into<ConstraintSource<'a>>) -> Result<usize> {
        let constraint = source.into().resolve(self.vartype)?;
        let idx = self.constraints.len();
        for v in constraint.variables() {
            self.variables.entry(v.clone()).or_default().push(idx);
        }
        self.constraints.push(constraint);
        Ok(idx)
    }

    /// Registers a variable that no constraint mentions (yet).
    pub fn add_variable(&mut self, variable: impl Into<String>) {
        self.variables.entry(variable.into()).or_default();
    }

    /// Whether `assignment` satisfies every constraint.
    pub fn check(&self, assignment: &HashMap<String, i8>) -> Result<bool> {
        for constraint in &self.constraints {
            if !constraint.check(assignment)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Fixes `variable` to `value` in every constraint that mentions it and
    /// drops the variable from the problem.
    ///
    /// If any affected constraint would become unsatisfiable the problem is
    /// left unchanged and [`Error::Unsatisfiable`] is returned.
    pub fn fix_variable(&mut self, variable: &str, value: i8) -> Result<()> {
        let indices = self
            .variables
            .get(variable)
            .ok_or_else(|| Error::UnknownVariable {
                variable: variable.to_string(),
                owner: "the constraint satisfaction problem".into(),
            })?
            .clone();
        if !self.vartype.contains(value) {
            return Err(Error::ValueOutOfDomain {
                value,
                vartype: self.vartype,
            });
        }

        let reduced = indices
            .iter()
            .map(|&idx| self.constraints[idx].fix_variable(variable, value).map(|c| (idx, c)))
            .collect::<Result<Vec<_>>>()?;

        for (idx, constraint) in reduced {
            self.constraints[idx] = constraint;
        }
        self.variables.remove(variable);
        Ok(())
    }

    /// Number of constraints.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraint(&self, idx: usize) -> Option<&Constraint> {
        self.constraints.get(idx)
    }

    /// All variables, sorted.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn contains_variable(&self, variable: &str) -> bool {
        self.variables.contains_key(variable)
    }

    /// Constraints mentioning `variable`.
    pub fn constraints_of<'s>(&'s self, variable: &str) -> impl Iterator<Item = &'s Constraint> + 's {
        self.variables
            .get(variable)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.constraints[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(pairs: &[(&str, i8)]) -> HashMap<String, i8> {
        pairs.iter().map(|&(v, x)| (v.to_string(), x)).collect()
    }

    fn eq_ne_csp() -> Csp {
        let mut csp = Csp::new(Vartype::Spin);
        csp.add_constraint(ConstraintSource::predicate(|x| x[0] == x[1], ["a", "b"]))
            .unwrap();
        csp.add_constraint(ConstraintSource::predicate(|x| x[0] != x[1], ["b", "c"]))
            .unwrap();
        csp
    }

    #[test]
    fn test_add_three_ways() {
        let mut csp = Csp::new(Vartype::Binary);
        csp.add_constraint(ConstraintSource::predicate(
            |x| x[0] == x[1] && x[1] == x[2],
            ["a", "b", "c"],
        ))
        .unwrap();
        csp.add_constraint(ConstraintSource::configurations(vec![vec![0, 1], vec![1, 0]], ["c", "d"]))
            .unwrap();
        let prebuilt =
            Constraint::from_configurations(vec![vec![1]], ["e"], Vartype::Binary).unwrap();
        csp.add_constraint(prebuilt).unwrap();

        assert_eq!(csp.len(), 3);
        assert_eq!(csp.num_variables(), 5);
        assert_eq!(csp.constraints_of("c").count(), 2);

        let good = assignment(&[("a", 1), ("b", 1), ("c", 1), ("d", 0), ("e", 1)]);
        assert_eq!(csp.check(&good), Ok(true));
        let bad = assignment(&[("a", 1), ("b", 1), ("c", 1), ("d", 1), ("e", 1)]);
        assert_eq!(csp.check(&bad), Ok(false));
    }

    #[test]
    fn test_prebuilt_vartype_mismatch() {
        let mut csp = Csp::new(Vartype::Binary);
        let spin = Constraint::from_configurations(vec![vec![1]], ["a"], Vartype::Spin).unwrap();
        assert!(matches!(csp.add_constraint(spin), Err(Error::VartypeMismatch { .. })));
        assert!(csp.is_empty());
    }

    #[test]
    fn test_malformed_source_rejected() {
        let mut csp = Csp::new(Vartype::Spin);
        let err = csp
            .add_constraint(ConstraintSource::configurations(vec![vec![0, 1]], ["a", "b"]))
            .unwrap_err();
        assert!(matches!(err, Error::ValueOutOfDomain { value: 0, .. }));
        assert_eq!(csp.num_variables(), 0);
    }

    #[test]
    fn test_add_variable() {
        let mut csp = eq_ne_csp();
        csp.add_variable("a");
        csp.add_variable("z");
        assert_eq!(csp.variables().collect::<Vec<_>>(), vec!["a", "b", "c", "z"]);
        assert_eq!(csp.constraints_of("z").count(), 0);
    }

    #[test]
    fn test_fix_variable() {
        let mut csp = eq_ne_csp();
        csp.fix_variable("b", 1).unwrap();

        assert!(!csp.contains_variable("b"));
        assert_eq!(csp.check(&assignment(&[("a", 1), ("c", -1)])), Ok(true));
        assert_eq!(csp.check(&assignment(&[("a", -1), ("c", 1)])), Ok(false));
        assert_eq!(csp.constraint(0).unwrap().len(), 1);
    }

    #[test]
    fn test_fix_variable_sequence() {
        let mut csp = eq_ne_csp();
        csp.fix_variable("b", -1).unwrap();
        csp.fix_variable("a", -1).unwrap();

        assert!(csp.constraint(0).unwrap().is_empty());
        assert_eq!(csp.constraint(1).unwrap().variables(), ["c".to_string()]);
        assert_eq!(csp.check(&assignment(&[("c", 1)])), Ok(true));
    }

    #[test]
    fn test_fix_variable_unsat_leaves_problem_unchanged() {
        let mut csp = Csp::new(Vartype::Spin);
        csp.add_constraint(ConstraintSource::predicate(|_| true, ["a", "b"]))
            .unwrap();
        csp.add_constraint(ConstraintSource::configurations(vec![vec![1, 1]], ["a", "c"]))
            .unwrap();
        let before = csp.constraints().to_vec();

        let err = csp.fix_variable("a", -1).unwrap_err();
        assert!(matches!(err, Error::Unsatisfiable { .. }));
        assert_eq!(csp.constraints(), before.as_slice());
        assert!(csp.contains_variable("a"));
    }

    #[test]
    fn test_fix_unknown_variable() {
        let mut csp = eq_ne_csp();
        assert!(matches!(csp.fix_variable("q", 1), Err(Error::UnknownVariable { .. })));
        assert!(matches!(csp.fix_variable("a", 0), Err(Error::ValueOutOfDomain { .. })));
    }
}
