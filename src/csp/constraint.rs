//! Constraints over binary-valued variables.

use super::vartype::Vartype;
use crate::error::{Error, Result};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A constraint: an ordered tuple of variables together with the set of
/// value assignments (configurations) that satisfy it.
///
/// The configuration set is the canonical form; the membership predicate
/// is [`Constraint::is_satisfied_by`]. Every derived operation returns a new
/// constraint and leaves `self` untouched.
///
/// Equality and hashing consider variables, configurations and vartype, not
/// the name.
///
/// # Examples
///
/// ```
/// use u_stitch::csp::{Constraint, Vartype};
///
/// let ne = Constraint::from_predicate(|x| x[0] != x[1], ["a", "b"], Vartype::Binary).unwrap();
/// assert!(ne.is_satisfied_by(&[0, 1]));
/// assert!(!ne.is_satisfied_by(&[1, 1]));
///
/// let fixed = ne.fix_variable("a", 0).unwrap();
/// assert_eq!(fixed.variables(), ["b".to_string()]);
/// assert!(fixed.is_satisfied_by(&[1]));
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constraint {
    variables: Vec<String>,
    configurations: BTreeSet<Vec<i8>>,
    vartype: Vartype,
    name: String,
}

impl Constraint {
    /// Default name given to constraints built without one.
    pub const DEFAULT_NAME: &'static str = "Constraint";

    /// Builds a constraint from an explicit set of feasible configurations.
    ///
    /// Fails when a configuration has the wrong length or a value outside
    /// the domain, when a variable is repeated, or when no configuration is
    /// given for a non-empty variable list.
    pub fn from_configurations<I, V, S>(configurations: I, variables: V, vartype: Vartype) -> Result<Self>
    where
        I: IntoIterator<Item = Vec<i8>>,
        V: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let variables: Vec<String> = variables.into_iter().map(Into::into).collect();
        Self::validated(
            variables,
            configurations.into_iter().collect(),
            vartype,
            Self::DEFAULT_NAME.to_string(),
        )
    }

    /// Builds a constraint from a predicate by enumerating every assignment
    /// of the domain over `variables`.
    ///
    /// The predicate receives values ordered like `variables`.
    pub fn from_predicate<F, V, S>(predicate: F, variables: V, vartype: Vartype) -> Result<Self>
    where
        F: Fn(&[i8]) -> bool,
        V: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let variables: Vec<String> = variables.into_iter().map(Into::into).collect();
        check_unique(&variables)?;
        let configurations = vartype
            .configurations(variables.len())
            .filter(|config| predicate(config))
            .collect();
        Self::validated(variables, configurations, vartype, Self::DEFAULT_NAME.to_string())
    }

    fn validated(
        variables: Vec<String>,
        configurations: BTreeSet<Vec<i8>>,
        vartype: Vartype,
        name: String,
    ) -> Result<Self> {
        check_unique(&variables)?;

        if configurations.is_empty() && !variables.is_empty() {
            return Err(Error::NoFeasibleConfiguration {
                num_variables: variables.len(),
            });
        }
        for config in &configurations {
            if config.len() != variables.len() {
                return Err(Error::ArityMismatch {
                    configuration: config.clone(),
                    expected: variables.len(),
                    found: config.len(),
                });
            }
            if let Some(&value) = config.iter().find(|&&v| !vartype.contains(v)) {
                return Err(Error::ValueOutOfDomain { value, vartype });
            }
        }

        Ok(Self {
            variables,
            configurations,
            vartype,
            name,
        })
    }

    /// Renames the constraint.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The variables, in configuration order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// The feasible configurations.
    pub fn configurations(&self) -> &BTreeSet<Vec<i8>> {
        &self.configurations
    }

    pub fn vartype(&self) -> Vartype {
        self.vartype
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether the constraint has no variables.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Whether every assignment of the domain is feasible.
    pub fn is_trivial(&self) -> bool {
        domain_size(self.variables.len()) == Some(self.configurations.len() as u128)
    }

    /// Position of `variable` in the configuration tuples.
    pub fn position(&self, variable: &str) -> Option<usize> {
        self.variables.iter().position(|v| v == variable)
    }

    /// Membership predicate: whether `values` (ordered like
    /// [`variables`](Self::variables)) is a feasible configuration.
    pub fn is_satisfied_by(&self, values: &[i8]) -> bool {
        self.configurations.contains(values)
    }

    /// Checks a labelled assignment. Extra labels are ignored.
    pub fn check(&self, assignment: &HashMap<String, i8>) -> Result<bool> {
        let values = self
            .variables
            .iter()
            .map(|v| {
                assignment
                    .get(v)
                    .copied()
                    .ok_or_else(|| Error::UnassignedVariable(v.clone()))
            })
            .collect::<Result<Vec<i8>>>()?;
        Ok(self.is_satisfied_by(&values))
    }

    /// Disjunction: feasible when either constraint is satisfied.
    ///
    /// The result ranges over `self`'s variables followed by the variables
    /// of `other` that `self` does not mention.
    pub fn union(&self, other: &Constraint) -> Result<Constraint> {
        let name = format!("{} | {}", self.name, other.name);
        self.combine(other, name, |a, b| a || b)
    }

    /// Conjunction: feasible when both constraints are satisfied.
    pub fn intersection(&self, other: &Constraint) -> Result<Constraint> {
        let name = format!("{} & {}", self.name, other.name);
        self.combine(other, name, |a, b| a && b)
    }

    fn combine(&self, other: &Constraint, name: String, op: fn(bool, bool) -> bool) -> Result<Constraint> {
        if !self.is_empty() && !other.is_empty() && self.vartype != other.vartype {
            return Err(Error::VartypeMismatch {
                expected: self.vartype,
                found: other.vartype,
            });
        }
        let vartype = if self.is_empty() { other.vartype } else { self.vartype };

        let mut variables = self.variables.clone();
        for v in &other.variables {
            if self.position(v).is_none() {
                variables.push(v.clone());
            }
        }
        let other_positions: Vec<usize> = other
            .variables
            .iter()
            .map(|v| variables.iter().position(|u| u == v).unwrap_or_default())
            .collect();

        let n = self.len();
        let configurations = vartype
            .configurations(variables.len())
            .filter(|config| {
                let other_values: Vec<i8> = other_positions.iter().map(|&p| config[p]).collect();
                op(
                    self.is_satisfied_by(&config[..n]),
                    other.is_satisfied_by(&other_values),
                )
            })
            .collect();

        Self::validated(variables, configurations, vartype, name)
    }

    /// Restricts the constraint to `variables`, keeping the distinct
    /// projections of the feasible configurations in the requested order.
    pub fn projection<V, S>(&self, variables: V) -> Result<Constraint>
    where
        V: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let variables: Vec<String> = variables.into_iter().map(Into::into).collect();
        let positions = variables
            .iter()
            .map(|v| self.position(v).ok_or_else(|| self.unknown(v)))
            .collect::<Result<Vec<usize>>>()?;

        let configurations = self
            .configurations
            .iter()
            .map(|config| positions.iter().map(|&p| config[p]).collect())
            .collect();

        Self::validated(variables, configurations, self.vartype, self.name.clone())
    }

    /// Fixes `variable` to `value` and removes it from the constraint.
    ///
    /// Fails with [`Error::Unsatisfiable`] when no feasible configuration
    /// agrees with the fixed value.
    pub fn fix_variable(&self, variable: &str, value: i8) -> Result<Constraint> {
        let idx = self.position(variable).ok_or_else(|| self.unknown(variable))?;
        if !self.vartype.contains(value) {
            return Err(Error::ValueOutOfDomain {
                value,
                vartype: self.vartype,
            });
        }

        let configurations: BTreeSet<Vec<i8>> = self
            .configurations
            .iter()
            .filter(|config| config[idx] == value)
            .map(|config| {
                let mut reduced = config.clone();
                reduced.remove(idx);
                reduced
            })
            .collect();

        if configurations.is_empty() {
            return Err(Error::Unsatisfiable {
                variable: variable.to_string(),
                value,
                constraint: self.name.clone(),
            });
        }

        let mut variables = self.variables.clone();
        variables.remove(idx);

        Ok(Self {
            variables,
            configurations,
            vartype: self.vartype,
            name: format!("{} ({} fixed to {})", self.name, variable, value),
        })
    }

    /// Negates the polarity of `variable`.
    pub fn flip_variable(&self, variable: &str) -> Result<Constraint> {
        let idx = self.position(variable).ok_or_else(|| self.unknown(variable))?;
        let configurations = self
            .configurations
            .iter()
            .map(|config| {
                let mut flipped = config.clone();
                flipped[idx] = self.vartype.flip(flipped[idx]);
                flipped
            })
            .collect();

        Ok(Self {
            variables: self.variables.clone(),
            configurations,
            vartype: self.vartype,
            name: format!("{} ({} flipped)", self.name, variable),
        })
    }

    fn unknown(&self, variable: &str) -> Error {
        Error::UnknownVariable {
            variable: variable.to_string(),
            owner: format!("constraint '{}'", self.name),
        }
    }
}

/// Number of assignments of `n` variables, `None` past `u128`.
fn domain_size(n: usize) -> Option<u128> {
    u32::try_from(n).ok().and_then(|shift| 1u128.checked_shl(shift))
}

fn check_unique(variables: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(variables.len());
    for v in variables {
        if !seen.insert(v.as_str()) {
            return Err(Error::DuplicateVariable(v.clone()));
        }
    }
    Ok(())
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.variables == other.variables
            && self.configurations == other.configurations
            && self.vartype == other.vartype
    }
}

impl Eq for Constraint {}

impl Hash for Constraint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.variables.hash(state);
        self.configurations.hash(state);
        self.vartype.hash(state);
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.variables.len();
        let domain = domain_size(n).map_or_else(|| format!("2^{n}"), |size| size.to_string());
        write!(
            f,
            "{}({}; {} of {} configurations, {})",
            self.name,
            self.variables.join(", "),
            self.configurations.len(),
            domain,
            self.vartype
        )
    }
}
