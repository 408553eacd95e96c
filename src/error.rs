//! Error types for constraint modeling and stitching.

use crate::csp::Vartype;

/// Result type for constraint and stitching operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building constraints, editing a CSP or stitching it
/// into an energy model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A configuration does not have one value per variable.
    #[error("configuration {configuration:?} has {found} values, expected {expected}")]
    ArityMismatch {
        configuration: Vec<i8>,
        expected: usize,
        found: usize,
    },

    /// A configuration value lies outside the vartype's domain.
    #[error("value {value} is not in the {vartype} domain")]
    ValueOutOfDomain { value: i8, vartype: Vartype },

    /// A constraint over one or more variables admits no configuration.
    #[error("constraint over {num_variables} variables must have at least one feasible configuration")]
    NoFeasibleConfiguration { num_variables: usize },

    /// The same variable appears twice in a constraint's variable list.
    #[error("variable '{0}' appears more than once")]
    DuplicateVariable(String),

    /// A fixed-arity constraint factory got the wrong number of variables.
    #[error("{name} takes {expected} variables, got {found}")]
    VariableCount {
        name: String,
        expected: usize,
        found: usize,
    },

    /// A variable was referenced that the constraint or CSP does not contain.
    #[error("variable '{variable}' is not part of {owner}")]
    UnknownVariable { variable: String, owner: String },

    /// Two objects that must share a vartype do not.
    #[error("vartype mismatch: expected {expected}, found {found}")]
    VartypeMismatch { expected: Vartype, found: Vartype },

    /// Fixing a variable left a constraint without any feasible configuration.
    #[error("fixing '{variable}' to {value} makes constraint '{constraint}' unsatisfiable")]
    Unsatisfiable {
        variable: String,
        value: i8,
        constraint: String,
    },

    /// An assignment is missing a value for a variable being checked.
    #[error("no value assigned to variable '{0}'")]
    UnassignedVariable(String),

    /// No quadratic model with the requested gap fits any allowed graph.
    #[error(
        "no penalty model for constraint '{constraint}' ({num_variables} variables): \
         tried graphs up to {attempted_graph_size} nodes, max_graph_size is {max_graph_size}"
    )]
    UnrealizableConstraint {
        constraint: String,
        num_variables: usize,
        attempted_graph_size: usize,
        max_graph_size: usize,
    },

    /// A configuration struct failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
