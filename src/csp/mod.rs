//! Constraint satisfaction modeling over binary-valued variables.
//!
//! # Key Components
//!
//! - **Domains**: [`Vartype`]: SPIN ({-1, +1}) or BINARY ({0, 1})
//! - **Constraints**: [`Constraint`]: variables plus feasible configurations,
//!   with union, intersection, projection, fixing and flipping
//! - **Problem**: [`ConstraintSatisfactionProblem`]: an arena of constraints
//!   with a variable index; constraints enter through [`ConstraintSource`]
//! - **Decomposition**: [`irreducible_components`]: splits a constraint into
//!   independent factors
//!
//! # Design
//!
//! Constraints are immutable values. Operations that change a constraint
//! (fixing, flipping, combining) return a new one, and the problem swaps
//! constraints in its arena by index.

mod constraint;
mod problem;
mod reduction;
mod vartype;

pub use constraint::Constraint;
pub use problem::{ConstraintSatisfactionProblem, ConstraintSource, Csp};
pub use reduction::irreducible_components;
pub use vartype::Vartype;
