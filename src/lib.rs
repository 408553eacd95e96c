//! Compiling binary constraint satisfaction problems into quadratic energy
//! models.
//!
//! A constraint satisfaction problem (CSP) over SPIN ({-1, +1}) or BINARY
//! ({0, 1}) variables is turned into a binary quadratic model whose ground
//! states are exactly the CSP's solutions, with every violated constraint
//! raising the energy by at least a chosen classical gap.
//!
//! - **CSP modeling** ([`csp`]): constraints as feasible configuration sets,
//!   fixing, flipping, projection and decomposition into independent factors.
//! - **Energy models** ([`bqm`]): linear and quadratic biases with an offset,
//!   energy evaluation and vartype conversion.
//! - **Oracles** ([`oracle`]): the penalty-model contract plus a built-in
//!   lattice search (exhaustive or simulated annealing).
//! - **Stitching** ([`stitcher`]): closed forms for one and two variables, an
//!   oracle-driven growth search with auxiliary variables for the rest.
//! - **Factories** ([`factories`]): logic gates and 2-in-4 SAT instances.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use u_stitch::csp::{Csp, ConstraintSource, Vartype};
//!
//! let mut csp = Csp::new(Vartype::Spin);
//! csp.add_constraint(ConstraintSource::predicate(|x| x[0] == x[1], ["a", "b"]))?;
//! csp.add_constraint(ConstraintSource::predicate(|x| x[0] != x[1], ["b", "c"]))?;
//!
//! let model = u_stitch::stitch(&csp, 2.0, 8)?;
//! let ok: HashMap<String, i8> = [("a".into(), 1), ("b".into(), 1), ("c".into(), -1)].into();
//! assert_eq!(model.energy(&ok)?, 0.0);
//! # Ok::<(), u_stitch::Error>(())
//! ```
//!
//! # Features
//!
//! - `parallel`: splits the exhaustive lattice scan over rayon.
//! - `serde`: serialization for models, constraints and configs.

pub mod bqm;
pub mod csp;
mod error;
pub mod factories;
pub mod oracle;
pub mod stitcher;
pub mod testing;

pub use error::{Error, Result};
pub use stitcher::stitch;
