//! Penalty-model oracles.
//!
//! An oracle answers one question: can a set of feasible configurations be
//! realized as a quadratic model on a given graph, with every infeasible
//! configuration at least a given gap above the feasible ground level?
//!
//! # Key Components
//!
//! - [`PenaltyOracle`]: the contract, with [`Specification`] requests and
//!   [`OracleOutcome`] answers
//! - [`LatticeOracle`]: a built-in oracle searching SPIN biases on a finite
//!   lattice, exhaustively when small and by simulated annealing otherwise
//! - [`NoOracle`]: realizes nothing, for closed-form-only compilation
//!
//! Closures `Fn(&Specification) -> OracleOutcome` implement the trait, so an
//! external MIP/LP/SAT formulation can be plugged in directly.
//!
//! # References
//!
//! - Bian et al. (2014), "Discrete optimization using quantum annealing on
//!   sparse Ising models"
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"

mod anneal;
mod config;
mod lattice;
mod types;

pub use config::{AnnealConfig, CoolingSchedule, LatticeConfig};
pub use lattice::LatticeOracle;
pub use types::{Graph, NoOracle, OracleOutcome, PenaltyOracle, Realization, Specification};
