//! Compiling constraint satisfaction problems into energy models.
//!
//! # Key Components
//!
//! - [`Stitcher`]: compiles a [`Csp`](crate::csp::Csp) constraint by
//!   constraint and sums the fragments
//! - [`StitchConfig`]: minimum classical gap, graph size limit, auxiliary
//!   label prefix
//! - [`stitch`]: one-call entry point using the bundled
//!   [`LatticeOracle`](crate::oracle::LatticeOracle)
//!
//! # Strategy
//!
//! One- and two-variable constraints have closed-form fragments with gap
//! exactly 2. Larger constraints, and any constraint when a gap above 2 is
//! requested, go to a [`PenaltyOracle`](crate::oracle::PenaltyOracle) on
//! complete graphs that grow by one auxiliary variable at a time.
//!
//! Gaps add: a configuration violating one constraint pays at least that
//! constraint's gap, and every other fragment is bounded below by its own
//! ground energy of 0.

mod closed_form;
mod config;
mod graph;
mod runner;

pub use config::StitchConfig;
pub use runner::{stitch, stitch_with, Stitcher};
