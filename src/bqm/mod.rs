//! Binary quadratic energy models.
//!
//! The output of stitching: linear and quadratic biases plus an offset over
//! SPIN or BINARY variables. Solving these models (sampling, annealing) is a
//! separate concern and not provided here.

mod model;

pub use model::EnergyModel;
