//! Ready-made constraints and problem instances.
//!
//! - Logic gates: [`and_gate`], [`or_gate`], [`xor_gate`], [`halfadder_gate`],
//!   [`fulladder_gate`]
//! - Satisfiability: [`sat2in4`] clauses and seeded [`random_2in4sat`]
//!   problems, optionally with a planted solution

mod gates;
mod sat;

pub use gates::{and_gate, fulladder_gate, halfadder_gate, or_gate, xor_gate};
pub use sat::{random_2in4sat, sat2in4};
