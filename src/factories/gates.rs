//! Logic gate constraints.
//!
//! Inputs come first, outputs last. A value counts as "true" when it is the
//! high member of the domain (1 for both vartypes).

use crate::csp::{Constraint, Vartype};
use crate::error::Result;

fn gate<const N: usize, S, F>(variables: [S; N], vartype: Vartype, name: &str, truth: F) -> Result<Constraint>
where
    S: Into<String>,
    F: Fn(&[bool]) -> bool,
{
    let high = vartype.high();
    Constraint::from_predicate(
        |config| {
            let bits: Vec<bool> = config.iter().map(|&x| x == high).collect();
            truth(&bits)
        },
        variables,
        vartype,
    )
    .map(|c| c.with_name(name))
}

/// `out = in1 AND in2` over `[in1, in2, out]`.
///
/// # Examples
///
/// ```
/// use u_stitch::csp::Vartype;
/// use u_stitch::factories::and_gate;
///
/// let and = and_gate(["a", "b", "z"], Vartype::Binary).unwrap();
/// assert!(and.is_satisfied_by(&[1, 1, 1]));
/// assert!(!and.is_satisfied_by(&[1, 0, 1]));
/// assert_eq!(and.name(), "AND");
/// ```
pub fn and_gate<S: Into<String>>(variables: [S; 3], vartype: Vartype) -> Result<Constraint> {
    gate(variables, vartype, "AND", |x| (x[0] && x[1]) == x[2])
}

/// `out = in1 OR in2` over `[in1, in2, out]`.
pub fn or_gate<S: Into<String>>(variables: [S; 3], vartype: Vartype) -> Result<Constraint> {
    gate(variables, vartype, "OR", |x| (x[0] || x[1]) == x[2])
}

/// `out = in1 XOR in2` over `[in1, in2, out]`.
pub fn xor_gate<S: Into<String>>(variables: [S; 3], vartype: Vartype) -> Result<Constraint> {
    gate(variables, vartype, "XOR", |x| (x[0] != x[1]) == x[2])
}

/// Half adder over `[augend, addend, sum, carry]`.
pub fn halfadder_gate<S: Into<String>>(variables: [S; 4], vartype: Vartype) -> Result<Constraint> {
    gate(variables, vartype, "HALF_ADDER", |x| {
        let total = usize::from(x[0]) + usize::from(x[1]);
        x[2] == (total % 2 == 1) && x[3] == (total >= 2)
    })
}

/// Full adder over `[in1, in2, in3, sum, carry]`.
pub fn fulladder_gate<S: Into<String>>(variables: [S; 5], vartype: Vartype) -> Result<Constraint> {
    gate(variables, vartype, "FULL_ADDER", |x| {
        let total = x[..3].iter().filter(|&&b| b).count();
        x[3] == (total % 2 == 1) && x[4] == (total >= 2)
    })
}
