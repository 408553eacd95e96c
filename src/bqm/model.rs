//! Quadratic energy model over binary-valued variables.

use crate::csp::Vartype;
use crate::error::{Error, Result};
use std::collections::{BTreeMap, HashMap};

/// A binary quadratic model:
///
/// `E(x) = offset + Σ_v h_v x_v + Σ_{u<v} J_uv x_u x_v`
///
/// with every `x` drawn from the model's [`Vartype`]. Interactions are keyed
/// by the lexicographically ordered pair of variable labels.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use u_stitch::bqm::EnergyModel;
/// use u_stitch::csp::Vartype;
///
/// let mut model = EnergyModel::empty(Vartype::Spin);
/// model.add_interaction("a", "b", -1.0);
/// model.add_offset(1.0);
///
/// let same: HashMap<String, i8> = [("a".into(), 1), ("b".into(), 1)].into();
/// let diff: HashMap<String, i8> = [("a".into(), 1), ("b".into(), -1)].into();
/// assert_eq!(model.energy(&same).unwrap(), 0.0);
/// assert_eq!(model.energy(&diff).unwrap(), 2.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnergyModel {
    linear: BTreeMap<String, f64>,
    quadratic: BTreeMap<(String, String), f64>,
    offset: f64,
    vartype: Vartype,
}

impl EnergyModel {
    /// Creates a model with no variables and zero offset.
    pub fn empty(vartype: Vartype) -> Self {
        Self {
            linear: BTreeMap::new(),
            quadratic: BTreeMap::new(),
            offset: 0.0,
            vartype,
        }
    }

    pub fn vartype(&self) -> Vartype {
        self.vartype
    }

    /// Linear biases, one per variable (zero biases included).
    pub fn linear(&self) -> &BTreeMap<String, f64> {
        &self.linear
    }

    /// Quadratic biases keyed by ordered variable pair.
    pub fn quadratic(&self) -> &BTreeMap<(String, String), f64> {
        &self.quadratic
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn num_variables(&self) -> usize {
        self.linear.len()
    }

    pub fn num_interactions(&self) -> usize {
        self.quadratic.len()
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.linear.keys().map(String::as_str)
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.linear.contains_key(variable)
    }

    /// Linear bias of `variable`, if present.
    pub fn get_linear(&self, variable: &str) -> Option<f64> {
        self.linear.get(variable).copied()
    }

    /// Quadratic bias between `u` and `v` (order-insensitive), if present.
    pub fn get_quadratic(&self, u: &str, v: &str) -> Option<f64> {
        self.quadratic.get(&ordered(u, v)).copied()
    }

    /// Adds `bias` to the linear term of `variable`, creating it if needed.
    pub fn add_variable(&mut self, variable: impl Into<String>, bias: f64) {
        *self.linear.entry(variable.into()).or_insert(0.0) += bias;
    }

    /// Adds `bias` to the interaction between `u` and `v`.
    ///
    /// A self-interaction folds into the offset (SPIN, `s * s = 1`) or the
    /// linear term (BINARY, `x * x = x`).
    pub fn add_interaction(&mut self, u: impl Into<String>, v: impl Into<String>, bias: f64) {
        let (u, v) = (u.into(), v.into());
        if u == v {
            match self.vartype {
                Vartype::Spin => self.offset += bias,
                Vartype::Binary => self.add_variable(u, bias),
            }
            return;
        }
        self.add_variable(u.clone(), 0.0);
        self.add_variable(v.clone(), 0.0);
        let key = if u < v { (u, v) } else { (v, u) };
        *self.quadratic.entry(key).or_insert(0.0) += bias;
    }

    pub fn add_offset(&mut self, offset: f64) {
        self.offset += offset;
    }

    /// Adds every bias and the offset of `other` into `self`.
    ///
    /// Shared variables and interactions have their biases summed.
    pub fn merge(&mut self, other: &EnergyModel) -> Result<()> {
        if other.vartype != self.vartype {
            return Err(Error::VartypeMismatch {
                expected: self.vartype,
                found: other.vartype,
            });
        }
        for (v, &bias) in &other.linear {
            self.add_variable(v.clone(), bias);
        }
        for ((u, v), &bias) in &other.quadratic {
            *self.quadratic.entry((u.clone(), v.clone())).or_insert(0.0) += bias;
        }
        self.offset += other.offset;
        Ok(())
    }

    /// Energy of a full assignment. Extra labels are ignored.
    pub fn energy(&self, assignment: &HashMap<String, i8>) -> Result<f64> {
        let value = |v: &String| -> Result<f64> {
            let x = assignment
                .get(v)
                .copied()
                .ok_or_else(|| Error::UnassignedVariable(v.clone()))?;
            if !self.vartype.contains(x) {
                return Err(Error::ValueOutOfDomain {
                    value: x,
                    vartype: self.vartype,
                });
            }
            Ok(f64::from(x))
        };

        let mut energy = self.offset;
        for (v, &bias) in &self.linear {
            energy += bias * value(v)?;
        }
        for ((u, v), &bias) in &self.quadratic {
            energy += bias * value(u)? * value(v)?;
        }
        Ok(energy)
    }

    /// Returns the equivalent model over `vartype`, substituting
    /// `s = 2x - 1` (SPIN to BINARY) or `x = (s + 1) / 2` (BINARY to SPIN).
    /// Energies of corresponding assignments are preserved.
    pub fn change_vartype(&self, vartype: Vartype) -> EnergyModel {
        if vartype == self.vartype {
            return self.clone();
        }

        let mut out = EnergyModel::empty(vartype);
        out.offset = self.offset;

        match vartype {
            Vartype::Binary => {
                for (v, &h) in &self.linear {
                    out.add_variable(v.clone(), 2.0 * h);
                    out.offset -= h;
                }
                for ((u, v), &j) in &self.quadratic {
                    out.add_interaction(u.clone(), v.clone(), 4.0 * j);
                    out.add_variable(u.clone(), -2.0 * j);
                    out.add_variable(v.clone(), -2.0 * j);
                    out.offset += j;
                }
            }
            Vartype::Spin => {
                for (v, &h) in &self.linear {
                    out.add_variable(v.clone(), 0.5 * h);
                    out.offset += 0.5 * h;
                }
                for ((u, v), &j) in &self.quadratic {
                    out.add_interaction(u.clone(), v.clone(), 0.25 * j);
                    out.add_variable(u.clone(), 0.25 * j);
                    out.add_variable(v.clone(), 0.25 * j);
                    out.offset += 0.25 * j;
                }
            }
        }
        out
    }
}

fn ordered(u: &str, v: &str) -> (String, String) {
    if u < v {
        (u.to_string(), v.to_string())
    } else {
        (v.to_string(), u.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(vars: &[&str], values: &[i8]) -> HashMap<String, i8> {
        vars.iter().map(|v| v.to_string()).zip(values.iter().copied()).collect()
    }

    fn sample_model(vartype: Vartype) -> EnergyModel {
        let mut m = EnergyModel::empty(vartype);
        m.add_variable("a", 0.5);
        m.add_variable("b", -1.5);
        m.add_variable("c", 2.0);
        m.add_interaction("a", "b", -1.0);
        m.add_interaction("c", "b", 0.75);
        m.add_offset(0.25);
        m
    }

    #[test]
    fn test_interaction_order_insensitive() {
        let mut m = EnergyModel::empty(Vartype::Spin);
        m.add_interaction("b", "a", 1.0);
        m.add_interaction("a", "b", 0.5);

        assert_eq!(m.get_quadratic("a", "b"), Some(1.5));
        assert_eq!(m.get_quadratic("b", "a"), Some(1.5));
        assert_eq!(m.get_linear("a"), Some(0.0));
        assert_eq!(m.num_interactions(), 1);
    }

    #[test]
    fn test_self_interaction_folds() {
        let mut spin = EnergyModel::empty(Vartype::Spin);
        spin.add_interaction("a", "a", 2.0);
        assert_eq!(spin.offset(), 2.0);
        assert_eq!(spin.num_interactions(), 0);

        let mut binary = EnergyModel::empty(Vartype::Binary);
        binary.add_interaction("a", "a", 2.0);
        assert_eq!(binary.get_linear("a"), Some(2.0));
    }

    #[test]
    fn test_energy() {
        let m = sample_model(Vartype::Spin);
        let e = m.energy(&assignment(&["a", "b", "c"], &[1, -1, 1])).unwrap();
        // 0.25 + 0.5 + 1.5 + 2.0 + 1.0 - 0.75
        assert!((e - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_energy_errors() {
        let m = sample_model(Vartype::Binary);
        assert_eq!(
            m.energy(&assignment(&["a", "b"], &[1, 0])),
            Err(Error::UnassignedVariable("c".into()))
        );
        assert!(matches!(
            m.energy(&assignment(&["a", "b", "c"], &[1, -1, 0])),
            Err(Error::ValueOutOfDomain { value: -1, .. })
        ));
    }

    #[test]
    fn test_merge_sums_biases() {
        let mut left = EnergyModel::empty(Vartype::Spin);
        left.add_variable("a", 1.0);
        left.add_interaction("a", "b", -1.0);
        left.add_offset(1.0);

        let mut right = EnergyModel::empty(Vartype::Spin);
        right.add_variable("a", -0.5);
        right.add_interaction("b", "a", -1.0);
        right.add_interaction("b", "c", 1.0);
        right.add_offset(2.0);

        left.merge(&right).unwrap();
        assert_eq!(left.get_linear("a"), Some(0.5));
        assert_eq!(left.get_quadratic("a", "b"), Some(-2.0));
        assert_eq!(left.get_quadratic("b", "c"), Some(1.0));
        assert_eq!(left.offset(), 3.0);
        assert_eq!(left.num_variables(), 3);
    }

    #[test]
    fn test_merge_vartype_mismatch() {
        let mut spin = EnergyModel::empty(Vartype::Spin);
        assert!(spin.merge(&EnergyModel::empty(Vartype::Binary)).is_err());
    }

    #[test]
    fn test_change_vartype_preserves_energy() {
        for source in [Vartype::Spin, Vartype::Binary] {
            let target = match source {
                Vartype::Spin => Vartype::Binary,
                Vartype::Binary => Vartype::Spin,
            };
            let m = sample_model(source);
            let converted = m.change_vartype(target);
            assert_eq!(converted.vartype(), target);

            for config in source.configurations(3) {
                let translated: Vec<i8> = config
                    .iter()
                    .map(|&x| target.from_spin(source.to_spin(x)))
                    .collect();
                let e0 = m.energy(&assignment(&["a", "b", "c"], &config)).unwrap();
                let e1 = converted
                    .energy(&assignment(&["a", "b", "c"], &translated))
                    .unwrap();
                assert!((e0 - e1).abs() < 1e-9, "{source} -> {target}: {e0} != {e1}");
            }

            let back = converted.change_vartype(source);
            for (v, h) in m.linear() {
                assert!((back.get_linear(v).unwrap() - h).abs() < 1e-9);
            }
        }
    }
}
