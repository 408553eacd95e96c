//! A self-contained penalty-model oracle searching a lattice of biases.

use super::anneal::anneal;
use super::config::LatticeConfig;
use super::types::{Graph, OracleOutcome, PenaltyOracle, Realization, Specification};
use crate::bqm::EnergyModel;
use crate::csp::Vartype;
use crate::error::{Error, Result};
use std::collections::HashSet;
use tracing::{debug, trace, warn};

/// Tolerance for energy comparisons.
pub(crate) const EPS: f64 = 1e-9;

/// Largest graph the oracle will enumerate states of.
const MAX_NODES: usize = 20;

/// Realizes constraints by searching SPIN biases on a finite lattice.
///
/// For every candidate bias assignment the oracle enumerates all states of
/// the graph, takes the minimum energy of each decision configuration over
/// the auxiliary nodes, and checks that
///
/// - every feasible configuration sits at the same ground energy, and
/// - every infeasible configuration sits at least `min_classical_gap` above it.
///
/// Lattices with at most [`LatticeConfig::exhaustive_limit`] points are
/// scanned completely and the realization with the largest gap is returned,
/// so `Unrealizable` is exact for them. Larger lattices are annealed and
/// `Unrealizable` only means nothing was found.
///
/// Returned models are shifted so the ground energy is 0 and converted to
/// the requested vartype.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use u_stitch::csp::Vartype;
/// use u_stitch::oracle::{Graph, LatticeOracle, PenaltyOracle, Specification};
///
/// let graph = Graph::complete(vec!["a".into(), "b".into()]);
/// let decision = vec!["a".to_string(), "b".to_string()];
/// let feasible: BTreeSet<Vec<i8>> = [vec![-1, -1], vec![1, 1]].into();
/// let spec = Specification {
///     graph: &graph,
///     decision_variables: &decision,
///     feasible_configurations: &feasible,
///     vartype: Vartype::Spin,
///     min_classical_gap: 2.0,
/// };
///
/// assert!(LatticeOracle::default().realize(&spec).is_realized());
/// ```
#[derive(Debug, Clone, Default)]
pub struct LatticeOracle {
    config: LatticeConfig,
}

impl LatticeOracle {
    /// Creates an oracle, validating the configuration.
    pub fn new(config: LatticeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LatticeConfig {
        &self.config
    }
}

impl PenaltyOracle for LatticeOracle {
    fn realize(&self, spec: &Specification<'_>) -> OracleOutcome {
        let lattice = match Lattice::new(spec, &self.config) {
            Ok(lattice) => lattice,
            Err(e) => {
                warn!(error = %e, "malformed oracle request");
                return OracleOutcome::Unrealizable;
            }
        };

        let points = lattice.num_points();
        let best = match points {
            Some(n) if n <= self.config.exhaustive_limit => {
                debug!(
                    nodes = spec.graph.num_nodes(),
                    points = n,
                    "scanning bias lattice"
                );
                lattice.scan()
            }
            _ => {
                debug!(
                    nodes = spec.graph.num_nodes(),
                    points = ?points,
                    "annealing bias lattice"
                );
                let result = anneal(&lattice, &self.config.anneal);
                trace!(
                    iterations = result.iterations,
                    accepted = result.accepted_moves,
                    improving = result.improving_moves,
                    best_cost = result.best_cost,
                    "annealing finished"
                );
                result.is_valid().then_some(result.best)
            }
        };

        let Some(digits) = best else {
            return OracleOutcome::Unrealizable;
        };

        let energies = lattice.energies(&digits);
        let eval = lattice.evaluate(&energies);
        if !eval.is_valid() || eval.gap < spec.min_classical_gap - EPS {
            return OracleOutcome::Unrealizable;
        }

        let model = lattice
            .model(spec.graph, &digits, eval.ground)
            .change_vartype(spec.vartype);
        OracleOutcome::Realized(Realization {
            model,
            classical_gap: eval.gap,
        })
    }
}

/// Quality of one lattice point.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Evaluation {
    /// Lowest energy over feasible decision configurations.
    pub ground: f64,
    /// Smallest excess of an infeasible configuration over `ground`.
    pub gap: f64,
    /// Feasible spread above ground plus infeasible shortfall below the
    /// requested gap. Zero for a valid realization.
    pub cost: f64,
}

impl Evaluation {
    pub fn is_valid(&self) -> bool {
        self.cost <= EPS
    }
}

/// A request compiled into state tables over a SPIN bias lattice.
///
/// Parameters are the graph's linear biases in node order followed by its
/// quadratic biases in edge order.
#[derive(Debug, Clone)]
pub(crate) struct Lattice {
    levels: Vec<usize>,
    lows: Vec<f64>,
    step: f64,
    /// `features[state][param]`: the spin product multiplying each bias.
    features: Vec<Vec<f64>>,
    /// Decision configuration index of each state.
    decision: Vec<usize>,
    feasible: Vec<bool>,
    edges: Vec<(usize, usize)>,
    min_gap: f64,
}

impl Lattice {
    pub fn new(spec: &Specification<'_>, config: &LatticeConfig) -> Result<Self> {
        let graph = spec.graph;
        let n = graph.num_nodes();
        if n > MAX_NODES {
            return Err(Error::InvalidConfig(format!(
                "graph has {n} nodes, at most {MAX_NODES} can be enumerated"
            )));
        }

        let index_of = |v: &str| -> Result<usize> {
            graph
                .nodes()
                .iter()
                .position(|node| node == v)
                .ok_or_else(|| Error::UnknownVariable {
                    variable: v.to_string(),
                    owner: "graph".to_string(),
                })
        };

        let mut seen = HashSet::new();
        for node in graph.nodes() {
            if !seen.insert(node.as_str()) {
                return Err(Error::DuplicateVariable(node.clone()));
            }
        }

        let mut edges = Vec::with_capacity(graph.edges().len());
        for (u, v) in graph.edges() {
            edges.push((index_of(u)?, index_of(v)?));
        }

        let mut positions = Vec::with_capacity(spec.decision_variables.len());
        let mut seen = HashSet::new();
        for v in spec.decision_variables {
            if !seen.insert(v.as_str()) {
                return Err(Error::DuplicateVariable(v.clone()));
            }
            positions.push(index_of(v)?);
        }

        let k = positions.len();
        for config in spec.feasible_configurations {
            if config.len() != k {
                return Err(Error::ArityMismatch {
                    configuration: config.clone(),
                    expected: k,
                    found: config.len(),
                });
            }
            if let Some(&value) = config.iter().find(|&&x| !spec.vartype.contains(x)) {
                return Err(Error::ValueOutOfDomain {
                    value,
                    vartype: spec.vartype,
                });
            }
        }
        if spec.feasible_configurations.is_empty() {
            return Err(Error::NoFeasibleConfiguration { num_variables: k });
        }

        let feasible = (0..1usize << k)
            .map(|d| {
                let config: Vec<i8> = (0..k)
                    .map(|i| spec.vartype.from_spin(spin(d, k, i)))
                    .collect();
                spec.feasible_configurations.contains(&config)
            })
            .collect();

        let mut features = Vec::with_capacity(1 << n);
        let mut decision = Vec::with_capacity(1 << n);
        for state in 0..1usize << n {
            let spins: Vec<f64> = (0..n).map(|i| f64::from(spin(state, n, i))).collect();
            let mut row = spins.clone();
            row.extend(edges.iter().map(|&(u, v)| spins[u] * spins[v]));
            features.push(row);

            let d = positions
                .iter()
                .fold(0usize, |acc, &p| (acc << 1) | usize::from(spins[p] > 0.0));
            decision.push(d);
        }

        let mut levels = vec![config.linear_levels(); n];
        levels.extend(std::iter::repeat_n(config.quadratic_levels(), edges.len()));
        let mut lows = vec![config.linear_range.0; n];
        lows.extend(std::iter::repeat_n(config.quadratic_range.0, edges.len()));

        Ok(Self {
            levels,
            lows,
            step: config.step,
            features,
            decision,
            feasible,
            edges,
            min_gap: spec.min_classical_gap,
        })
    }

    pub fn num_params(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[usize] {
        &self.levels
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Total number of lattice points, `None` on overflow.
    pub fn num_points(&self) -> Option<u64> {
        self.levels
            .iter()
            .try_fold(1u64, |acc, &n| acc.checked_mul(n as u64))
    }

    /// Bias values at the given digits.
    pub fn values(&self, digits: &[usize]) -> Vec<f64> {
        digits
            .iter()
            .zip(&self.lows)
            .map(|(&d, &low)| low + d as f64 * self.step)
            .collect()
    }

    /// Energy of every state at the given digits.
    pub fn energies(&self, digits: &[usize]) -> Vec<f64> {
        let mut energies = vec![0.0; self.features.len()];
        self.fill_energies(digits, &mut energies);
        energies
    }

    fn fill_energies(&self, digits: &[usize], energies: &mut [f64]) {
        let values = self.values(digits);
        for (energy, row) in energies.iter_mut().zip(&self.features) {
            *energy = row.iter().zip(&values).map(|(f, x)| f * x).sum();
        }
    }

    /// Adds `delta` to parameter `k` in a table of state energies.
    pub fn shift(&self, energies: &mut [f64], k: usize, delta: f64) {
        for (energy, row) in energies.iter_mut().zip(&self.features) {
            *energy += delta * row[k];
        }
    }

    pub fn evaluate(&self, energies: &[f64]) -> Evaluation {
        let mut e_min = vec![f64::INFINITY; self.feasible.len()];
        for (&d, &energy) in self.decision.iter().zip(energies) {
            if energy < e_min[d] {
                e_min[d] = energy;
            }
        }

        let ground = e_min
            .iter()
            .zip(&self.feasible)
            .filter(|(_, f)| **f)
            .map(|(e, _)| *e)
            .fold(f64::INFINITY, f64::min);

        let mut spread = 0.0;
        let mut shortfall = 0.0;
        let mut gap = f64::INFINITY;
        for (&e, &f) in e_min.iter().zip(&self.feasible) {
            if f {
                spread += e - ground;
            } else {
                gap = gap.min(e - ground);
                shortfall += (ground + self.min_gap - e).max(0.0);
            }
        }

        Evaluation {
            ground,
            gap,
            cost: spread + shortfall,
        }
    }

    /// Scans every lattice point, returning the valid point of largest gap
    /// (lowest index among ties).
    pub fn scan(&self) -> Option<Vec<usize>> {
        if self.levels.is_empty() {
            let eval = self.evaluate(&self.energies(&[]));
            return eval.is_valid().then(Vec::new);
        }

        #[cfg(feature = "parallel")]
        let best = {
            use rayon::prelude::*;
            (0..self.levels[0])
                .into_par_iter()
                .filter_map(|first| self.scan_slice(first))
                .reduce_with(better)
        };

        #[cfg(not(feature = "parallel"))]
        let best = (0..self.levels[0])
            .filter_map(|first| self.scan_slice(first))
            .reduce(better);

        best.map(|c| c.digits)
    }

    fn scan_slice(&self, first: usize) -> Option<Candidate> {
        let mut digits = vec![0usize; self.levels.len()];
        digits[0] = first;
        let mut energies = vec![0.0; self.features.len()];
        let mut best: Option<Candidate> = None;

        loop {
            self.fill_energies(&digits, &mut energies);
            let eval = self.evaluate(&energies);
            if eval.is_valid() && best.as_ref().is_none_or(|b| eval.gap > b.gap) {
                best = Some(Candidate {
                    digits: digits.clone(),
                    gap: eval.gap,
                });
            }
            if !advance(&mut digits[1..], &self.levels[1..]) {
                return best;
            }
        }
    }

    /// Builds the SPIN model at `digits`, shifted so the ground energy is 0.
    pub fn model(&self, graph: &Graph, digits: &[usize], ground: f64) -> EnergyModel {
        let values = self.values(digits);
        let n = graph.num_nodes();

        let mut model = EnergyModel::empty(Vartype::Spin);
        for (node, &h) in graph.nodes().iter().zip(&values) {
            model.add_variable(node.clone(), h);
        }
        for (&(u, v), &j) in self.edges.iter().zip(&values[n..]) {
            if j != 0.0 {
                model.add_interaction(graph.nodes()[u].clone(), graph.nodes()[v].clone(), j);
            }
        }
        model.add_offset(-ground);
        model
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    digits: Vec<usize>,
    gap: f64,
}

fn better(a: Candidate, b: Candidate) -> Candidate {
    if a.gap > b.gap || (a.gap == b.gap && a.digits <= b.digits) {
        a
    } else {
        b
    }
}

/// Odometer increment, last digit fastest. Returns false after wrapping.
fn advance(digits: &mut [usize], levels: &[usize]) -> bool {
    for k in (0..digits.len()).rev() {
        digits[k] += 1;
        if digits[k] < levels[k] {
            return true;
        }
        digits[k] = 0;
    }
    false
}

/// Spin of position `i` in an `n`-bit index, first position most significant.
fn spin(index: usize, n: usize, i: usize) -> i8 {
    if (index >> (n - 1 - i)) & 1 == 1 {
        1
    } else {
        -1
    }
}
