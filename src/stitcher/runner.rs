//! Stitching execution loop.

use super::closed_form::{closed_form, zero_model, CLOSED_FORM_GAP};
use super::config::StitchConfig;
use super::graph::{AuxFactory, CompleteGraphs};
use crate::bqm::EnergyModel;
use crate::csp::{Constraint, Csp};
use crate::error::{Error, Result};
use crate::oracle::{LatticeOracle, OracleOutcome, PenaltyOracle, Specification};
use tracing::{debug, trace, warn};

const EPS: f64 = 1e-9;

/// Compiles constraint satisfaction problems into energy models.
///
/// Each constraint becomes a local fragment:
///
/// 1. Zero-variable constraints are skipped.
/// 2. Constraints satisfied by every configuration contribute nothing.
/// 3. One- and two-variable constraints use closed forms when the requested
///    gap is at most 2.
/// 4. Everything else goes to the oracle on complete graphs of growing size,
///    adding one auxiliary variable per step up to `max_graph_size` nodes.
///
/// Fragments are summed. A configuration violating any constraint sits at
/// least `min_classical_gap` above the ground energy, which is reached
/// exactly at the CSP's solutions (minimizing over auxiliaries).
///
/// # Examples
///
/// ```
/// use u_stitch::csp::{Csp, ConstraintSource, Vartype};
/// use u_stitch::oracle::NoOracle;
/// use u_stitch::stitcher::{StitchConfig, Stitcher};
///
/// let mut csp = Csp::new(Vartype::Spin);
/// csp.add_constraint(ConstraintSource::predicate(|x| x[0] == x[1], ["a", "b"])).unwrap();
///
/// let model = Stitcher::new(NoOracle, StitchConfig::default()).stitch(&csp).unwrap();
/// assert_eq!(model.get_quadratic("a", "b"), Some(-1.0));
/// ```
#[derive(Debug, Clone)]
pub struct Stitcher<O> {
    oracle: O,
    config: StitchConfig,
}

impl<O: PenaltyOracle> Stitcher<O> {
    pub fn new(oracle: O, config: StitchConfig) -> Self {
        Self { oracle, config }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn config(&self) -> &StitchConfig {
        &self.config
    }

    /// Compiles `csp`. Fails on the first constraint that cannot be realized;
    /// no partial model is returned.
    pub fn stitch(&self, csp: &Csp) -> Result<EnergyModel> {
        stitch_with(csp, &self.oracle, &self.config)
    }
}

/// Compiles `csp` with the bundled [`LatticeOracle`].
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use u_stitch::csp::{Csp, ConstraintSource, Vartype};
///
/// let mut csp = Csp::new(Vartype::Binary);
/// csp.add_constraint(ConstraintSource::predicate(|x| x[0] == x[1], ["a", "b"])).unwrap();
/// csp.add_constraint(ConstraintSource::predicate(|x| x[0] != x[1], ["b", "c"])).unwrap();
///
/// let model = u_stitch::stitch(&csp, 2.0, 8).unwrap();
/// let sat: HashMap<String, i8> = [("a".into(), 0), ("b".into(), 0), ("c".into(), 1)].into();
/// let bad: HashMap<String, i8> = [("a".into(), 1), ("b".into(), 0), ("c".into(), 0)].into();
/// assert_eq!(model.energy(&sat).unwrap(), 0.0);
/// assert!(model.energy(&bad).unwrap() >= 2.0);
/// ```
pub fn stitch(csp: &Csp, min_classical_gap: f64, max_graph_size: usize) -> Result<EnergyModel> {
    let config = StitchConfig::default()
        .with_min_classical_gap(min_classical_gap)
        .with_max_graph_size(max_graph_size);
    stitch_with(csp, &LatticeOracle::default(), &config)
}

/// Compiles `csp` with any oracle, including unsized ones.
pub fn stitch_with<O>(csp: &Csp, oracle: &O, config: &StitchConfig) -> Result<EnergyModel>
where
    O: PenaltyOracle + ?Sized,
{
    config.validate()?;

    let mut factory = AuxFactory::new(&config.aux_prefix, csp.variables());
    let mut model = EnergyModel::empty(csp.vartype());
    for v in csp.variables() {
        model.add_variable(v, 0.0);
    }

    for constraint in csp.constraints() {
        if constraint.is_empty() {
            trace!(constraint = constraint.name(), "skipping vacuous constraint");
            continue;
        }
        let fragment = fragment(constraint, oracle, config, &mut factory)?;
        model.merge(&fragment)?;
    }

    debug!(
        constraints = csp.len(),
        variables = model.num_variables(),
        auxiliaries = factory.minted(),
        interactions = model.num_interactions(),
        "stitching finished"
    );
    Ok(model)
}

fn fragment<O>(
    constraint: &Constraint,
    oracle: &O,
    config: &StitchConfig,
    factory: &mut AuxFactory,
) -> Result<EnergyModel>
where
    O: PenaltyOracle + ?Sized,
{
    let n = constraint.len();
    if n > config.max_graph_size {
        warn!(
            constraint = constraint.name(),
            num_variables = n,
            max_graph_size = config.max_graph_size,
            "constraint does not fit in max_graph_size"
        );
        return Err(unrealizable(constraint, n, config));
    }

    if constraint.is_trivial() {
        debug!(constraint = constraint.name(), "trivial constraint");
        return Ok(zero_model(constraint));
    }

    if config.min_classical_gap <= CLOSED_FORM_GAP + EPS {
        if let Some(model) = closed_form(constraint)? {
            debug!(constraint = constraint.name(), num_variables = n, "closed form");
            return Ok(model);
        }
    }

    debug!(
        constraint = constraint.name(),
        num_variables = n,
        min_classical_gap = config.min_classical_gap,
        "searching penalty model"
    );

    let mut attempted = n;
    let candidates = CompleteGraphs::new(constraint.variables(), factory);
    for graph in candidates.take(config.max_graph_size - n + 1) {
        attempted = graph.num_nodes();
        trace!(constraint = constraint.name(), nodes = attempted, "trying candidate graph");

        let spec = Specification {
            graph: &graph,
            decision_variables: constraint.variables(),
            feasible_configurations: constraint.configurations(),
            vartype: constraint.vartype(),
            min_classical_gap: config.min_classical_gap,
        };

        match oracle.realize(&spec) {
            OracleOutcome::Realized(r) if r.classical_gap >= config.min_classical_gap - EPS => {
                debug!(
                    constraint = constraint.name(),
                    nodes = attempted,
                    classical_gap = r.classical_gap,
                    "penalty model found"
                );
                return Ok(r.model.change_vartype(constraint.vartype()));
            }
            OracleOutcome::Realized(r) => {
                trace!(
                    constraint = constraint.name(),
                    classical_gap = r.classical_gap,
                    "gap too small, growing graph"
                );
            }
            OracleOutcome::Unrealizable => {}
        }
    }

    warn!(
        constraint = constraint.name(),
        attempted_graph_size = attempted,
        max_graph_size = config.max_graph_size,
        "no penalty model found"
    );
    Err(unrealizable(constraint, attempted, config))
}

fn unrealizable(constraint: &Constraint, attempted: usize, config: &StitchConfig) -> Error {
    Error::UnrealizableConstraint {
        constraint: constraint.name().to_string(),
        num_variables: constraint.len(),
        attempted_graph_size: attempted,
        max_graph_size: config.max_graph_size,
    }
}
