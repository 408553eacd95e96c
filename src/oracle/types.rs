//! The penalty-model oracle contract.

use crate::bqm::EnergyModel;
use crate::csp::Vartype;
use std::collections::BTreeSet;

/// An undirected graph on which a penalty model may place biases.
///
/// Linear biases may sit on any node; quadratic biases only on edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    nodes: Vec<String>,
    edges: Vec<(String, String)>,
}

impl Graph {
    /// Creates a graph from explicit nodes and edges.
    pub fn new(nodes: Vec<String>, edges: Vec<(String, String)>) -> Self {
        Self { nodes, edges }
    }

    /// The complete graph on `nodes`, edges listed in node order.
    pub fn complete(nodes: Vec<String>) -> Self {
        let mut edges = Vec::with_capacity(nodes.len() * nodes.len().saturating_sub(1) / 2);
        for (i, u) in nodes.iter().enumerate() {
            for v in &nodes[i + 1..] {
                edges.push((u.clone(), v.clone()));
            }
        }
        Self { nodes, edges }
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn edges(&self) -> &[(String, String)] {
        &self.edges
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, node: &str) -> bool {
        self.nodes.iter().any(|n| n == node)
    }
}

/// A request to the oracle: realize `feasible_configurations` over
/// `decision_variables` as a quadratic model on `graph`.
///
/// Graph nodes that are not decision variables are auxiliaries; a
/// decision configuration's energy is the minimum over their values.
#[derive(Debug, Clone, Copy)]
pub struct Specification<'a> {
    pub graph: &'a Graph,
    pub decision_variables: &'a [String],
    pub feasible_configurations: &'a BTreeSet<Vec<i8>>,
    pub vartype: Vartype,
    pub min_classical_gap: f64,
}

/// A quadratic model realizing a constraint, with its verified gap.
#[derive(Debug, Clone, PartialEq)]
pub struct Realization {
    /// The penalty model, in the requested vartype, over graph nodes only.
    pub model: EnergyModel,
    /// Smallest energy difference between the ground level (shared by all
    /// feasible configurations) and any infeasible configuration.
    pub classical_gap: f64,
}

/// The oracle's answer for one graph.
#[derive(Debug, Clone, PartialEq)]
pub enum OracleOutcome {
    /// A realization exists on the graph.
    Realized(Realization),
    /// No realization with the requested gap exists (or was found) on the graph.
    Unrealizable,
}

impl OracleOutcome {
    /// Whether a realization was returned.
    pub fn is_realized(&self) -> bool {
        matches!(self, OracleOutcome::Realized(_))
    }
}

/// Source of quadratic realizations for constraints the closed forms do
/// not cover.
///
/// Implementors may wrap an external optimization solver (MIP, LP, SAT) or
/// a search of their own. An oracle should be deterministic in whether a
/// realization exists for a given request; which realization it returns may
/// vary.
///
/// Closures `Fn(&Specification) -> OracleOutcome` are oracles too.
pub trait PenaltyOracle: Send + Sync {
    /// Attempts to realize the specification on its graph.
    fn realize(&self, spec: &Specification<'_>) -> OracleOutcome;
}

impl<F> PenaltyOracle for F
where
    F: Fn(&Specification<'_>) -> OracleOutcome + Send + Sync,
{
    fn realize(&self, spec: &Specification<'_>) -> OracleOutcome {
        self(spec)
    }
}

/// An oracle that never realizes anything.
///
/// Useful when a CSP should compile with closed forms alone: any constraint
/// that needs the oracle then fails as unrealizable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOracle;

impl PenaltyOracle for NoOracle {
    fn realize(&self, _spec: &Specification<'_>) -> OracleOutcome {
        OracleOutcome::Unrealizable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(ns: &[&str]) -> Vec<String> {
        ns.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_complete_graph() {
        let g = Graph::complete(names(&["a", "b", "c", "aux0"]));
        assert_eq!(g.num_nodes(), 4);
        assert_eq!(g.edges().len(), 6);
        assert_eq!(g.edges()[0], ("a".to_string(), "b".to_string()));
        assert!(g.contains("aux0"));
        assert!(!g.contains("aux1"));
    }

    #[test]
    fn test_complete_graph_small() {
        assert!(Graph::complete(Vec::new()).edges().is_empty());
        assert!(Graph::complete(names(&["a"])).edges().is_empty());
    }

    #[test]
    fn test_closure_and_no_oracle() {
        let graph = Graph::complete(names(&["a"]));
        let decision = names(&["a"]);
        let feasible: BTreeSet<Vec<i8>> = [vec![1]].into();
        let spec = Specification {
            graph: &graph,
            decision_variables: &decision,
            feasible_configurations: &feasible,
            vartype: Vartype::Spin,
            min_classical_gap: 2.0,
        };

        assert_eq!(NoOracle.realize(&spec), OracleOutcome::Unrealizable);

        let always = |spec: &Specification<'_>| {
            let mut model = EnergyModel::empty(spec.vartype);
            model.add_variable("a", -1.0);
            OracleOutcome::Realized(Realization {
                model,
                classical_gap: 2.0,
            })
        };
        assert!(always.realize(&spec).is_realized());
    }
}
