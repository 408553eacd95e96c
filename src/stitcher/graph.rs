//! Auxiliary labels and candidate graphs for the growth search.

use crate::oracle::Graph;
use std::collections::HashSet;

/// Mints auxiliary variable labels `{prefix}0`, `{prefix}1`, ...
///
/// One factory lives for a whole stitching run, so labels are never reused
/// across constraints. Labels already taken by CSP variables are skipped.
#[derive(Debug, Clone)]
pub(crate) struct AuxFactory {
    prefix: String,
    counter: usize,
    reserved: HashSet<String>,
    minted: usize,
}

impl AuxFactory {
    pub fn new<'a>(prefix: &str, reserved: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            prefix: prefix.to_string(),
            counter: 0,
            reserved: reserved.into_iter().map(str::to_string).collect(),
            minted: 0,
        }
    }

    pub fn mint(&mut self) -> String {
        loop {
            let label = format!("{}{}", self.prefix, self.counter);
            self.counter += 1;
            if !self.reserved.contains(&label) {
                self.minted += 1;
                return label;
            }
        }
    }

    /// Number of labels handed out so far.
    pub fn minted(&self) -> usize {
        self.minted
    }
}

/// Complete graphs on the decision variables, growing by one freshly minted
/// auxiliary node per step. Unbounded; callers limit it with `take`.
pub(crate) struct CompleteGraphs<'f> {
    nodes: Vec<String>,
    factory: &'f mut AuxFactory,
    started: bool,
}

impl<'f> CompleteGraphs<'f> {
    pub fn new(variables: &[String], factory: &'f mut AuxFactory) -> Self {
        Self {
            nodes: variables.to_vec(),
            factory,
            started: false,
        }
    }
}

impl Iterator for CompleteGraphs<'_> {
    type Item = Graph;

    fn next(&mut self) -> Option<Graph> {
        if self.started {
            self.nodes.push(self.factory.mint());
        }
        self.started = true;
        Some(Graph::complete(self.nodes.clone()))
    }
}
