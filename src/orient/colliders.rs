// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Unshielded collider orientation.
//!
//! For each unshielded triple `x --- y --- z` (`x`, `z` not adjacent) the
//! triple is classified as a collider, a non-collider, or ambiguous, and
//! colliders are oriented `x --> y <-- z`.
//!
//! | method | classification |
//! |---|---|
//! | `SEPSETS` | collider iff `y` is outside the recorded sepset of `x, z` |
//! | `CPC`, `MPC` | search every sepset among adjacents: collider if none contains `y`, non-collider if all do, else ambiguous |
//! | `MAX_P` | collider iff `y` is outside the sepset with the largest p-value |
//!
//! When a collider meets an arrowhead already placed by an earlier collider
//! the [`ConflictRule`] decides the outcome.

use crate::context::{Counter, SearchContext};
use crate::error::{Result, SearchError};
use crate::graph::{Endpoint, Graph, NodeSet, TripleType};
use crate::knowledge::KnowledgeIndex;
use crate::oracle::Oracle;
use crate::skeleton::{Combinations, SepsetMap};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};
use tracing::debug;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ColliderMethod {
    #[default]
    Sepsets,
    Cpc,
    MaxP,
    Mpc,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictRule {
    /// The later collider wins.
    #[default]
    Overwrite,
    /// Opposing arrowheads make the edge `<->`.
    Bidirected,
    /// The earlier orientation wins.
    Priority,
}

#[derive(Debug, Clone)]
pub struct OrientColliders<'a> {
    oracle: &'a Oracle,
    sepsets: Option<&'a SepsetMap>,
    method: ColliderMethod,
    conflict_rule: ConflictRule,
    knowledge: KnowledgeIndex,
    depth: Option<usize>,
}

impl<'a> OrientColliders<'a> {
    /// Classification by a recorded sepset map.
    pub fn from_sepsets(oracle: &'a Oracle, sepsets: &'a SepsetMap) -> Self {
        Self {
            oracle,
            sepsets: Some(sepsets),
            method: ColliderMethod::Sepsets,
            conflict_rule: ConflictRule::Overwrite,
            knowledge: KnowledgeIndex::empty(oracle.num_variables()),
            depth: None,
        }
    }

    /// Classification by fresh independence tests. `Sepsets` needs a map and
    /// is rejected here.
    pub fn new(oracle: &'a Oracle, method: ColliderMethod) -> Result<Self> {
        if method == ColliderMethod::Sepsets {
            return Err(SearchError::config(
                "the SEPSETS collider method needs a sepset map",
            ));
        }
        Ok(Self {
            oracle,
            sepsets: None,
            method,
            conflict_rule: ConflictRule::Overwrite,
            knowledge: KnowledgeIndex::empty(oracle.num_variables()),
            depth: None,
        })
    }

    pub fn with_conflict_rule(mut self, conflict_rule: ConflictRule) -> Self {
        self.conflict_rule = conflict_rule;
        self
    }

    pub fn with_knowledge(mut self, knowledge: KnowledgeIndex) -> Self {
        self.knowledge = knowledge;
        self
    }

    /// Bound on sepset size for the test-driven methods.
    pub fn with_depth(mut self, depth: Option<usize>) -> Self {
        self.depth = depth;
        self
    }

    pub fn method(&self) -> ColliderMethod {
        self.method
    }

    /// Classify and orient every unshielded triple. Returns the number of
    /// colliders oriented.
    pub fn orient_triples(&self, graph: &mut Graph, ctx: &mut SearchContext) -> usize {
        let mut triples = Vec::new();
        for y in 0..graph.num_nodes() {
            let adjacent = graph.adjacent_nodes(y);
            for (i, &x) in adjacent.iter().enumerate() {
                for &z in &adjacent[i + 1..] {
                    if !graph.is_adjacent(x, z) {
                        triples.push((x, y, z));
                    }
                }
            }
        }
        let mut colliders = 0;
        for (x, y, z) in triples {
            if self.orient_triple(graph, x, y, z, ctx) == TripleType::Collider {
                colliders += 1;
            }
        }
        debug!(colliders, method = %self.method, "collider orientation done");
        colliders
    }

    /// Classify one unshielded triple and mark the graph accordingly.
    pub fn orient_triple(
        &self,
        graph: &mut Graph,
        x: usize,
        y: usize,
        z: usize,
        ctx: &mut SearchContext,
    ) -> TripleType {
        let kind = self.classify(graph, x, y, z, ctx);
        match kind {
            TripleType::Collider => {
                if self.orient_collider(graph, x, y, z) {
                    ctx.trace(format_args!(
                        "Collider: {} --> {} <-- {}",
                        graph.name(x),
                        graph.name(y),
                        graph.name(z)
                    ));
                }
            }
            TripleType::NonCollider => {
                if self.method != ColliderMethod::Sepsets {
                    graph.add_underline_triple(x, y, z);
                }
            }
            TripleType::Ambiguous => {
                graph.add_ambiguous_triple(x, y, z);
                ctx.trace(format_args!(
                    "Ambiguous: {} --- {} --- {}",
                    graph.name(x),
                    graph.name(y),
                    graph.name(z)
                ));
            }
        }
        kind
    }

    /// Classify one unshielded triple without marking the graph.
    pub fn classify(
        &self,
        graph: &Graph,
        x: usize,
        y: usize,
        z: usize,
        ctx: &mut SearchContext,
    ) -> TripleType {
        match self.method {
            ColliderMethod::Sepsets => match self.sepsets.and_then(|map| map.get(x, z)) {
                Some(sepset) if sepset.contains(y) => TripleType::NonCollider,
                Some(_) => TripleType::Collider,
                None => TripleType::Ambiguous,
            },
            ColliderMethod::Cpc | ColliderMethod::Mpc => {
                let found = self.find_sepsets(graph, x, z, ctx);
                if found.is_empty() {
                    return TripleType::Ambiguous;
                }
                let containing = found.iter().filter(|(s, _)| s.contains(y)).count();
                if containing == 0 {
                    TripleType::Collider
                } else if containing == found.len() {
                    TripleType::NonCollider
                } else {
                    TripleType::Ambiguous
                }
            }
            ColliderMethod::MaxP => {
                let found = self.find_sepsets(graph, x, z, ctx);
                let mut best: Option<(&NodeSet, f64)> = None;
                for (sepset, p) in &found {
                    let p = if p.is_nan() { f64::NEG_INFINITY } else { *p };
                    if best.map_or(true, |(_, b)| p > b) {
                        best = Some((sepset, p));
                    }
                }
                match best {
                    Some((sepset, _)) if sepset.contains(y) => TripleType::NonCollider,
                    Some(_) => TripleType::Collider,
                    None => TripleType::Ambiguous,
                }
            }
        }
    }

    /// Every subset of the adjacents of `x` (then `z`) that separates them,
    /// with its p-value.
    fn find_sepsets(
        &self,
        graph: &Graph,
        x: usize,
        z: usize,
        ctx: &mut SearchContext,
    ) -> Vec<(NodeSet, f64)> {
        let mut found: Vec<(NodeSet, f64)> = Vec::new();
        for (u, v) in [(x, z), (z, x)] {
            let adjacent: Vec<usize> = graph
                .adjacent_nodes(u)
                .into_iter()
                .filter(|&w| w != v)
                .collect();
            let max = self.depth.unwrap_or(adjacent.len()).min(adjacent.len());
            for size in 0..=max {
                for subset in Combinations::new(&adjacent, size) {
                    if found.iter().any(|(s, _)| *s == subset) {
                        continue;
                    }
                    ctx.count(Counter::IndependenceTests);
                    let result = self.oracle.test(x, z, &subset);
                    if result.independent {
                        found.push((subset, result.p_value));
                    }
                }
            }
        }
        found
    }

    /// Put arrowheads at `y` on both edges, resolving conflicts with earlier
    /// arrowheads at `x` or `z`.
    fn orient_collider(&self, graph: &mut Graph, x: usize, y: usize, z: usize) -> bool {
        if !self.knowledge.allows_directed(x, y) || !self.knowledge.allows_directed(z, y) {
            return false;
        }
        match self.conflict_rule {
            ConflictRule::Overwrite => {
                graph.set_directed(x, y);
                graph.set_directed(z, y);
            }
            ConflictRule::Bidirected => {
                for a in [x, z] {
                    if graph.endpoint(y, a) == Some(Endpoint::Arrow) {
                        graph.set_endpoint(a, y, Endpoint::Arrow);
                    } else {
                        graph.set_directed(a, y);
                    }
                }
            }
            ConflictRule::Priority => {
                if graph.endpoint(y, x) == Some(Endpoint::Arrow)
                    || graph.endpoint(y, z) == Some(Endpoint::Arrow)
                {
                    return false;
                }
                graph.set_directed(x, y);
                graph.set_directed(z, y);
            }
        }
        true
    }
}
