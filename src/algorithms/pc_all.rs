// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The PC family in one search.
//!
//! The skeleton comes from [`Fas`]; the pattern is then rebuilt from the
//! skeleton by the pipeline `E`:
//!
//! 1. drop every orientation and triple mark;
//! 2. apply background knowledge;
//! 3. classify and orient unshielded triples with the configured
//!    [`ColliderMethod`];
//! 4. close under Meek's rules;
//! 5. drop the non-collider marks, and the ambiguous marks the orientation
//!    has settled.
//!
//! The `MPC` method first runs `CPC`, then removes pairs of edges `a <-- c -->
//! b` that a separating set of `a, b` shows to be spurious.
//!
//! The optional Markov loop alternates two repairs until neither changes the
//! graph, for at most ten rounds: add an edge `x --- y` when `x` is dependent
//! on `y` given the boundary of `y`, and drop an edge when the endpoints
//! satisfy the local Markov condition without it.

use crate::config::{bound_to_limit, SearchParameters};
use crate::context::{Counter, SearchContext};
use crate::error::{Result, SearchError};
use crate::graph::{Endpoint, Graph, NodeSet, TripleType};
use crate::knowledge::{Knowledge, KnowledgeIndex};
use crate::oracle::Oracle;
use crate::orient::{pc_orient_bk, ColliderMethod, ConflictRule, MeekRules, OrientColliders};
use crate::skeleton::{subsets_up_to, Fas, FasType, SepsetMap};
use tracing::{debug, info};

/// Rounds of the Markov loop before the latest graph is returned as is.
pub const MAX_MARKOV_ROUNDS: usize = 10;

#[derive(Debug, Clone)]
pub struct PcAll<'a> {
    oracle: &'a Oracle,
    knowledge: KnowledgeIndex,
    initial: Option<Graph>,
    fas_type: FasType,
    collider_method: ColliderMethod,
    conflict_rule: ConflictRule,
    depth: Option<usize>,
    markov_loop: bool,
    verbose: bool,
}

impl<'a> PcAll<'a> {
    /// Uses `depth` and `verbose` from the parameters.
    pub fn new(oracle: &'a Oracle, params: &SearchParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            oracle,
            knowledge: KnowledgeIndex::empty(oracle.num_variables()),
            initial: None,
            fas_type: FasType::Regular,
            collider_method: ColliderMethod::Sepsets,
            conflict_rule: ConflictRule::Overwrite,
            depth: bound_to_limit(params.depth),
            markov_loop: false,
            verbose: params.verbose,
        })
    }

    pub fn with_knowledge(mut self, knowledge: &Knowledge) -> Result<Self> {
        self.knowledge = knowledge.bind(self.oracle.variables())?;
        Ok(self)
    }

    pub fn with_initial_graph(mut self, graph: Graph) -> Self {
        self.initial = Some(graph);
        self
    }

    pub fn with_fas_type(mut self, fas_type: FasType) -> Self {
        self.fas_type = fas_type;
        self
    }

    pub fn with_collider_method(mut self, method: ColliderMethod) -> Self {
        self.collider_method = method;
        self
    }

    pub fn with_conflict_rule(mut self, conflict_rule: ConflictRule) -> Self {
        self.conflict_rule = conflict_rule;
        self
    }

    pub fn with_markov_loop(mut self, markov_loop: bool) -> Self {
        self.markov_loop = markov_loop;
        self
    }

    /// The pattern, after the Markov loop when enabled.
    pub fn search(&self, ctx: &mut SearchContext) -> Result<Graph> {
        if self.markov_loop && self.collider_method == ColliderMethod::Sepsets {
            return Err(SearchError::config(
                "the Markov loop needs a test-driven collider method, not SEPSETS",
            ));
        }
        if self.verbose {
            ctx.set_verbose(true);
        }
        info!(method = %self.collider_method, "starting PC search");

        let mut graph = if self.collider_method == ColliderMethod::Mpc {
            self.kpartial(ctx)?
        } else {
            let (skeleton, sepsets) = self.adjacencies(ctx)?;
            self.pattern(&skeleton, self.collider_method, &sepsets, ctx)?
        };

        if self.markov_loop {
            graph = self.markov_loop(graph, ctx)?;
        }
        debug!(edges = graph.num_edges(), "PC search finished");
        Ok(graph)
    }

    fn adjacencies(&self, ctx: &mut SearchContext) -> Result<(Graph, SepsetMap)> {
        let mut fas = Fas::new(self.oracle)
            .with_knowledge(self.knowledge.clone())?
            .with_depth(self.depth)
            .with_type(self.fas_type);
        if let Some(initial) = &self.initial {
            fas = fas.with_initial_graph(initial.clone())?;
        }
        fas.search(ctx)
    }

    fn colliders<'s>(
        &self,
        method: ColliderMethod,
        sepsets: &'s SepsetMap,
    ) -> Result<OrientColliders<'s>>
    where
        'a: 's,
    {
        let orient = if method == ColliderMethod::Sepsets {
            OrientColliders::from_sepsets(self.oracle, sepsets)
        } else {
            OrientColliders::new(self.oracle, method)?
        };
        Ok(orient
            .with_conflict_rule(self.conflict_rule)
            .with_knowledge(self.knowledge.clone())
            .with_depth(self.depth))
    }

    /// The pipeline `E`: rebuild the pattern from the adjacencies of `graph`.
    fn pattern(
        &self,
        graph: &Graph,
        method: ColliderMethod,
        sepsets: &SepsetMap,
        ctx: &mut SearchContext,
    ) -> Result<Graph> {
        let mut pattern = Graph::new(graph.variables().to_vec());
        for edge in graph.edges() {
            pattern.add_undirected_edge(edge.node1, edge.node2)?;
        }
        pc_orient_bk(&self.knowledge, &mut pattern);
        self.colliders(method, sepsets)?
            .orient_triples(&mut pattern, ctx);
        MeekRules::new(&self.knowledge).orient_implied(&mut pattern);
        remove_unnecessary_marks(&mut pattern);
        Ok(pattern)
    }

    /// CPC, then remove `a <-- c --> b` where a sepset `z` of `a, b` leaves
    /// `c` dependent on both.
    fn kpartial(&self, ctx: &mut SearchContext) -> Result<Graph> {
        let (skeleton, sepsets) = self.adjacencies(ctx)?;
        let mut graph = self.pattern(&skeleton, ColliderMethod::Cpc, &sepsets, ctx)?;
        let n = graph.num_nodes();
        let limit = self.depth.unwrap_or(n);
        for a in 0..n {
            for b in a + 1..n {
                let others: Vec<usize> = (0..n).filter(|&v| v != a && v != b).collect();
                for z in subsets_up_to(&others, limit) {
                    ctx.count(Counter::IndependenceTests);
                    if !self.oracle.is_independent(a, b, &z) {
                        continue;
                    }
                    let common: Vec<usize> = graph
                        .adjacent_nodes(a)
                        .into_iter()
                        .filter(|&c| graph.is_adjacent(b, c) && !z.contains(c))
                        .collect();
                    for c in common {
                        if !graph.is_parent_of(c, a) || !graph.is_parent_of(c, b) {
                            continue;
                        }
                        ctx.count(Counter::IndependenceTests);
                        if self.oracle.is_independent(a, c, &z) || self.oracle.is_independent(c, b, &z) {
                            continue;
                        }
                        ctx.trace(format_args!(
                            "Removing {} <-- {} --> {}",
                            graph.name(a),
                            graph.name(c),
                            graph.name(b)
                        ));
                        kpartial_remove_edge(&mut graph, c, a);
                        kpartial_remove_edge(&mut graph, c, b);
                    }
                }
            }
        }
        MeekRules::new(&self.knowledge).orient_implied(&mut graph);
        Ok(graph)
    }

    fn markov_loop(&self, mut graph: Graph, ctx: &mut SearchContext) -> Result<Graph> {
        let n = graph.num_nodes();
        let sepsets = SepsetMap::new();
        let method = match self.collider_method {
            ColliderMethod::Mpc => ColliderMethod::Cpc,
            method => method,
        };
        let mut changed = true;
        let mut round = 0;
        while changed && round < MAX_MARKOV_ROUNDS {
            round += 1;
            changed = false;
            ctx.trace(format_args!("Round = {round}"));

            for y in 0..n {
                for x in 0..n {
                    if x == y || graph.is_adjacent(x, y) {
                        continue;
                    }
                    if self.non_markov_contains(&graph, y, x, ctx) {
                        let mut h = graph.clone();
                        h.add_undirected_edge(x, y)?;
                        graph = self.pattern(&h, method, &sepsets, ctx)?;
                        changed = true;
                    }
                }
            }

            let orient = self.colliders(method, &sepsets)?;
            for edge in graph.edges() {
                let (x, y) = (edge.node1, edge.node2);
                let mut h = graph.clone();
                h.remove_edge(x, y);
                let common: Vec<usize> = h
                    .adjacent_nodes(x)
                    .into_iter()
                    .filter(|&z| h.is_adjacent(y, z))
                    .collect();
                for z in common {
                    if !h.is_def_collider(x, z, y)
                        && orient.classify(&h, x, z, y, ctx) == TripleType::Collider
                    {
                        h.set_directed(x, z);
                        h.set_directed(y, z);
                    }
                }
                if self.non_markov_empty(&h, y, ctx) && self.non_markov_empty(&h, x, ctx) {
                    graph = self.pattern(&h, method, &sepsets, ctx)?;
                    changed = true;
                }
            }
        }
        debug!(rounds = round, edges = graph.num_edges(), "Markov loop done");
        Ok(graph)
    }

    fn non_markov_contains(&self, graph: &Graph, y: usize, x: usize, ctx: &mut SearchContext) -> bool {
        let boundary = boundary(graph, y);
        if x == y || boundary.contains(x) || graph.descendants_of(y).contains(x) {
            return false;
        }
        ctx.count(Counter::IndependenceTests);
        !self.oracle.is_independent(y, x, &boundary)
    }

    fn non_markov_empty(&self, graph: &Graph, y: usize, ctx: &mut SearchContext) -> bool {
        let boundary = boundary(graph, y);
        let descendants = graph.descendants_of(y);
        (0..graph.num_nodes())
            .filter(|&x| x != y && !boundary.contains(x) && !descendants.contains(x))
            .all(|x| {
                ctx.count(Counter::IndependenceTests);
                self.oracle.is_independent(y, x, &boundary)
            })
    }
}

/// Undirected neighbours and parents.
fn boundary(graph: &Graph, node: usize) -> NodeSet {
    graph
        .adjacent_nodes(node)
        .into_iter()
        .filter(|&other| graph.is_undirected(node, other) || graph.is_parent_of(other, node))
        .collect()
}

fn kpartial_remove_edge(graph: &mut Graph, c: usize, a: usize) {
    if graph.is_parent_of(c, a) {
        graph.remove_edge(c, a);
    } else if graph.is_undirected(c, a) {
        graph.set_directed(a, c);
    }
}

/// Drop every underline; keep an ambiguous mark only while the orientation
/// around it is still open.
fn remove_unnecessary_marks(graph: &mut Graph) {
    let underlines: Vec<_> = graph.underline_triples().copied().collect();
    for t in underlines {
        graph.remove_underline_triple(t.x, t.y, t.z);
    }
    let ambiguous: Vec<_> = graph.ambiguous_triples().copied().collect();
    for t in ambiguous {
        let into = |from: usize, to: usize| {
            graph.endpoint(from, to) == Some(Endpoint::Arrow)
                && graph.endpoint(to, from) == Some(Endpoint::Tail)
        };
        let settled = into(t.y, t.x) || into(t.y, t.z) || (into(t.x, t.y) && into(t.z, t.y));
        if settled {
            graph.remove_ambiguous_triple(t.x, t.y, t.z);
        }
    }
}
