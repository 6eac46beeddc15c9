// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Integration tests for the orientation pipelines and the composed
//! constraint searches.

mod common;

use causal_search::algorithms::{Bfci, Fci, PcAll};
use causal_search::graph::Graph;
use causal_search::knowledge::KnowledgeIndex;
use causal_search::oracle::{DSeparationTest, Oracle};
use causal_search::orient::{cpdag_from_dag, ColliderMethod, FciOrient};
use causal_search::search::Method;
use causal_search::skeleton::{Fas, FasType, SepsetMap};
use causal_search::{SearchContext, SearchParameters};

/// A -> C <- B, C -> D, D -> F <- E, B -> E
fn six_node_dag() -> Graph {
    common::dag(
        &["A", "B", "C", "D", "E", "F"],
        &[
            ("A", "C"),
            ("B", "C"),
            ("C", "D"),
            ("D", "F"),
            ("E", "F"),
            ("B", "E"),
        ],
    )
}

/// A -> B <- L -> C <- D, C -> E, with L hidden.
fn latent_oracle() -> Oracle {
    let dag = common::dag(
        &["A", "B", "L", "C", "D", "E"],
        &[("A", "B"), ("L", "B"), ("L", "C"), ("D", "C"), ("C", "E")],
    );
    DSeparationTest::with_observed(dag, &["A", "B", "C", "D", "E"])
        .unwrap()
        .into()
}

/// Same adjacencies and the same mark at both ends of every edge.
fn assert_same_marks(actual: &Graph, expected: &Graph) {
    assert_eq!(common::skeleton(actual), common::skeleton(expected));
    for edge in expected.edges() {
        let (a, b) = (edge.node1, edge.node2);
        assert_eq!(
            (actual.endpoint(a, b), actual.endpoint(b, a)),
            (expected.endpoint(a, b), expected.endpoint(b, a)),
            "edge {} - {}",
            expected.name(a),
            expected.name(b)
        );
    }
}

fn skeleton_and_sepsets(oracle: &Oracle) -> (Graph, SepsetMap) {
    Fas::new(oracle)
        .with_type(FasType::Stable)
        .search(&mut SearchContext::new())
        .unwrap()
}

#[test]
fn test_fci_orientation_is_idempotent() {
    let oracle = latent_oracle();
    let (skeleton, sepsets) = skeleton_and_sepsets(&oracle);
    let knowledge = KnowledgeIndex::empty(oracle.num_variables());

    for complete in [true, false] {
        let run = || {
            let mut graph = skeleton.clone();
            FciOrient::new(sepsets.clone(), knowledge.clone())
                .with_complete_rule_set(complete)
                .orient(&mut graph, &mut SearchContext::new())
                .unwrap();
            graph
        };
        let first = run();
        let second = run();
        assert_eq!(first, second);

        // The final rules are at a fixed point on their own output.
        let mut again = first.clone();
        FciOrient::new(sepsets.clone(), knowledge.clone())
            .with_complete_rule_set(complete)
            .do_final_orientation(&mut again, &mut SearchContext::new())
            .unwrap();
        assert_eq!(again, first);
    }
}

#[test]
fn test_fci_latent_pag() {
    let oracle = latent_oracle();
    let pag = Fci::new(&oracle, &SearchParameters::default())
        .unwrap()
        .search(&mut SearchContext::new())
        .unwrap();
    assert_eq!(pag.num_edges(), 4);
    assert!(pag.has_edge_str("A o-> B"));
    assert!(pag.has_edge_str("B <-> C"));
    assert!(pag.has_edge_str("D o-> C"));
    assert!(pag.has_edge_str("C --> E"));
}

#[test]
fn test_pc_collider_methods_agree_with_true_cpdag() {
    let dag = six_node_dag();
    let expected = cpdag_from_dag(&dag);
    let oracle = common::dsep(&dag);
    for method in [ColliderMethod::Sepsets, ColliderMethod::Cpc, ColliderMethod::MaxP] {
        for fas_type in [FasType::Regular, FasType::Stable] {
            let cpdag = PcAll::new(&oracle, &SearchParameters::default())
                .unwrap()
                .with_collider_method(method)
                .with_fas_type(fas_type)
                .search(&mut SearchContext::new())
                .unwrap();
            assert_same_marks(&cpdag, &expected);
        }
    }
}

#[test]
fn test_searches_are_deterministic() {
    let oracle = latent_oracle();
    let params = SearchParameters {
        seed: Some(17),
        num_starts: 2,
        ..Default::default()
    };
    let mut ctx = SearchContext::new();

    let pc = PcAll::new(&oracle, &params).unwrap();
    assert_eq!(pc.search(&mut ctx).unwrap(), pc.search(&mut ctx).unwrap());

    let fci = Fci::new(&oracle, &params).unwrap();
    assert_eq!(fci.search(&mut ctx).unwrap(), fci.search(&mut ctx).unwrap());

    let bfci = Bfci::new(&oracle, &params).unwrap();
    assert_eq!(bfci.search(&mut ctx).unwrap(), bfci.search(&mut ctx).unwrap());
}

#[test]
fn test_bfci_and_fci_agree_on_latent_pag() {
    let oracle = latent_oracle();
    let params = SearchParameters {
        method: Method::Sp,
        ..Default::default()
    };
    let fci = Fci::new(&oracle, &params)
        .unwrap()
        .search(&mut SearchContext::new())
        .unwrap();
    let bfci = Bfci::new(&oracle, &params)
        .unwrap()
        .search(&mut SearchContext::new())
        .unwrap();
    assert_same_marks(&bfci, &fci);
}
