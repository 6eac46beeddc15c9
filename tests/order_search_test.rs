// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Integration tests for the order searches.
//!
//! The d-separation oracle gives exact ground truth; simulated data with the
//! BIC score checks the behaviour on noisy scores.

mod common;

use causal_search::context::MemorySink;
use causal_search::knowledge::Knowledge;
use causal_search::search::{Method, OrderSearch};
use causal_search::{SearchContext, SearchParameters};
use strum::IntoEnumIterator;

const CHAIN: [&str; 5] = ["A", "B", "C", "D", "E"];

/// Scores from every `Score = ...` trace line, in order.
fn traced_scores(lines: &[String]) -> Vec<f64> {
    lines
        .iter()
        .filter_map(|line| line.split("Score = ").nth(1))
        .filter_map(|rest| rest.split_whitespace().next())
        .filter_map(|s| s.parse().ok())
        .collect()
}

#[test]
fn test_boss_score_never_decreases() {
    let dag = common::chain(&CHAIN);
    for seed in 0..5 {
        let oracle = common::sem_bic(&common::simulate(&dag, 1000, seed));
        let params = SearchParameters {
            verbose: true,
            seed: Some(seed),
            ..Default::default()
        };
        let sink = MemorySink::new();
        let mut ctx = SearchContext::with_sink(Box::new(sink.clone()));
        OrderSearch::new(&oracle, &params)
            .unwrap()
            .search(&mut ctx)
            .unwrap();

        let scores = traced_scores(&sink.lines());
        assert!(scores.len() >= 3, "seed {seed}: {:?}", sink.lines());
        for pair in scores.windows(2) {
            assert!(pair[1] >= pair[0], "seed {seed}: {scores:?}");
        }
    }
}

#[test]
fn test_exact_methods_recover_diamond() {
    // A -> B, A -> C, B -> D, C -> D
    let dag = common::dag(
        &["A", "B", "C", "D"],
        &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")],
    );
    let oracle = common::dsep(&dag);
    for method in [Method::Sp, Method::Boss, Method::Gsp] {
        let params = SearchParameters {
            method,
            seed: Some(3),
            num_starts: 3,
            ..Default::default()
        };
        let cpdag = OrderSearch::new(&oracle, &params)
            .unwrap()
            .search(&mut SearchContext::new())
            .unwrap();
        assert_eq!(cpdag.num_edges(), 4, "{method}");
        assert!(cpdag.has_edge_str("A --- B"), "{method}");
        assert!(cpdag.has_edge_str("A --- C"), "{method}");
        assert!(cpdag.has_edge_str("B --> D"), "{method}");
        assert!(cpdag.has_edge_str("C --> D"), "{method}");
    }
}

#[test]
fn test_bic_graph_carries_score() {
    let dag = common::chain(&CHAIN);
    let oracle = common::sem_bic(&common::simulate(&dag, 500, 2));
    let params = SearchParameters {
        seed: Some(2),
        ..Default::default()
    };
    let search = OrderSearch::new(&oracle, &params).unwrap();
    let best = search.best_order(&mut SearchContext::new()).unwrap();
    let graph = search.graph(&best, true);
    assert_eq!(graph.attribute("BIC"), Some(best.score()));
}

#[test]
fn test_forbidden_edge_keeps_order() {
    let dag = common::chain(&CHAIN);
    let oracle = common::sem_bic(&common::simulate(&dag, 1000, 5));
    let mut knowledge = Knowledge::new();
    knowledge.add_forbidden("B", "A").unwrap();

    for method in Method::iter() {
        for seed in 0..4 {
            let params = SearchParameters {
                method,
                seed: Some(seed),
                num_starts: 2,
                ..Default::default()
            };
            let search = OrderSearch::new(&oracle, &params)
                .unwrap()
                .with_knowledge(&knowledge)
                .unwrap();
            let best = search.best_order(&mut SearchContext::new()).unwrap();
            assert!(
                best.index_of(0) < best.index_of(1),
                "{method} seed {seed}: {:?}",
                best.order()
            );
        }
    }
}

#[test]
fn test_contradictory_knowledge_rejected() {
    let dag = common::chain(&["A", "B", "C"]);
    let oracle = common::dsep(&dag);
    let mut knowledge = Knowledge::new();
    knowledge.add_required("A", "B").unwrap();
    knowledge.add_required("B", "C").unwrap();
    knowledge.add_required("C", "A").unwrap();
    let search = OrderSearch::new(&oracle, &SearchParameters::default()).unwrap();
    assert!(search.with_knowledge(&knowledge).is_err());
}

#[test]
fn test_invalid_parameters_rejected() {
    let dag = common::chain(&["A", "B"]);
    let oracle = common::dsep(&dag);
    let params = SearchParameters {
        depth: -2,
        ..Default::default()
    };
    assert!(OrderSearch::new(&oracle, &params).is_err());
}
