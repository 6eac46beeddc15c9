// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Scores and independence tests.
//!
//! Every search talks to the data through an [`Oracle`], a closed set of
//! variants dispatched by `match`:
//!
//! | variant | kind | data |
//! |---|---|---|
//! | [`Oracle::SemBic`] | score | covariance |
//! | [`Oracle::ZhangShen`] | score | covariance |
//! | [`Oracle::FisherZ`] | test | covariance |
//! | [`Oracle::ChiSquare`] | test | discrete |
//! | [`Oracle::ConditionalGaussian`] | test | mixed |
//! | [`Oracle::DegenerateGaussian`] | test | mixed |
//! | [`Oracle::DSeparation`] | test | a known DAG |
//!
//! Local scores are pure functions of `(node, parents)`; higher is better.
//! Scores also answer independence questions: `x ⊥ y | z` holds unless adding
//! `x` to the parents `z` of `y` strictly improves the local score of `y`.
//!
//! Tests do not provide local scores. A numerical failure inside a test (a
//! singular covariance block, too few rows) reports *independence* with a NaN
//! p-value and logs a warning. This keeps a search running but can hide a
//! real dependence.
//!
//! ```
//! use causal_search::graph::{continuous_variables, Graph, NodeSet};
//! use causal_search::oracle::{DSeparationTest, Oracle};
//!
//! let mut dag = Graph::new(continuous_variables(&["A", "B", "C"]));
//! dag.add_directed_edge(0, 1).unwrap();
//! dag.add_directed_edge(1, 2).unwrap();
//! let oracle = Oracle::from(DSeparationTest::new(dag).unwrap());
//! assert!(!oracle.is_independent(0, 2, &NodeSet::new()));
//! assert!(oracle.is_independent(0, 2, &NodeSet::singleton(1)));
//! assert!(oracle.local_score(2, &NodeSet::new()).is_err());
//! ```

mod chi_square;
mod conditional_gaussian;
mod degenerate_gaussian;
mod dsep;
mod fisher_z;
pub(crate) mod linalg;
mod sem_bic;
mod zhang_shen;

pub use chi_square::ChiSquareTest;
pub use conditional_gaussian::ConditionalGaussianTest;
pub use degenerate_gaussian::DegenerateGaussianTest;
pub use dsep::DSeparationTest;
pub use fisher_z::FisherZTest;
pub use sem_bic::SemBicScore;
pub use zhang_shen::{zhang_shen_lambda, zhang_shen_p, ZhangShenBoundScore};

use crate::error::{Result, SearchError};
use crate::graph::{NodeSet, Variable};
use tracing::warn;

/// Outcome of one independence question.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestResult {
    pub independent: bool,
    /// NaN when the test failed open.
    pub p_value: f64,
    pub statistic: f64,
}

impl TestResult {
    /// Independence decided by `p > alpha`. A NaN p-value counts as
    /// independent.
    pub fn from_p_value(p_value: f64, statistic: f64, alpha: f64) -> Self {
        Self {
            independent: p_value.is_nan() || p_value > alpha,
            p_value,
            statistic,
        }
    }

    /// Report independence after a numerical failure.
    pub fn fail_open(test: &str, reason: &str) -> Self {
        warn!(test, reason, "independence test failed; assuming independence");
        Self {
            independent: true,
            p_value: f64::NAN,
            statistic: f64::NAN,
        }
    }
}

pub(crate) fn check_alpha(alpha: f64) -> Result<()> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(SearchError::config(format!("alpha must be in (0, 1): {alpha}")))
    }
}

#[derive(Debug, Clone)]
pub enum Oracle {
    SemBic(SemBicScore),
    ZhangShen(ZhangShenBoundScore),
    FisherZ(FisherZTest),
    ChiSquare(ChiSquareTest),
    ConditionalGaussian(ConditionalGaussianTest),
    DegenerateGaussian(DegenerateGaussianTest),
    DSeparation(DSeparationTest),
}

impl Oracle {
    pub fn name(&self) -> &'static str {
        match self {
            Oracle::SemBic(_) => "SEM BIC",
            Oracle::ZhangShen(_) => "Zhang-Shen bound",
            Oracle::FisherZ(_) => "Fisher Z",
            Oracle::ChiSquare(_) => "chi-square",
            Oracle::ConditionalGaussian(_) => "conditional Gaussian",
            Oracle::DegenerateGaussian(_) => "degenerate Gaussian",
            Oracle::DSeparation(_) => "d-separation",
        }
    }

    pub fn variables(&self) -> &[Variable] {
        match self {
            Oracle::SemBic(s) => s.covariance().variables(),
            Oracle::ZhangShen(s) => s.covariance().variables(),
            Oracle::FisherZ(t) => t.covariance().variables(),
            Oracle::ChiSquare(t) => t.data().variables(),
            Oracle::ConditionalGaussian(t) => t.data().variables(),
            Oracle::DegenerateGaussian(t) => t.variables(),
            Oracle::DSeparation(t) => t.variables(),
        }
    }

    pub fn num_variables(&self) -> usize {
        self.variables().len()
    }

    /// Whether the oracle provides local scores.
    pub fn is_score(&self) -> bool {
        matches!(self, Oracle::SemBic(_) | Oracle::ZhangShen(_))
    }

    /// Significance level of a test; `None` for scores.
    pub fn alpha(&self) -> Option<f64> {
        match self {
            Oracle::SemBic(_) | Oracle::ZhangShen(_) | Oracle::DSeparation(_) => None,
            Oracle::FisherZ(t) => Some(t.alpha()),
            Oracle::ChiSquare(t) => Some(t.alpha()),
            Oracle::ConditionalGaussian(t) => Some(t.alpha()),
            Oracle::DegenerateGaussian(t) => Some(t.alpha()),
        }
    }

    /// Local score of `node` given `parents`; `Unsupported` for tests.
    pub fn local_score(&self, node: usize, parents: &NodeSet) -> Result<f64> {
        match self {
            Oracle::SemBic(s) => Ok(s.local_score(node, parents)),
            Oracle::ZhangShen(s) => Ok(s.local_score(node, parents)),
            _ => Err(SearchError::Unsupported(format!(
                "{} is a test and has no local score",
                self.name()
            ))),
        }
    }

    pub fn test(&self, x: usize, y: usize, z: &NodeSet) -> TestResult {
        match self {
            Oracle::SemBic(s) => score_test(s.local_score(y, &z.with(x)), s.local_score(y, z)),
            Oracle::ZhangShen(s) => {
                score_test(s.local_score(y, &z.with(x)), s.local_score(y, z))
            }
            Oracle::FisherZ(t) => t.test(x, y, z),
            Oracle::ChiSquare(t) => t.test(x, y, z),
            Oracle::ConditionalGaussian(t) => t.test(x, y, z),
            Oracle::DegenerateGaussian(t) => t.test(x, y, z),
            Oracle::DSeparation(t) => t.test(x, y, z),
        }
    }

    pub fn is_independent(&self, x: usize, y: usize, z: &NodeSet) -> bool {
        self.test(x, y, z).independent
    }
}

/// Independence unless the larger model strictly improves the score.
fn score_test(with_x: f64, without_x: f64) -> TestResult {
    let bump = with_x - without_x;
    let independent = !(bump > 0.0);
    TestResult {
        independent,
        p_value: if independent { 1.0 } else { 0.0 },
        statistic: bump,
    }
}

impl From<SemBicScore> for Oracle {
    fn from(s: SemBicScore) -> Self {
        Oracle::SemBic(s)
    }
}

impl From<ZhangShenBoundScore> for Oracle {
    fn from(s: ZhangShenBoundScore) -> Self {
        Oracle::ZhangShen(s)
    }
}

impl From<FisherZTest> for Oracle {
    fn from(t: FisherZTest) -> Self {
        Oracle::FisherZ(t)
    }
}

impl From<ChiSquareTest> for Oracle {
    fn from(t: ChiSquareTest) -> Self {
        Oracle::ChiSquare(t)
    }
}

impl From<ConditionalGaussianTest> for Oracle {
    fn from(t: ConditionalGaussianTest) -> Self {
        Oracle::ConditionalGaussian(t)
    }
}

impl From<DegenerateGaussianTest> for Oracle {
    fn from(t: DegenerateGaussianTest) -> Self {
        Oracle::DegenerateGaussian(t)
    }
}

impl From<DSeparationTest> for Oracle {
    fn from(t: DSeparationTest) -> Self {
        Oracle::DSeparation(t)
    }
}
