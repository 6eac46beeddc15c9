// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Search parameters.
//!
//! All options recognised by the searches live in one serde-loadable struct.
//! Unspecified fields take their defaults, so a JSON document only needs to
//! mention what it changes:
//!
//! ```
//! use causal_search::config::SearchParameters;
//! use causal_search::search::Method;
//!
//! let params = SearchParameters::from_json(r#"{ "method": "GSP", "num_starts": 3 }"#).unwrap();
//! assert_eq!(params.method, Method::Gsp);
//! assert_eq!(params.num_starts, 3);
//! assert_eq!(params.depth, -1);
//! ```

use crate::error::{Result, SearchError};
use crate::search::Method;
use serde::{Deserialize, Serialize};

/// Options shared by the order searches, skeleton search and orientation.
///
/// Integer bounds use `-1` for "unlimited", matching the conventions of the
/// published algorithms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParameters {
    /// Significance level for independence tests.
    pub alpha: f64,
    /// Conditioning-set bound for adjacency search and for the scorer's
    /// parent selection, triangle depth for BOSS.
    pub depth: i32,
    /// Degree bound for sepset searches.
    pub max_degree: i32,
    /// Use Zhang's complete rule set (R5-R10) in FCI orientation.
    pub complete_rule_set_used: bool,
    /// Maximum discriminating path length.
    pub max_path_length: i32,
    /// Number of randomized restarts for order search.
    pub num_starts: usize,
    /// Cache local scores and parent sets per run.
    pub caching_scores: bool,
    /// Emit a progress trace through the context's sink.
    pub verbose: bool,
    /// Order search method.
    pub method: Method,
    /// Bound on covered-edge reversal depth for GSP.
    pub gsp_depth: i32,
    /// Keep the data order for the first restart instead of shuffling it.
    pub first_run_use_data_order: bool,
    /// Seed for restart shuffles. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            alpha: 0.01,
            depth: -1,
            max_degree: -1,
            complete_rule_set_used: true,
            max_path_length: -1,
            num_starts: 1,
            caching_scores: true,
            verbose: false,
            method: Method::Boss,
            gsp_depth: -1,
            first_run_use_data_order: false,
            seed: None,
        }
    }
}

impl SearchParameters {
    /// Parse parameters from JSON and validate them.
    pub fn from_json(json: &str) -> Result<Self> {
        let params: SearchParameters = serde_json::from_str(json)
            .map_err(|e| SearchError::config(format!("cannot parse parameters: {e}")))?;
        params.validate()?;
        Ok(params)
    }

    /// Check every field against its documented range.
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(SearchError::config(format!(
                "alpha must be in (0, 1): {}",
                self.alpha
            )));
        }
        check_bound("depth", self.depth)?;
        check_bound("max_degree", self.max_degree)?;
        check_bound("max_path_length", self.max_path_length)?;
        check_bound("gsp_depth", self.gsp_depth)?;
        if self.num_starts < 1 {
            return Err(SearchError::config("num_starts must be >= 1"));
        }
        Ok(())
    }
}

/// Validate an integer bound where `-1` means unlimited.
pub fn check_bound(name: &str, value: i32) -> Result<()> {
    if value < -1 {
        Err(SearchError::config(format!(
            "{name} must be -1 (unlimited) or >= 0: {value}"
        )))
    } else {
        Ok(())
    }
}

/// Convert a `-1`-means-unlimited bound to an optional limit.
pub fn bound_to_limit(value: i32) -> Option<usize> {
    usize::try_from(value).ok()
}
