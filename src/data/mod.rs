// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Input data: tabular data sets, covariance matrices, and simulation.

pub mod covariance;
pub mod dataset;
pub mod simulate;

pub use covariance::{sample_covariance, CovarianceMatrix};
pub use dataset::DataSet;
pub use simulate::LinearSemSimulation;
