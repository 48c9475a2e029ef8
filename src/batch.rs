//! Rayon-based parallel evaluation.
//!
//! Every task clones its own state history, so independent parameter trials
//! and independent series can run on the work-stealing pool side by side.

use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::backcast::fit_backcast;
use crate::cost::cost;
use crate::error::Result;
use crate::filter::{fit, FilterOutput};
use crate::state_space::StateSpaceModel;
use crate::types::CostConfig;

/// Evaluate the cost of several candidate models on one series in parallel.
///
/// `models[i]` is the model built from the i-th parameter trial.
pub fn batch_cost(
    models: &[StateSpaceModel],
    states: &DMatrix<f64>,
    observed: &[f64],
    config: &CostConfig,
) -> Vec<Result<f64>> {
    models
        .par_iter()
        .map(|ss| cost(ss, states, observed, config))
        .collect()
}

/// Filter several series that share one model in parallel.
///
/// `seed` holds the `maxlag` pre-sample state rows used for every series.
pub fn batch_fit(
    ss: &StateSpaceModel,
    series: &[Vec<f64>],
    seed: &DMatrix<f64>,
    backcast: bool,
) -> Vec<Result<FilterOutput>> {
    series
        .par_iter()
        .map(|y| {
            let history = ss.initial_history(seed, y.len())?;
            if backcast {
                fit_backcast(ss, &history, y)
            } else {
                fit(ss, &history, y)
            }
        })
        .collect()
}
