//! `argmin` adapter for the cost function selector.
//!
//! The caller owns the mapping from a flat parameter vector to a model; this
//! type only evaluates the loss so any derivative-free `argmin` solver can
//! drive it.

use argmin::core::CostFunction;
use nalgebra::DMatrix;

use crate::cost::cost;
use crate::error::Result;
use crate::state_space::StateSpaceModel;
use crate::types::CostConfig;

/// Cost reported for parameters the builder rejects or that give a
/// non-finite loss.
pub const PENALTY: f64 = f64::MAX / 2.0;

/// Loss of a fixed series as a function of the model parameters.
pub struct CostObjective<B> {
    build: B,
    states: DMatrix<f64>,
    observed: Vec<f64>,
    config: CostConfig,
}

impl<B> CostObjective<B>
where
    B: Fn(&[f64]) -> Result<StateSpaceModel>,
{
    /// `build` maps a parameter vector to the model's matrices; `states` is
    /// the initial state history reused by every evaluation.
    pub fn new(build: B, states: DMatrix<f64>, observed: Vec<f64>, config: CostConfig) -> Self {
        Self {
            build,
            states,
            observed,
            config,
        }
    }

    pub fn config(&self) -> &CostConfig {
        &self.config
    }

    /// Loss at `params`, with errors from the builder or the core propagated.
    pub fn evaluate(&self, params: &[f64]) -> Result<f64> {
        let ss = (self.build)(params)?;
        cost(&ss, &self.states, &self.observed, &self.config)
    }
}

impl<B> CostFunction for CostObjective<B>
where
    B: Fn(&[f64]) -> Result<StateSpaceModel>,
{
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Vec<f64>) -> std::result::Result<f64, argmin::core::Error> {
        match self.evaluate(param) {
            Ok(v) if v.is_finite() => Ok(v),
            Ok(v) => {
                tracing::trace!(value = v, "non-finite loss penalised");
                Ok(PENALTY)
            }
            Err(err) => {
                tracing::trace!(%err, "rejected parameters penalised");
                Ok(PENALTY)
            }
        }
    }
}
