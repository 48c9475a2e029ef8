//! Scalar losses for parameter estimation.
//!
//! The one-step losses (MSE, MAE, half-absolute-moment) reuse the filter
//! residuals. The multi-step losses (GV, TLV, TV, hsteps) evaluate the
//! rolling-origin error matrix first.

use nalgebra::DMatrix;

use crate::backcast::fit_backcast;
use crate::error::{Result, SsoeError};
use crate::filter::{fit, FilterOutput};
use crate::rolling::{rolling_errors, ErrorMatrix};
use crate::state_space::StateSpaceModel;
use crate::types::{CostConfig, LossKind};

/// Iteration cap for the symmetric eigen-decomposition in the GV loss.
const EIGEN_MAX_ITER: usize = 1000;

/// Fit the model (plain filter or backcast) and reduce it to a scalar loss.
#[tracing::instrument(
    skip_all,
    fields(loss = config.loss.as_str(), horizon = config.horizon, backcast = config.backcast)
)]
pub fn cost(
    ss: &StateSpaceModel,
    states: &DMatrix<f64>,
    observed: &[f64],
    config: &CostConfig,
) -> Result<f64> {
    validate(observed.len(), config)?;
    let out = if config.backcast {
        fit_backcast(ss, states, observed)?
    } else {
        fit(ss, states, observed)?
    };
    cost_from_fit(ss, &out, observed, config)
}

/// Loss of an existing filter output.
pub fn cost_from_fit(
    ss: &StateSpaceModel,
    out: &FilterOutput,
    observed: &[f64],
    config: &CostConfig,
) -> Result<f64> {
    validate(observed.len(), config)?;

    if !config.loss.is_multistep() {
        return Ok(one_step_loss(config.loss, &out.residuals));
    }

    let errors = rolling_errors(ss, &out.states, observed, config.horizon)?;
    let value = match config.loss {
        LossKind::GeneralizedVariance => generalized_variance(&errors, config.normalizer),
        LossKind::TraceLogVariance => trace_log_variance(&errors),
        LossKind::TraceVariance => trace_variance(&errors),
        _ => h_steps(&errors),
    };
    Ok(value)
}

fn validate(n: usize, config: &CostConfig) -> Result<()> {
    if n == 0 {
        return Err(SsoeError::DataError("observed series is empty".into()));
    }
    if config.loss.is_multistep() && (config.horizon == 0 || config.horizon > n) {
        return Err(SsoeError::InvalidHorizon {
            horizon: config.horizon,
            obs: n,
        });
    }
    if config.loss == LossKind::GeneralizedVariance
        && (!config.normalizer.is_finite() || config.normalizer == 0.0)
    {
        return Err(SsoeError::InvalidNormalizer(config.normalizer));
    }
    Ok(())
}

/// MSE, MAE or mean sqrt(|e|) of the one-step residuals.
pub fn one_step_loss(loss: LossKind, residuals: &[f64]) -> f64 {
    let n = residuals.len() as f64;
    match loss {
        LossKind::Mse => residuals.iter().map(|e| e * e).sum::<f64>() / n,
        LossKind::Mae => residuals.iter().map(|e| e.abs()).sum::<f64>() / n,
        _ => residuals.iter().map(|e| e.abs().sqrt()).sum::<f64>() / n,
    }
}

/// Generalised variance of the complete rows of the error matrix:
///
///   ln det((E/n)'(E/n) / m) + h ln(n^2)
///
/// with m = obs - h + 1 complete rows.
pub fn generalized_variance(errors: &ErrorMatrix, normalizer: f64) -> f64 {
    let h = errors.horizon();
    let m = errors.nrows() - h + 1;
    let e = errors.leading_rows(m) / normalizer;
    let sigma = e.transpose() * &e / m as f64;
    log_determinant(&sigma, EIGEN_MAX_ITER) + h as f64 * (normalizer * normalizer).ln()
}

/// Log of the product of eigenvalues, falling back to the determinant when
/// the decomposition fails.
fn log_determinant(sigma: &DMatrix<f64>, max_iter: usize) -> f64 {
    match log_det_eigen(sigma, max_iter) {
        Ok(v) => v,
        Err(err) => {
            tracing::warn!(%err, "using direct determinant");
            sigma.determinant().ln()
        }
    }
}

fn log_det_eigen(sigma: &DMatrix<f64>, max_iter: usize) -> Result<f64> {
    let eigen = sigma
        .clone()
        .try_symmetric_eigen(f64::EPSILON, max_iter)
        .ok_or(SsoeError::EigenDecompositionFailed)?;
    if eigen.eigenvalues.iter().any(|v| !v.is_finite()) {
        return Err(SsoeError::EigenDecompositionFailed);
    }
    Ok(eigen.eigenvalues.product().ln())
}

/// Mean squared error of step `h + 1` over the origins where it is observed.
fn column_mse(errors: &ErrorMatrix, h: usize) -> f64 {
    let (sum, count) = errors
        .valid_column(h)
        .fold((0.0, 0usize), |(s, c), e| (s + e * e, c + 1));
    sum / count as f64
}

/// Sum over horizons of ln(MSE_h).
pub fn trace_log_variance(errors: &ErrorMatrix) -> f64 {
    (0..errors.horizon()).map(|h| column_mse(errors, h).ln()).sum()
}

/// Sum over horizons of MSE_h.
pub fn trace_variance(errors: &ErrorMatrix) -> f64 {
    (0..errors.horizon()).map(|h| column_mse(errors, h)).sum()
}

/// MSE at the largest horizon.
pub fn h_steps(errors: &ErrorMatrix) -> f64 {
    column_mse(errors, errors.horizon() - 1)
}
