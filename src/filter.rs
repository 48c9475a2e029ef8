use nalgebra::{DMatrix, DVector};

use crate::error::Result;
use crate::state_space::StateSpaceModel;

/// Output of a filter or backcast pass.
#[derive(Debug, Clone)]
pub struct FilterOutput {
    /// Updated state history, same row count as the input history.
    pub states: DMatrix<f64>,
    /// One-step fitted values, one per observation.
    pub fitted: Vec<f64>,
    /// One-step residuals y_t - fitted_t.
    pub residuals: Vec<f64>,
    /// Exogenous coefficients the pass was run with.
    pub exog_coefs: DMatrix<f64>,
    /// Number of non-finite state entries replaced by a neighbouring value.
    pub substitutions: usize,
}

impl FilterOutput {
    /// The `maxlag` state rows following the last observation, i.e. the seed
    /// for forecasting beyond the sample.
    pub fn final_seed(&self, maxlag: usize) -> DMatrix<f64> {
        let n = self.fitted.len();
        self.states
            .view((n, 0), (maxlag, self.states.ncols()))
            .clone_owned()
    }
}

/// Direction of a sweep through the state history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sweep {
    Forward,
    Backward,
}

/// Run one pass of the recursion over all observations.
///
/// For rows i in [maxlag, maxlag + n), with t = i - maxlag:
///   fitted_t   = w_t' a_i + x_t' b_t
///   e_t        = y_t - fitted_t
///   states[i]  = F a_i + (g / v_t) e_t
///
/// Non-finite entries of a new state row are replaced by the same component
/// of the previous row. Rows past maxlag + n are left untouched.
pub fn fit(ss: &StateSpaceModel, states: &DMatrix<f64>, observed: &[f64]) -> Result<FilterOutput> {
    let n = observed.len();
    ss.check_history(states, n)?;
    ss.check_periods(n)?;

    let maxlag = ss.maxlag();
    let mut states = states.clone();
    let mut fitted = vec![0.0; n];
    let mut residuals = vec![0.0; n];
    let mut substitutions = 0;

    for i in maxlag..maxlag + n {
        let t = i - maxlag;
        let (f, e, subs) = filter_step(ss, &mut states, i, t, observed[t], Sweep::Forward);
        fitted[t] = f;
        residuals[t] = e;
        substitutions += subs;
    }

    if substitutions > 0 {
        tracing::debug!(substitutions, "non-finite states held at previous value");
    }

    Ok(FilterOutput {
        states,
        fitted,
        residuals,
        exog_coefs: ss.exog_coefs.clone(),
        substitutions,
    })
}

/// Observation-driven update of row `i` for period `t`.
///
/// Returns `(fitted, residual, substitutions)`.
#[inline]
pub(crate) fn filter_step(
    ss: &StateSpaceModel,
    states: &mut DMatrix<f64>,
    i: usize,
    t: usize,
    y_t: f64,
    sweep: Sweep,
) -> (f64, f64, usize) {
    let a = lagged(ss, states, i, sweep);
    let fitted = ss.measure(t, &a);
    let residual = y_t - fitted;
    let next = &ss.transition * &a + ss.scaled_persistence(t) * residual;
    let subs = write_row(states, i, &next, sweep);
    (fitted, residual, subs)
}

/// Transition-only update of row `i` (no observation).
#[inline]
pub(crate) fn propagate_step(
    ss: &StateSpaceModel,
    states: &mut DMatrix<f64>,
    i: usize,
    sweep: Sweep,
) -> usize {
    let a = lagged(ss, states, i, sweep);
    let next = &ss.transition * &a;
    write_row(states, i, &next, sweep)
}

#[inline]
fn lagged(ss: &StateSpaceModel, states: &DMatrix<f64>, i: usize, sweep: Sweep) -> DVector<f64> {
    match sweep {
        Sweep::Forward => ss.lags.gather(states, i),
        Sweep::Backward => ss.lags.gather_backward(states, i),
    }
}

/// Store `row` at row `i`, holding the neighbouring value (previous row on a
/// forward sweep, next row on a backward sweep) for non-finite entries.
fn write_row(states: &mut DMatrix<f64>, i: usize, row: &DVector<f64>, sweep: Sweep) -> usize {
    let neighbour = match sweep {
        Sweep::Forward => i - 1,
        Sweep::Backward => i + 1,
    };
    let mut substituted = 0;
    for k in 0..row.len() {
        if row[k].is_finite() {
            states[(i, k)] = row[k];
        } else {
            states[(i, k)] = states[(neighbour, k)];
            substituted += 1;
        }
    }
    substituted
}
