//! Backcasting initialisation of the pre-sample states.
//!
//! The leading `maxlag` rows of the state history are unknown. Each cycle
//! runs the filter forward through the data and the transition alone over
//! `maxlag` extra trailing rows, then runs the filter backward (reading
//! `i + lag` instead of `i - lag`) down to row 0. The last cycle only sweeps
//! forward, so the returned fit is consistent with the refined leading rows.

use nalgebra::DMatrix;

use crate::error::Result;
use crate::filter::{filter_step, propagate_step, FilterOutput, Sweep};
use crate::state_space::StateSpaceModel;

/// Number of forward/backward cycles. Fixed, no convergence check.
pub const BACKCAST_CYCLES: usize = 4;

/// Filter with backcast pre-sample states.
///
/// Returns the fit of the final forward sweep. The returned history has the
/// same row count as `states`.
#[tracing::instrument(skip_all, fields(obs = observed.len(), maxlag = ss.maxlag()))]
pub fn fit_backcast(
    ss: &StateSpaceModel,
    states: &DMatrix<f64>,
    observed: &[f64],
) -> Result<FilterOutput> {
    let n = observed.len();
    ss.check_history(states, n)?;
    ss.check_periods(n)?;

    let maxlag = ss.maxlag();
    let k = ss.k_states();
    let obs_all = n + maxlag;
    let obs_all_new = obs_all + maxlag;

    let mut work = states
        .view((0, 0), (obs_all, k))
        .clone_owned()
        .resize_vertically(obs_all_new, 0.0);

    let mut fitted = vec![0.0; n];
    let mut residuals = vec![0.0; n];
    let mut substitutions = 0;

    for cycle in 0..BACKCAST_CYCLES {
        for i in maxlag..obs_all {
            let t = i - maxlag;
            let (f, e, subs) = filter_step(ss, &mut work, i, t, observed[t], Sweep::Forward);
            fitted[t] = f;
            residuals[t] = e;
            substitutions += subs;
        }
        for i in obs_all..obs_all_new {
            substitutions += propagate_step(ss, &mut work, i, Sweep::Forward);
        }

        if cycle + 1 < BACKCAST_CYCLES {
            for i in (maxlag..obs_all).rev() {
                let t = i - maxlag;
                let (f, e, subs) = filter_step(ss, &mut work, i, t, observed[t], Sweep::Backward);
                fitted[t] = f;
                residuals[t] = e;
                substitutions += subs;
            }
            for i in (0..maxlag).rev() {
                substitutions += propagate_step(ss, &mut work, i, Sweep::Backward);
            }
        }

        tracing::debug!(cycle, substitutions, "backcast cycle complete");
    }

    let mut out_states = states.clone();
    out_states
        .view_mut((0, 0), (obs_all, k))
        .copy_from(&work.view((0, 0), (obs_all, k)));

    Ok(FilterOutput {
        states: out_states,
        fitted,
        residuals,
        exog_coefs: ss.exog_coefs.clone(),
        substitutions,
    })
}
