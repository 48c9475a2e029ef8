use nalgebra::DMatrix;

use crate::error::{Result, SsoeError};
use crate::state_space::StateSpaceModel;

/// H-step ahead point forecasts from `maxlag` seed rows.
///
/// Pure state propagation with no residual feedback and no non-finite
/// substitution:
///   y_hat_h = w_h' a_h + x_h' b_h
///   x_h     = F a_h
///
/// The measurement and exogenous rows of `ss` are read for periods `0..steps`
/// (or broadcast when they have a single row), so for out-of-sample forecasts
/// they must describe the forecast period.
pub fn forecast(ss: &StateSpaceModel, seed: &DMatrix<f64>, steps: usize) -> Result<Vec<f64>> {
    let maxlag = ss.maxlag();
    if seed.nrows() < maxlag {
        return Err(SsoeError::InsufficientHistory {
            rows: seed.nrows(),
            needed: maxlag,
        });
    }
    if seed.ncols() != ss.k_states() {
        return Err(SsoeError::DimensionMismatch {
            what: "seed columns",
            expected: ss.k_states(),
            got: seed.ncols(),
        });
    }
    if steps == 0 {
        return Ok(vec![]);
    }
    for (what, m) in [
        ("measurement rows", &ss.measurement),
        ("exog rows", &ss.exog),
        ("exog coefficient rows", &ss.exog_coefs),
    ] {
        if m.nrows() != 1 && m.nrows() < steps {
            return Err(SsoeError::DimensionMismatch {
                what,
                expected: steps,
                got: m.nrows(),
            });
        }
    }

    Ok(forecast_window(ss, seed, 0, 0, steps))
}

/// Forecast `steps` periods seeded with `seed` rows `[seed_start, seed_start + maxlag)`,
/// reading measurement/exogenous rows from period `first_period`.
pub(crate) fn forecast_window(
    ss: &StateSpaceModel,
    seed: &DMatrix<f64>,
    seed_start: usize,
    first_period: usize,
    steps: usize,
) -> Vec<f64> {
    let maxlag = ss.maxlag();
    let k = ss.k_states();

    let mut buffer = DMatrix::zeros(maxlag + steps, k);
    buffer
        .view_mut((0, 0), (maxlag, k))
        .copy_from(&seed.view((seed_start, 0), (maxlag, k)));

    let mut out = Vec::with_capacity(steps);
    for i in maxlag..maxlag + steps {
        let a = ss.lags.gather(&buffer, i);
        out.push(ss.measure(first_period + i - maxlag, &a));
        let next = &ss.transition * &a;
        for j in 0..k {
            buffer[(i, j)] = next[j];
        }
    }
    out
}
