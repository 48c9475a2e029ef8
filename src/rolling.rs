use nalgebra::DMatrix;

use crate::error::{Result, SsoeError};
use crate::forecast::forecast_window;
use crate::state_space::StateSpaceModel;

/// Sentinel for horizons that run past the end of the sample.
pub const MISSING: f64 = f64::NAN;

/// Rolling-origin forecast errors, `obs × horizon`.
///
/// Row `t` holds the 1..=h step errors of forecasts made from origin `t`.
/// Rows `0..=obs - horizon` are complete; later rows are ragged and padded
/// with [`MISSING`].
#[derive(Debug, Clone)]
pub struct ErrorMatrix {
    errors: DMatrix<f64>,
}

impl ErrorMatrix {
    pub fn nrows(&self) -> usize {
        self.errors.nrows()
    }

    pub fn horizon(&self) -> usize {
        self.errors.ncols()
    }

    /// Error at `row` for step `h + 1`, or `None` past the end of the sample.
    pub fn get(&self, row: usize, h: usize) -> Option<f64> {
        let e = self.errors[(row, h)];
        if e.is_nan() {
            None
        } else {
            Some(e)
        }
    }

    /// Number of rows with every horizon populated.
    pub fn complete_rows(&self) -> usize {
        self.errors
            .row_iter()
            .filter(|r| r.iter().all(|e| !e.is_nan()))
            .count()
    }

    /// Errors of step `h + 1` from the origins where it is observable
    /// (the first `obs - h` rows).
    pub fn valid_column(&self, h: usize) -> impl Iterator<Item = f64> + '_ {
        let n = self.nrows().saturating_sub(h);
        (0..n).map(move |r| self.errors[(r, h)])
    }

    /// The first `n` rows as a dense matrix.
    pub fn leading_rows(&self, n: usize) -> DMatrix<f64> {
        self.errors.view((0, 0), (n, self.horizon())).clone_owned()
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.errors
    }

    pub fn into_inner(self) -> DMatrix<f64> {
        self.errors
    }
}

/// Forecast from every origin of a filtered state history and collect the
/// errors against the observed series.
///
/// For origin rows i in [maxlag, maxlag + obs), the forecast is seeded with
/// state rows [i - maxlag, i) and runs min(horizon, obs + maxlag - i) steps.
#[tracing::instrument(skip_all, fields(obs = observed.len(), horizon = horizon))]
pub fn rolling_errors(
    ss: &StateSpaceModel,
    states: &DMatrix<f64>,
    observed: &[f64],
    horizon: usize,
) -> Result<ErrorMatrix> {
    let n = observed.len();
    if horizon == 0 {
        return Err(SsoeError::InvalidHorizon { horizon, obs: n });
    }
    ss.check_history(states, n)?;
    ss.check_periods(n)?;

    let maxlag = ss.maxlag();
    let mut errors = DMatrix::from_element(n, horizon, MISSING);

    for i in maxlag..n + maxlag {
        let origin = i - maxlag;
        let hh = horizon.min(n + maxlag - i);
        let f = forecast_window(ss, states, origin, origin, hh);
        for (h, y_hat) in f.iter().enumerate() {
            errors[(origin, h)] = observed[origin + h] - y_hat;
        }
    }

    Ok(ErrorMatrix { errors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::fit;
    use crate::test_support::{
        assert_close, ar1, case_history, case_model, load_fixtures, matrix_of, vec_of,
    };

    fn ar1_series(n: usize) -> Vec<f64> {
        let mut y = Vec::with_capacity(n);
        let mut prev = 0.0;
        for t in 0..n {
            prev = 0.6 * prev + ((t * 37 % 17) as f64 / 17.0 - 0.5);
            y.push(prev);
        }
        y
    }

    #[test]
    fn test_horizon_one_reproduces_filter_residuals() {
        let fixtures = load_fixtures();
        let case = &fixtures["seasonal_exog"];
        let ss = case_model(case);
        let y = vec_of(&case["data"]);
        let out = fit(&ss, &case_history(case, &ss), &y).unwrap();

        let errors = rolling_errors(&ss, &out.states, &y, 1).unwrap();
        let col: Vec<f64> = errors.valid_column(0).collect();
        assert_close(&col, &out.residuals, 1e-12, "one-step errors");
        assert_eq!(errors.complete_rows(), y.len());
    }

    #[test]
    fn test_seasonal_exog_matches_reference() {
        let fixtures = load_fixtures();
        let case = &fixtures["seasonal_exog"];
        let ss = case_model(case);
        let y = vec_of(&case["data"]);
        let horizon = case["horizon"].as_u64().unwrap() as usize;
        let out = fit(&ss, &case_history(case, &ss), &y).unwrap();

        let errors = rolling_errors(&ss, &out.states, &y, horizon).unwrap();
        let expected = matrix_of(&case["rolling_errors"]);

        for r in 0..y.len() {
            for h in 0..horizon {
                match errors.get(r, h) {
                    Some(e) => assert!(
                        (e - expected[(r, h)]).abs() < 1e-9,
                        "error[{}, {}]: got {}, expected {}",
                        r,
                        h,
                        e,
                        expected[(r, h)]
                    ),
                    None => assert!(expected[(r, h)].is_nan(), "unexpected gap at [{}, {}]", r, h),
                }
            }
        }
    }

    #[test]
    fn test_ragged_tail() {
        let ss = ar1(0.6, 0.4);
        let y = ar1_series(30);
        let horizon = 5;
        let out = fit(&ss, &DMatrix::zeros(31, 1), &y).unwrap();

        let errors = rolling_errors(&ss, &out.states, &y, horizon).unwrap();

        assert_eq!(errors.nrows(), 30);
        assert_eq!(errors.horizon(), 5);
        assert_eq!(errors.complete_rows(), 30 - horizon + 1);
        for r in (30 - horizon + 1)..30 {
            let populated = (0..horizon).filter(|&h| errors.get(r, h).is_some()).count();
            assert_eq!(populated, 30 - r, "row {}", r);
        }
        for h in 0..horizon {
            assert_eq!(errors.valid_column(h).count(), 30 - h);
            assert!(errors.valid_column(h).all(|e| e.is_finite()));
        }
        assert!(errors.leading_rows(26).iter().all(|e| e.is_finite()));
    }

    #[test]
    fn test_multi_step_errors_use_pure_propagation() {
        // AR(1) forecasts from origin t are phi^h * state[t] for h = 0, 1, ...
        let phi = 0.6;
        let ss = ar1(phi, 0.4);
        let y = ar1_series(12);
        let out = fit(&ss, &DMatrix::zeros(13, 1), &y).unwrap();
        let errors = rolling_errors(&ss, &out.states, &y, 3).unwrap();

        for t in 0..10 {
            for h in 0..3 {
                let expected = y[t + h] - phi.powi(h as i32) * out.states[(t, 0)];
                let got = errors.get(t, h).unwrap();
                assert!((got - expected).abs() < 1e-12, "[{}, {}]", t, h);
            }
        }
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let ss = ar1(0.6, 0.4);
        assert!(matches!(
            rolling_errors(&ss, &DMatrix::zeros(4, 1), &[1.0, 2.0, 3.0], 0),
            Err(SsoeError::InvalidHorizon { .. })
        ));
    }
}
