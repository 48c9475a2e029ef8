use nalgebra::{DMatrix, DVector};

use crate::error::{Result, SsoeError};
use crate::lags::LagIndex;

/// Single-source-of-error state space with a lagged state structure.
///
/// Measurement:  y_t     = w_t' a_t + x_t' b_t + e_t
/// Transition:   x_t     = F a_t + (g / v_t) e_t
///
/// where `a_t` is the lagged state gathered through [`LagIndex`]. The
/// row-indexed inputs (`measurement`, `scale`, `exog`, `exog_coefs`) hold one
/// row per period, or a single row that is broadcast to every period.
#[derive(Debug, Clone)]
pub struct StateSpaceModel {
    pub transition: DMatrix<f64>,  // F: k × k
    pub measurement: DMatrix<f64>, // w: n × k or 1 × k
    pub persistence: DVector<f64>, // g: k
    pub scale: DMatrix<f64>,       // v: n × k or 1 × k
    pub exog: DMatrix<f64>,        // X: n × m or 1 × m (m may be 0)
    pub exog_coefs: DMatrix<f64>,  // B: n × m or 1 × m
    pub lags: LagIndex,
}

impl StateSpaceModel {
    /// Build a model without exogenous regressors.
    pub fn new(
        transition: DMatrix<f64>,
        measurement: DMatrix<f64>,
        persistence: DVector<f64>,
        scale: DMatrix<f64>,
        lags: &[usize],
    ) -> Result<Self> {
        let lags = LagIndex::new(lags)?;
        let k = lags.len();

        if transition.nrows() != k {
            return Err(SsoeError::DimensionMismatch {
                what: "transition rows",
                expected: k,
                got: transition.nrows(),
            });
        }
        check_cols("transition", &transition, k)?;
        check_cols("measurement", &measurement, k)?;
        check_cols("scale", &scale, k)?;
        if persistence.len() != k {
            return Err(SsoeError::DimensionMismatch {
                what: "persistence",
                expected: k,
                got: persistence.len(),
            });
        }

        Ok(Self {
            transition,
            measurement,
            persistence,
            scale,
            exog: DMatrix::zeros(1, 0),
            exog_coefs: DMatrix::zeros(1, 0),
            lags,
        })
    }

    /// Attach exogenous regressors and their (possibly time-varying) coefficients.
    pub fn with_exog(mut self, exog: DMatrix<f64>, exog_coefs: DMatrix<f64>) -> Result<Self> {
        check_cols("exog coefficients", &exog_coefs, exog.ncols())?;
        if exog.nrows() == 0 {
            return Err(SsoeError::DimensionMismatch {
                what: "exog rows",
                expected: 1,
                got: 0,
            });
        }
        self.exog = exog;
        self.exog_coefs = exog_coefs;
        Ok(self)
    }

    pub fn k_states(&self) -> usize {
        self.lags.len()
    }

    pub fn maxlag(&self) -> usize {
        self.lags.maxlag()
    }

    pub fn n_exog(&self) -> usize {
        self.exog.ncols()
    }

    /// Fitted/forecast value at period `t` for lagged state `a`.
    #[inline]
    pub fn measure(&self, t: usize, a: &DVector<f64>) -> f64 {
        let r = broadcast_row(&self.measurement, t);
        let mut y = 0.0;
        for j in 0..a.len() {
            y += self.measurement[(r, j)] * a[j];
        }
        y + self.exog_term(t)
    }

    /// Exogenous contribution x_t' b_t.
    #[inline]
    pub fn exog_term(&self, t: usize) -> f64 {
        let m = self.exog.ncols();
        if m == 0 {
            return 0.0;
        }
        let rx = broadcast_row(&self.exog, t);
        let rb = broadcast_row(&self.exog_coefs, t);
        (0..m)
            .map(|j| self.exog[(rx, j)] * self.exog_coefs[(rb, j)])
            .sum()
    }

    /// Persistence vector divided element-wise by the scale row of period `t`.
    #[inline]
    pub fn scaled_persistence(&self, t: usize) -> DVector<f64> {
        let r = broadcast_row(&self.scale, t);
        DVector::from_iterator(
            self.persistence.len(),
            (0..self.persistence.len()).map(|k| self.persistence[k] / self.scale[(r, k)]),
        )
    }

    /// Ensure every row-indexed input covers periods `[0, n)`.
    pub(crate) fn check_periods(&self, n: usize) -> Result<()> {
        for (what, m) in [
            ("measurement rows", &self.measurement),
            ("scale rows", &self.scale),
            ("exog rows", &self.exog),
            ("exog coefficient rows", &self.exog_coefs),
        ] {
            if m.nrows() != 1 && m.nrows() < n {
                return Err(SsoeError::DimensionMismatch {
                    what,
                    expected: n,
                    got: m.nrows(),
                });
            }
        }
        Ok(())
    }

    /// Ensure a state history can drive `obs` observations.
    pub(crate) fn check_history(&self, states: &DMatrix<f64>, obs: usize) -> Result<()> {
        if states.ncols() != self.k_states() {
            return Err(SsoeError::DimensionMismatch {
                what: "state history columns",
                expected: self.k_states(),
                got: states.ncols(),
            });
        }
        let needed = obs + self.maxlag();
        if states.nrows() < needed {
            return Err(SsoeError::InsufficientHistory {
                rows: states.nrows(),
                needed,
            });
        }
        Ok(())
    }

    /// Pad a `maxlag × k` block of pre-sample states to a full
    /// `(obs + maxlag) × k` history with zero rows.
    pub fn initial_history(&self, seed: &DMatrix<f64>, obs: usize) -> Result<DMatrix<f64>> {
        let maxlag = self.maxlag();
        if seed.nrows() < maxlag {
            return Err(SsoeError::InsufficientHistory {
                rows: seed.nrows(),
                needed: maxlag,
            });
        }
        if seed.ncols() != self.k_states() {
            return Err(SsoeError::DimensionMismatch {
                what: "seed columns",
                expected: self.k_states(),
                got: seed.ncols(),
            });
        }
        let mut history = DMatrix::zeros(obs + maxlag, self.k_states());
        history
            .view_mut((0, 0), (maxlag, self.k_states()))
            .copy_from(&seed.view((0, 0), (maxlag, self.k_states())));
        Ok(history)
    }
}

#[inline]
fn broadcast_row(m: &DMatrix<f64>, t: usize) -> usize {
    if m.nrows() == 1 {
        0
    } else {
        t
    }
}

fn check_cols(what: &'static str, m: &DMatrix<f64>, expected: usize) -> Result<()> {
    if m.ncols() != expected {
        return Err(SsoeError::DimensionMismatch {
            what,
            expected,
            got: m.ncols(),
        });
    }
    if m.nrows() == 0 {
        return Err(SsoeError::DimensionMismatch {
            what,
            expected: 1,
            got: 0,
        });
    }
    Ok(())
}
