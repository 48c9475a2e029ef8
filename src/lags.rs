use nalgebra::{DMatrix, DVector};

use crate::error::{Result, SsoeError};

/// Lag structure of the state vector.
///
/// Component `k` of the state row at time `i` is driven by row `i - lags[k]`
/// of the state history. Backward sweeps read `i + lags[k]` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LagIndex {
    lags: Vec<usize>,
    maxlag: usize,
}

impl LagIndex {
    pub fn new(lags: &[usize]) -> Result<Self> {
        if lags.is_empty() {
            return Err(SsoeError::EmptyLags);
        }
        if let Some(component) = lags.iter().position(|&l| l == 0) {
            return Err(SsoeError::ZeroLag { component });
        }
        let maxlag = lags.iter().copied().max().unwrap_or(1);
        Ok(Self {
            lags: lags.to_vec(),
            maxlag,
        })
    }

    pub fn lags(&self) -> &[usize] {
        &self.lags
    }

    pub fn maxlag(&self) -> usize {
        self.maxlag
    }

    /// Number of state components.
    pub fn len(&self) -> usize {
        self.lags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lags.is_empty()
    }

    /// History row feeding component `k` at row `i`. Requires `i >= maxlag`.
    #[inline]
    pub fn row(&self, i: usize, k: usize) -> usize {
        i - self.lags[k]
    }

    /// History row feeding component `k` at row `i` on a backward sweep.
    #[inline]
    pub fn back_row(&self, i: usize, k: usize) -> usize {
        i + self.lags[k]
    }

    /// Lagged state vector for row `i`.
    pub fn gather(&self, states: &DMatrix<f64>, i: usize) -> DVector<f64> {
        DVector::from_iterator(
            self.lags.len(),
            (0..self.lags.len()).map(|k| states[(self.row(i, k), k)]),
        )
    }

    /// Lagged state vector for row `i`, reading ahead in time.
    pub fn gather_backward(&self, states: &DMatrix<f64>, i: usize) -> DVector<f64> {
        DVector::from_iterator(
            self.lags.len(),
            (0..self.lags.len()).map(|k| states[(self.back_row(i, k), k)]),
        )
    }
}
