use thiserror::Error;

#[derive(Error, Debug)]
pub enum SsoeError {
    #[error("lag set is empty")]
    EmptyLags,

    #[error("lag of component {component} is zero; lags must be >= 1")]
    ZeroLag { component: usize },

    #[error("{what} dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("state history has {rows} rows, need at least {needed}")]
    InsufficientHistory { rows: usize, needed: usize },

    #[error("invalid horizon {horizon} for {obs} observations")]
    InvalidHorizon { horizon: usize, obs: usize },

    #[error("normalizer must be finite and non-zero, got {0}")]
    InvalidNormalizer(f64),

    #[error("symmetric eigen-decomposition did not converge")]
    EigenDecompositionFailed,

    #[error("data error: {0}")]
    DataError(String),
}

pub type Result<T> = std::result::Result<T, SsoeError>;
