/// Loss evaluated by the cost function selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossKind {
    /// Generalised variance: log-determinant of the multi-step error covariance.
    GeneralizedVariance,
    /// Sum over horizons of the log mean squared error.
    TraceLogVariance,
    /// Sum over horizons of the mean squared error.
    TraceVariance,
    /// Mean squared error at the largest horizon only.
    HSteps,
    /// One-step mean squared error.
    Mse,
    /// One-step mean absolute error.
    Mae,
    /// One-step mean of sqrt(|e|). Any unrecognised name maps here.
    HalfAbsoluteMoment,
}

impl LossKind {
    /// True when the loss needs the rolling-origin error matrix.
    pub fn is_multistep(&self) -> bool {
        matches!(
            self,
            LossKind::GeneralizedVariance
                | LossKind::TraceLogVariance
                | LossKind::TraceVariance
                | LossKind::HSteps
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LossKind::GeneralizedVariance => "GV",
            LossKind::TraceLogVariance => "TLV",
            LossKind::TraceVariance => "TV",
            LossKind::HSteps => "hsteps",
            LossKind::Mse => "MSE",
            LossKind::Mae => "MAE",
            LossKind::HalfAbsoluteMoment => "HAM",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "GV" => LossKind::GeneralizedVariance,
            "TLV" => LossKind::TraceLogVariance,
            "TV" => LossKind::TraceVariance,
            "hsteps" => LossKind::HSteps,
            "MSE" => LossKind::Mse,
            "MAE" => LossKind::Mae,
            _ => LossKind::HalfAbsoluteMoment,
        }
    }
}

/// Cost function configuration.
#[derive(Debug, Clone)]
pub struct CostConfig {
    pub loss: LossKind,
    /// Forecast horizon used by the multi-step losses.
    pub horizon: usize,
    /// Divisor applied to the error matrix before the GV log-determinant.
    pub normalizer: f64,
    /// Initialise the pre-sample states by backcasting instead of a single pass.
    pub backcast: bool,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            loss: LossKind::Mse,
            horizon: 1,
            normalizer: 1.0,
            backcast: false,
        }
    }
}
