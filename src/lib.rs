//! Innovations (single source of error) state-space core.
//!
//! Given the transition matrix, measurement rows, persistence vector, scale
//! rows and lag set of an exponential-smoothing style model, this crate runs
//! the recursion that fits it, backcasts its pre-sample states, forecasts
//! from it and scores it:
//!
//! - [`filter::fit`]: one forward pass producing fitted values, residuals and states
//! - [`backcast::fit_backcast`]: forward/backward sweeps refining the leading states
//! - [`forecast::forecast`]: point forecasts by pure state propagation
//! - [`rolling::rolling_errors`]: multi-step errors from every origin
//! - [`cost::cost`]: scalar loss for an external optimizer
//!
//! Building the matrices from a model specification and driving the
//! optimizer are left to the caller; [`objective::CostObjective`] plugs the
//! loss into `argmin`.

pub mod error;
pub mod types;
pub mod lags;
pub mod state_space;
pub mod filter;
pub mod backcast;
pub mod forecast;
pub mod rolling;
pub mod cost;
pub mod objective;
pub mod batch;

#[cfg(test)]
mod test_support;

pub use backcast::{fit_backcast, BACKCAST_CYCLES};
pub use cost::cost;
pub use error::{Result, SsoeError};
pub use filter::{fit, FilterOutput};
pub use forecast::forecast;
pub use lags::LagIndex;
pub use objective::CostObjective;
pub use rolling::{rolling_errors, ErrorMatrix};
pub use state_space::StateSpaceModel;
pub use types::{CostConfig, LossKind};
