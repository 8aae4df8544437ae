//! # Indicator Library
//!
//! Pure, causal transforms of price series into aligned indicator series.
//!
//! Every function takes whole input slices and returns output of the same
//! length, index for index. The value at index `i` depends only on inputs
//! `0..=i`, so evaluating a truncated series gives the same prefix as
//! evaluating the full one.
//!
//! ## Warm-up policy
//!
//! - Moving averages and rolling extremes use the shorter available window
//!   at the start of a series instead of leaving it undefined.
//! - Values that cannot be defined (a standard deviation of one sample) are
//!   `f64::NAN`. Callers treat NaN as "no signal".
//! - Short input is never an error. Only an invalid window length is.

pub mod crossover;
pub mod error;
pub mod momentum;
pub mod moving_average;
pub mod volatility;

pub use crossover::{crossed_above, crossed_below};
pub use error::IndicatorError;
pub use momentum::{MacdSeries, StochasticSeries, macd, rsi, stochastic};
pub use moving_average::{ema, sma};
pub use volatility::{BollingerSeries, atr, bollinger_bands, rolling_std, true_range};

/// Returns the last value of a series if it is defined.
pub fn last_defined(series: &[f64]) -> Option<f64> {
    series.last().copied().filter(|v| v.is_finite())
}
