use crate::error::{IndicatorError, check_period};
use ta::Next;
use ta::indicators::{ExponentialMovingAverage as Ema, SimpleMovingAverage as Sma};

/// Simple moving average over the trailing `period` values.
///
/// The first `period - 1` values average the shorter window available so far.
pub fn sma(values: &[f64], period: usize) -> Result<Vec<f64>, IndicatorError> {
    check_period("sma", period)?;
    let mut indicator = Sma::new(period)?;
    Ok(values.iter().map(|v| indicator.next(*v)).collect())
}

/// Exponential moving average with `alpha = 2 / (period + 1)`, seeded by the
/// first value.
pub fn ema(values: &[f64], period: usize) -> Result<Vec<f64>, IndicatorError> {
    check_period("ema", period)?;
    let mut indicator = Ema::new(period)?;
    Ok(values.iter().map(|v| indicator.next(*v)).collect())
}
