use crate::Strategy;
use crate::error::StrategyError;
use crate::window::{self, PriceSeries};
use chrono::{DateTime, Utc};
use configuration::RsiParams;
use core_types::{Candle, Signal, StrategyId};
use indicators::{last_defined, rsi};

/// Buys oversold RSI readings and sells overbought ones.
pub struct RsiReversion {
    params: RsiParams,
    oversold: f64,
    overbought: f64,
}

impl RsiReversion {
    /// Creates a new `RsiReversion` instance with the given parameters.
    ///
    /// It performs validation to ensure the parameters are logical.
    pub fn new(params: RsiParams) -> Result<Self, StrategyError> {
        window::period("rsi_period", params.rsi_period)?;
        let oversold = window::threshold("oversold", params.oversold)?;
        let overbought = window::threshold("overbought", params.overbought)?;

        if !(0.0 < oversold && oversold < overbought && overbought < 100.0) {
            return Err(StrategyError::InvalidParameters(
                "RSI thresholds must satisfy 0 < oversold < overbought < 100".to_string(),
            ));
        }

        Ok(Self { params, oversold, overbought })
    }
}

impl Strategy for RsiReversion {
    fn id(&self) -> StrategyId {
        StrategyId::Rsi
    }

    fn min_history(&self) -> usize {
        self.params.rsi_period + 1
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::to_value(&self.params).unwrap_or_default()
    }

    fn generate_signal(
        &mut self,
        window: &[Candle],
        _now: Option<DateTime<Utc>>,
    ) -> Result<Signal, StrategyError> {
        if window.len() < self.min_history() {
            return Ok(Signal::Hold);
        }

        let prices = PriceSeries::new(window::tail(window, self.params.rsi_period + 1));
        let Some(current) = last_defined(&rsi(&prices.closes, self.params.rsi_period)?) else {
            return Ok(Signal::Hold);
        };

        tracing::debug!(rsi = current, "RsiReversion: evaluated");

        let signal = if current < self.oversold {
            Signal::Buy
        } else if current > self.overbought {
            Signal::Sell
        } else {
            Signal::Hold
        };
        Ok(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::test_support::candles;
    use rust_decimal_macros::dec;

    fn strategy() -> RsiReversion {
        RsiReversion::new(RsiParams { rsi_period: 3, oversold: dec!(30), overbought: dec!(70) }).unwrap()
    }

    #[test]
    fn holds_on_short_history() {
        let mut s = strategy();
        assert_eq!(s.generate_signal(&candles(&[10.0, 9.0, 8.0]), None).unwrap(), Signal::Hold);
    }

    #[test]
    fn buys_a_falling_market_and_sells_a_rising_one() {
        let mut s = strategy();
        let falling = candles(&[10.0, 9.0, 8.0, 7.0, 6.0]);
        assert_eq!(s.generate_signal(&falling, None).unwrap(), Signal::Buy);

        let rising = candles(&[6.0, 7.0, 8.0, 9.0, 10.0]);
        assert_eq!(s.generate_signal(&rising, None).unwrap(), Signal::Sell);
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let params = RsiParams { rsi_period: 14, oversold: dec!(70), overbought: dec!(30) };
        assert!(RsiReversion::new(params).is_err());
    }
}
