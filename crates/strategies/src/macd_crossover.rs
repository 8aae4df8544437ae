use crate::Strategy;
use crate::error::StrategyError;
use crate::window::{self, PriceSeries};
use chrono::{DateTime, Utc};
use configuration::MacdParams;
use core_types::{Candle, Signal, StrategyId};
use indicators::{crossed_above, crossed_below, macd};

/// Trades MACD line crossings of its signal line.
pub struct MacdCrossover {
    params: MacdParams,
}

impl MacdCrossover {
    pub fn new(params: MacdParams) -> Result<Self, StrategyError> {
        window::period("fast_period", params.fast_period)?;
        window::period("signal_period", params.signal_period)?;
        if params.fast_period >= params.slow_period {
            return Err(StrategyError::InvalidParameters(
                "Fast period must be less than slow period".to_string(),
            ));
        }
        Ok(Self { params })
    }
}

impl Strategy for MacdCrossover {
    fn id(&self) -> StrategyId {
        StrategyId::Macd
    }

    fn min_history(&self) -> usize {
        self.params.slow_period + self.params.signal_period + 2
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::to_value(&self.params).unwrap_or_default()
    }

    /// A bullish crossing (MACD moves above its signal line) buys, a bearish
    /// crossing sells.
    ///
    /// The EMAs depend on the whole window, so every call evaluates all of it.
    fn generate_signal(
        &mut self,
        window: &[Candle],
        _now: Option<DateTime<Utc>>,
    ) -> Result<Signal, StrategyError> {
        if window.len() < self.min_history() {
            return Ok(Signal::Hold);
        }

        let prices = PriceSeries::new(window);
        let series = macd(
            &prices.closes,
            self.params.fast_period,
            self.params.slow_period,
            self.params.signal_period,
        )?;

        let signal = if crossed_above(&series.macd, &series.signal) {
            Signal::Buy
        } else if crossed_below(&series.macd, &series.signal) {
            Signal::Sell
        } else {
            Signal::Hold
        };

        if signal != Signal::Hold {
            tracing::debug!(?signal, "MacdCrossover: crossing detected");
        }
        Ok(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::test_support::candles;

    fn strategy() -> MacdCrossover {
        MacdCrossover::new(MacdParams { fast_period: 3, slow_period: 6, signal_period: 3 }).unwrap()
    }

    #[test]
    fn rejects_fast_not_below_slow() {
        assert!(MacdCrossover::new(MacdParams { fast_period: 26, slow_period: 12, signal_period: 9 }).is_err());
    }

    #[test]
    fn detects_a_bullish_turn_after_a_decline() {
        let mut s = strategy();
        let mut closes: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let mut saw_buy = false;
        for step in 0..10 {
            closes.push(81.0 + 3.0 * step as f64);
            if s.generate_signal(&candles(&closes), None).unwrap() == Signal::Buy {
                saw_buy = true;
                break;
            }
        }
        assert!(saw_buy);
    }

    #[test]
    fn holds_on_a_steady_trend() {
        let mut s = strategy();
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        assert_eq!(s.generate_signal(&candles(&closes), None).unwrap(), Signal::Hold);
        assert_eq!(s.generate_signal(&candles(&closes[..5]), None).unwrap(), Signal::Hold);
    }
}
