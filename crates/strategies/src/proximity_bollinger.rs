use crate::Strategy;
use crate::error::StrategyError;
use crate::window::{self, Cooldown, PriceSeries};
use chrono::{DateTime, Utc};
use configuration::ProximityBollingerParams;
use core_types::{Candle, Signal, StrategyId};
use indicators::{atr, bollinger_bands, last_defined, sma};

/// ATR is an EMA of the true range; beyond this many periods the weight of
/// older candles is below 1e-8 and they are not read.
const ATR_LOOKBACK_PERIODS: usize = 10;

/// Buys when price comes within `proximity_pct` of the lower Bollinger band.
///
/// Three filters gate entries:
/// - a cooldown between buy signals;
/// - a volatility floor (`ATR >= close * atr_min_pct / 100`), which also
///   suppresses sells;
/// - an optional requirement that price trades below the long moving average.
///
/// Sells when price closes above both the upper band and the long average.
pub struct ProximityBollinger {
    params: ProximityBollingerParams,
    bb_std: f64,
    proximity_pct: f64,
    atr_min_pct: f64,
    cooldown: Cooldown,
}

impl ProximityBollinger {
    pub fn new(params: ProximityBollingerParams) -> Result<Self, StrategyError> {
        if params.bb_period < 2 {
            return Err(StrategyError::InvalidParameters(
                "bb_period must be at least 2".to_string(),
            ));
        }
        window::period("ma_period", params.ma_period)?;
        window::period("atr_period", params.atr_period)?;
        let bb_std = window::threshold("bb_std", params.bb_std)?;
        let proximity_pct = window::threshold("proximity_pct", params.proximity_pct)?;
        let atr_min_pct = window::threshold("atr_min_pct", params.atr_min_pct)?;
        if bb_std <= 0.0 || proximity_pct < 0.0 || atr_min_pct < 0.0 {
            return Err(StrategyError::InvalidParameters(
                "bb_std must be positive; proximity_pct and atr_min_pct must not be negative"
                    .to_string(),
            ));
        }
        let cooldown = Cooldown::minutes(params.cooldown_minutes)?;

        Ok(Self { params, bb_std, proximity_pct, atr_min_pct, cooldown })
    }

    /// Candles read for the ATR: the EMA's effective horizon plus the
    /// previous close the first true range needs.
    fn atr_lookback(&self) -> usize {
        self.params.atr_period * ATR_LOOKBACK_PERIODS + 1
    }
}

impl Strategy for ProximityBollinger {
    fn id(&self) -> StrategyId {
        StrategyId::ProximityBollinger
    }

    fn min_history(&self) -> usize {
        self.params
            .bb_period
            .max(self.params.ma_period)
            .max(self.params.atr_period)
            + 1
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::to_value(&self.params).unwrap_or_default()
    }

    fn generate_signal(
        &mut self,
        window: &[Candle],
        now: Option<DateTime<Utc>>,
    ) -> Result<Signal, StrategyError> {
        if window.len() < self.min_history() {
            return Ok(Signal::Hold);
        }
        let Some(now) = window::decision_time(window, now) else {
            return Ok(Signal::Hold);
        };
        if !self.cooldown.is_ready(now) {
            tracing::debug!(%now, "ProximityBollinger: cooling down");
            return Ok(Signal::Hold);
        }

        let bands = {
            let prices = PriceSeries::new(window::tail(window, self.params.bb_period));
            bollinger_bands(&prices.closes, self.params.bb_period, self.bb_std)?
        };
        let long_ma = {
            let prices = PriceSeries::new(window::tail(window, self.params.ma_period));
            sma(&prices.closes, self.params.ma_period)?
        };
        let prices = PriceSeries::new(window::tail(window, self.atr_lookback()));
        let volatility = atr(&prices.highs, &prices.lows, &prices.closes, self.params.atr_period)?;

        let (Some(close), Some(lower), Some(upper), Some(ma), Some(atr_now)) = (
            window::latest_close(window),
            last_defined(&bands.lower),
            last_defined(&bands.upper),
            last_defined(&long_ma),
            last_defined(&volatility),
        ) else {
            return Ok(Signal::Hold);
        };

        if atr_now < close * self.atr_min_pct / 100.0 {
            tracing::debug!(atr = atr_now, close, "ProximityBollinger: volatility too low");
            return Ok(Signal::Hold);
        }

        let near_lower = close <= lower * (1.0 + self.proximity_pct / 100.0);
        let below_ma = !self.params.use_ma_filter || close < ma;
        if near_lower && below_ma {
            self.cooldown.record(now);
            tracing::debug!(close, lower, "ProximityBollinger: BUY near lower band");
            return Ok(Signal::Buy);
        }

        if close > upper && close > ma {
            return Ok(Signal::Sell);
        }
        Ok(Signal::Hold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::test_support::candles;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn params() -> ProximityBollingerParams {
        ProximityBollingerParams {
            bb_period: 5,
            bb_std: dec!(2),
            proximity_pct: dec!(2),
            use_ma_filter: false,
            ma_period: 8,
            atr_period: 3,
            atr_min_pct: dec!(0.05),
            cooldown_minutes: 120,
        }
    }

    fn dip() -> Vec<f64> {
        vec![100.0, 102.0, 100.0, 102.0, 100.0, 102.0, 100.0, 102.0, 90.0]
    }

    #[test]
    fn buys_near_the_lower_band_then_cools_down() {
        let mut s = ProximityBollinger::new(params()).unwrap();
        let window = candles(&dip());
        let t = window.last().unwrap().timestamp;

        assert_eq!(s.min_history(), 9);
        assert_eq!(s.generate_signal(&window, None).unwrap(), Signal::Buy);
        assert_eq!(s.generate_signal(&window, Some(t + Duration::minutes(60))).unwrap(), Signal::Hold);
        assert_eq!(s.generate_signal(&window, Some(t + Duration::minutes(120))).unwrap(), Signal::Buy);
    }

    #[test]
    fn moving_average_filter_blocks_entries_above_the_average() {
        let mut p = params();
        p.use_ma_filter = true;
        p.ma_period = 5;
        let mut s = ProximityBollinger::new(p).unwrap();
        let mut closes = vec![100.0; 8];
        closes.push(90.0);
        let window = candles(&closes);
        assert_eq!(s.generate_signal(&window, None).unwrap(), Signal::Buy, "90 < SMA");

        let mut s = ProximityBollinger::new(ProximityBollingerParams { use_ma_filter: true, ..params() }).unwrap();
        // Touching a zero-width band at the average is not "below" it.
        let flat = candles(&[100.0; 9]);
        assert_eq!(s.generate_signal(&flat, None).unwrap(), Signal::Hold);
    }

    #[test]
    fn quiet_markets_are_skipped() {
        let mut p = params();
        p.atr_min_pct = dec!(50);
        let mut s = ProximityBollinger::new(p).unwrap();
        assert_eq!(s.generate_signal(&candles(&dip()), None).unwrap(), Signal::Hold);
    }

    #[test]
    fn long_histories_decide_like_their_recent_tail() {
        let closes: Vec<f64> = (0..500)
            .map(|i| 100.0 + 8.0 * (i as f64 / 7.0).sin() + 2.0 * (i as f64 / 3.0).cos())
            .collect();
        let window = candles(&closes);
        let sizing = ProximityBollinger::new(params()).unwrap();
        let recent = sizing.atr_lookback().max(sizing.min_history());

        for end in [200, 350, 500] {
            let mut full = ProximityBollinger::new(params()).unwrap();
            let mut short = ProximityBollinger::new(params()).unwrap();
            let full_window = &window[..end];
            let short_window = window::tail(full_window, recent);
            assert_eq!(
                full.generate_signal(full_window, None).unwrap(),
                short.generate_signal(short_window, None).unwrap(),
                "end {end}"
            );
        }
    }

    #[test]
    fn sells_above_upper_band_and_average() {
        let mut s = ProximityBollinger::new(ProximityBollingerParams { bb_std: dec!(1.5), ..params() }).unwrap();
        let spike = candles(&[100.0, 102.0, 100.0, 102.0, 100.0, 102.0, 100.0, 102.0, 115.0]);
        assert_eq!(s.generate_signal(&spike, None).unwrap(), Signal::Sell);
    }
}
