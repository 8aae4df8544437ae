use crate::error::StrategyError;
use chrono::{DateTime, Duration, Utc};
use core_types::Candle;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Float views of a candle window, as consumed by the indicator library.
pub(crate) struct PriceSeries {
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
    pub closes: Vec<f64>,
}

impl PriceSeries {
    pub fn new(window: &[Candle]) -> Self {
        Self {
            highs: window.iter().map(|c| to_f64(c.high)).collect(),
            lows: window.iter().map(|c| to_f64(c.low)).collect(),
            closes: window.iter().map(|c| to_f64(c.close)).collect(),
        }
    }
}

/// Unrepresentable values become NaN, which strategies treat as "no signal".
pub(crate) fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// The last `len` candles of `window`. Indicators built on fixed trailing
/// windows only need this much history to produce their latest value.
pub(crate) fn tail(window: &[Candle], len: usize) -> &[Candle] {
    &window[window.len().saturating_sub(len)..]
}

pub(crate) fn latest_close(window: &[Candle]) -> Option<f64> {
    window.last().map(|c| to_f64(c.close)).filter(|v| v.is_finite())
}

/// Distance of `close` above the lower band, in percent of the band.
pub(crate) fn distance_above_pct(close: f64, lower: f64) -> Option<f64> {
    (lower > 0.0).then(|| (close - lower) / lower * 100.0)
}

pub(crate) fn decision_time(window: &[Candle], now: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    now.or_else(|| window.last().map(|c| c.timestamp))
}

pub(crate) fn threshold(name: &str, value: Decimal) -> Result<f64, StrategyError> {
    value
        .to_f64()
        .ok_or_else(|| StrategyError::InvalidParameters(format!("{} = {} is not representable", name, value)))
}

pub(crate) fn period(name: &str, value: usize) -> Result<usize, StrategyError> {
    if value == 0 {
        return Err(StrategyError::InvalidParameters(format!("{} must be at least 1", name)));
    }
    Ok(value)
}

/// Minimum spacing between buy signals.
#[derive(Debug, Clone)]
pub(crate) struct Cooldown {
    period: Duration,
    last_buy: Option<DateTime<Utc>>,
}

impl Cooldown {
    pub fn minutes(minutes: i64) -> Result<Self, StrategyError> {
        if minutes < 0 {
            return Err(StrategyError::InvalidParameters(
                "cooldown_minutes must not be negative".to_string(),
            ));
        }
        Ok(Self {
            period: Duration::minutes(minutes),
            last_buy: None,
        })
    }

    pub fn is_ready(&self, now: DateTime<Utc>) -> bool {
        self.last_buy.is_none_or(|last| now - last >= self.period)
    }

    pub fn record(&mut self, now: DateTime<Utc>) {
        self.last_buy = Some(now);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn cooldown_blocks_until_period_elapsed() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut cooldown = Cooldown::minutes(60).unwrap();
        assert!(cooldown.is_ready(t0));
        cooldown.record(t0);
        assert!(!cooldown.is_ready(t0 + Duration::minutes(59)));
        assert!(cooldown.is_ready(t0 + Duration::minutes(60)));
        assert!(Cooldown::minutes(-1).is_err());
    }

    #[test]
    fn tail_never_exceeds_window() {
        let window = test_support::candles(&[1.0, 2.0, 3.0]);
        assert_eq!(tail(&window, 2).len(), 2);
        assert_eq!(tail(&window, 10).len(), 3);
        assert_eq!(latest_close(&window), Some(3.0));
    }
}
