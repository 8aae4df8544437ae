use crate::Strategy;
use crate::error::StrategyError;
use crate::window::{self, Cooldown, PriceSeries};
use chrono::{DateTime, Utc};
use configuration::HybridSmartParams;
use core_types::{Candle, Signal, StrategyId};
use indicators::{bollinger_bands, last_defined, stochastic};

/// Lower-band proximity entries filtered by a non-overbought stochastic and
/// a cooldown between buys. Entry-only.
pub struct HybridSmart {
    params: HybridSmartParams,
    bb_std: f64,
    bb_proximity_pct: f64,
    stoch_threshold: f64,
    cooldown: Cooldown,
}

impl HybridSmart {
    pub fn new(params: HybridSmartParams) -> Result<Self, StrategyError> {
        if params.bb_period < 2 {
            return Err(StrategyError::InvalidParameters("bb_period must be at least 2".to_string()));
        }
        window::period("stoch_k_period", params.stoch_k_period)?;
        window::period("stoch_d_period", params.stoch_d_period)?;
        let bb_std = window::threshold("bb_std", params.bb_std)?;
        if bb_std <= 0.0 {
            return Err(StrategyError::InvalidParameters("bb_std must be positive".to_string()));
        }

        Ok(Self {
            bb_std,
            bb_proximity_pct: window::threshold("bb_proximity_pct", params.bb_proximity_pct)?,
            stoch_threshold: window::threshold("stoch_threshold", params.stoch_threshold)?,
            cooldown: Cooldown::minutes(params.cooldown_minutes)?,
            params,
        })
    }
}

impl Strategy for HybridSmart {
    fn id(&self) -> StrategyId {
        StrategyId::HybridSmart
    }

    fn min_history(&self) -> usize {
        self.params.bb_period.max(self.params.stoch_k_period) + 10
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
        let p = &self.params;

        let lower = {
            let prices = PriceSeries::new(window::tail(window, p.bb_period));
            last_defined(&bollinger_bands(&prices.closes, p.bb_period, self.bb_std)?.lower)
        };
        let stoch_k = {
            let prices = PriceSeries::new(window::tail(window, p.stoch_k_period + p.stoch_d_period));
            let series = stochastic(&prices.highs, &prices.lows, &prices.closes, p.stoch_k_period, p.stoch_d_period)?;
            last_defined(&series.k)
        };

        let (Some(close), Some(lower), Some(stoch_k), Some(now)) = (
            window::latest_close(window),
            lower,
            stoch_k,
            window::decision_time(window, now),
        ) else {
            return Ok(Signal::Hold);
        };

        let near_lower = window::distance_above_pct(close, lower)
            .is_some_and(|distance| distance <= self.bb_proximity_pct);
        let not_overbought = stoch_k < self.stoch_threshold;

        if near_lower && not_overbought && self.cooldown.is_ready(now) {
            self.cooldown.record(now);
            tracing::debug!(close, lower, stoch_k, "HybridSmart: BUY");
            return Ok(Signal::Buy);
        }
        Ok(Signal::Hold)
    }
}
