use crate::Strategy;
use crate::error::StrategyError;
use crate::window::{self, PriceSeries};
use chrono::{DateTime, Utc};
use configuration::MultiSignalParams;
use core_types::{Candle, Signal, StrategyId};
use indicators::{bollinger_bands, last_defined, rsi, stochastic};

/// Combines an oversold RSI and lower-band proximity, vetoed by an
/// overbought stochastic.
///
/// With `require_all` both conditions must hold, otherwise either suffices.
/// This strategy only produces entries; exits are left to the DCA rules.
pub struct MultiSignal {
    params: MultiSignalParams,
    rsi_oversold: f64,
    bb_std: f64,
    bb_proximity_pct: f64,
    stoch_overbought: f64,
}

impl MultiSignal {
    pub fn new(params: MultiSignalParams) -> Result<Self, StrategyError> {
        window::period("rsi_period", params.rsi_period)?;
        window::period("stoch_k_period", params.stoch_k_period)?;
        window::period("stoch_d_period", params.stoch_d_period)?;
        if params.bb_period < 2 {
            return Err(StrategyError::InvalidParameters("bb_period must be at least 2".to_string()));
        }
        let bb_std = window::threshold("bb_std", params.bb_std)?;
        if bb_std <= 0.0 {
            return Err(StrategyError::InvalidParameters("bb_std must be positive".to_string()));
        }

        Ok(Self {
            rsi_oversold: window::threshold("rsi_oversold", params.rsi_oversold)?,
            bb_proximity_pct: window::threshold("bb_proximity_pct", params.bb_proximity_pct)?,
            stoch_overbought: window::threshold("stoch_overbought", params.stoch_overbought)?,
            bb_std,
            params,
        })
    }
}

impl Strategy for MultiSignal {
    fn id(&self) -> StrategyId {
        StrategyId::MultiSignal
    }

    fn min_history(&self) -> usize {
        self.params
            .rsi_period
            .max(self.params.bb_period)
            .max(self.params.stoch_k_period)
            + 10
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
        let p = &self.params;

        let rsi_now = {
            let prices = PriceSeries::new(window::tail(window, p.rsi_period + 1));
            last_defined(&rsi(&prices.closes, p.rsi_period)?)
        };
        let lower = {
            let prices = PriceSeries::new(window::tail(window, p.bb_period));
            last_defined(&bollinger_bands(&prices.closes, p.bb_period, self.bb_std)?.lower)
        };
        let stoch_k = {
            let prices = PriceSeries::new(window::tail(window, p.stoch_k_period + p.stoch_d_period));
            let series = stochastic(&prices.highs, &prices.lows, &prices.closes, p.stoch_k_period, p.stoch_d_period)?;
            last_defined(&series.k)
        };

        let (Some(close), Some(rsi_now), Some(lower), Some(stoch_k)) =
            (window::latest_close(window), rsi_now, lower, stoch_k)
        else {
            return Ok(Signal::Hold);
        };

        let rsi_oversold = rsi_now < self.rsi_oversold;
        let near_lower = window::distance_above_pct(close, lower)
            .is_some_and(|distance| distance <= self.bb_proximity_pct);
        let overbought = stoch_k > self.stoch_overbought;

        let conditions_met = if p.require_all {
            rsi_oversold && near_lower
        } else {
            rsi_oversold || near_lower
        };

        tracing::debug!(rsi = rsi_now, near_lower, stoch_k, "MultiSignal: evaluated");

        if conditions_met && !overbought {
            Ok(Signal::Buy)
        } else {
            Ok(Signal::Hold)
        }
    }
}
