use crate::Strategy;
use crate::error::StrategyError;
use crate::window::{self, PriceSeries};
use chrono::{DateTime, Utc};
use configuration::BollingerParams;
use core_types::{Candle, Signal, StrategyId};
use indicators::{bollinger_bands, last_defined};

/// Buys closes below the lower band and sells closes above the upper band.
pub struct BollingerBreakout {
    params: BollingerParams,
    std_dev: f64,
}

impl BollingerBreakout {
    pub fn new(params: BollingerParams) -> Result<Self, StrategyError> {
        if params.period < 2 {
            return Err(StrategyError::InvalidParameters(
                "Bollinger period must be at least 2".to_string(),
            ));
        }
        let std_dev = window::threshold("std_dev", params.std_dev)?;
        if std_dev <= 0.0 {
            return Err(StrategyError::InvalidParameters("std_dev must be positive".to_string()));
        }
        Ok(Self { params, std_dev })
    }
}

impl Strategy for BollingerBreakout {
    fn id(&self) -> StrategyId {
        StrategyId::Bollinger
    }

    fn min_history(&self) -> usize {
        self.params.period + 1
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

        let prices = PriceSeries::new(window::tail(window, self.params.period));
        let bands = bollinger_bands(&prices.closes, self.params.period, self.std_dev)?;
        let (Some(close), Some(lower), Some(upper)) = (
            window::latest_close(window),
            last_defined(&bands.lower),
            last_defined(&bands.upper),
        ) else {
            return Ok(Signal::Hold);
        };

        let signal = if close < lower {
            Signal::Buy
        } else if close > upper {
            Signal::Sell
        } else {
            Signal::Hold
        };
        Ok(signal)
    }
}
