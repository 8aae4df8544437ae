use crate::error::ConfigError;
use core_types::{Interval, StrategyId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so a config file only needs to name the
/// values it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backtest: Backtest,
    pub simulation: Simulation,
    pub dca: Dca,
    pub strategies: Strategies,
    pub logging: Logging,
}

/// Contains parameters for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Backtest {
    /// The symbol to use for the backtest (e.g., "BTCUSDT").
    pub symbol: String,
    /// The candle granularity; drives Sharpe annualisation.
    pub interval: Interval,
    /// The entry strategy to run.
    pub strategy: StrategyId,
    /// CSV file with the candle series.
    pub data_path: Option<PathBuf>,
    /// Trading decisions start once this many candles have been seen.
    pub warmup_candles: usize,
    /// When set, strategies only see the trailing N candles.
    pub history_window: Option<usize>,
}

/// Contains parameters for the backtesting and simulation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Simulation {
    pub initial_capital: Decimal,
    /// Proportional fee charged on the notional of every fill.
    /// 0.0005 corresponds to 0.05%.
    pub fee_rate: Decimal,
    /// Adverse price move applied to every fill. Buys fill at
    /// `close * (1 + slippage_rate)`, sells at `close * (1 - slippage_rate)`.
    pub slippage_rate: Decimal,
    /// Share of the initial capital committed to one DCA position.
    pub capital_fraction: Decimal,
}

/// Contains the DCA position rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dca {
    /// Close with a profit once price is this many percent above the average entry.
    pub profit_target_pct: Decimal,
    /// Negative percentage. Only checked once every lot has been filled.
    pub stop_loss_pct: Decimal,
    pub max_lots: u32,
    /// Spacing of lot trigger prices, measured from the first entry price.
    pub lot_interval_pct: Decimal,
}

/// Contains the parameter sets for all available strategies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Strategies {
    pub rsi: RsiParams,
    pub macd: MacdParams,
    pub bollinger: BollingerParams,
    pub proximity_bollinger: ProximityBollingerParams,
    pub multi_signal: MultiSignalParams,
    pub hybrid_smart: HybridSmartParams,
}

/// Parameters for the RSI mean-reversion strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiParams {
    pub rsi_period: usize,
    pub oversold: Decimal,
    pub overbought: Decimal,
}

/// Parameters for the MACD signal-line crossover strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdParams {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
}

/// Parameters for the Bollinger band breakout strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerParams {
    pub period: usize,
    pub std_dev: Decimal,
}

/// Parameters for the lower-band proximity strategy with ATR and MA filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityBollingerParams {
    pub bb_period: usize,
    pub bb_std: Decimal,
    /// How far above the lower band (in percent) still counts as "touching" it.
    pub proximity_pct: Decimal,
    /// Only buy below the long moving average.
    pub use_ma_filter: bool,
    pub ma_period: usize,
    pub atr_period: usize,
    /// Minimum ATR as a percentage of price; quieter markets are skipped.
    pub atr_min_pct: Decimal,
    pub cooldown_minutes: i64,
}

/// Parameters for the RSI / band / stochastic combination strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiSignalParams {
    pub rsi_period: usize,
    pub rsi_oversold: Decimal,
    pub bb_period: usize,
    pub bb_std: Decimal,
    pub bb_proximity_pct: Decimal,
    pub stoch_k_period: usize,
    pub stoch_d_period: usize,
    /// %K above this vetoes any buy.
    pub stoch_overbought: Decimal,
    /// Require every condition (AND) instead of any (OR).
    pub require_all: bool,
}

/// Parameters for the band proximity plus stochastic strategy with cooldown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridSmartParams {
    pub bb_period: usize,
    pub bb_std: Decimal,
    pub bb_proximity_pct: Decimal,
    pub stoch_k_period: usize,
    pub stoch_d_period: usize,
    pub stoch_threshold: Decimal,
    pub cooldown_minutes: i64,
}

/// Logging output settings. `RUST_LOG` takes precedence over `level`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    /// When set, logs are also written to a daily rolling file here.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

// --- Default Implementations ---

impl Default for Backtest {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            interval: Interval::OneHour,
            strategy: StrategyId::Rsi,
            data_path: None,
            warmup_candles: 30,
            history_window: None,
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            initial_capital: dec!(1000000),
            fee_rate: dec!(0.0005),
            slippage_rate: dec!(0.001),
            capital_fraction: Decimal::ONE,
        }
    }
}

impl Default for Dca {
    fn default() -> Self {
        Self {
            profit_target_pct: dec!(5),
            stop_loss_pct: dec!(-7),
            max_lots: 6,
            lot_interval_pct: dec!(10),
        }
    }
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { rsi_period: 14, oversold: dec!(30), overbought: dec!(70) }
    }
}

impl Default for MacdParams {
    fn default() -> Self {
        Self { fast_period: 12, slow_period: 26, signal_period: 9 }
    }
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self { period: 20, std_dev: dec!(2.0) }
    }
}

impl Default for ProximityBollingerParams {
    fn default() -> Self {
        Self {
            bb_period: 20,
            bb_std: dec!(2.0),
            proximity_pct: dec!(2.0),
            use_ma_filter: false,
            ma_period: 240,
            atr_period: 14,
            atr_min_pct: dec!(0.05),
            cooldown_minutes: 60,
        }
    }
}

impl Default for MultiSignalParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            rsi_oversold: dec!(40),
            bb_period: 20,
            bb_std: dec!(2.0),
            bb_proximity_pct: dec!(1.0),
            stoch_k_period: 14,
            stoch_d_period: 3,
            stoch_overbought: dec!(80),
            require_all: false,
        }
    }
}

impl Default for HybridSmartParams {
    fn default() -> Self {
        Self {
            bb_period: 20,
            bb_std: dec!(2.0),
            bb_proximity_pct: dec!(2.0),
            stoch_k_period: 14,
            stoch_d_period: 3,
            stoch_threshold: dec!(80),
            cooldown_minutes: 60,
        }
    }
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "tranche.log".to_string(),
        }
    }
}

// --- Validation ---

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

impl Config {
    /// Checks the engine-level settings. Strategy parameters are checked by
    /// the strategy constructors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;
        self.dca.validate()?;
        if let Some(0) = self.backtest.history_window {
            return Err(invalid("backtest.history_window must be at least 1"));
        }
        Ok(())
    }
}

impl Simulation {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capital <= Decimal::ZERO {
            return Err(invalid("simulation.initial_capital must be positive"));
        }
        if self.fee_rate < Decimal::ZERO || self.fee_rate >= Decimal::ONE {
            return Err(invalid("simulation.fee_rate must be in [0, 1)"));
        }
        if self.slippage_rate < Decimal::ZERO || self.slippage_rate >= Decimal::ONE {
            return Err(invalid("simulation.slippage_rate must be in [0, 1)"));
        }
        if self.capital_fraction <= Decimal::ZERO || self.capital_fraction > Decimal::ONE {
            return Err(invalid("simulation.capital_fraction must be in (0, 1]"));
        }
        Ok(())
    }
}

impl Dca {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_lots == 0 {
            return Err(invalid("dca.max_lots must be at least 1"));
        }
        if self.profit_target_pct <= Decimal::ZERO {
            return Err(invalid("dca.profit_target_pct must be positive"));
        }
        if self.stop_loss_pct >= Decimal::ZERO {
            return Err(invalid("dca.stop_loss_pct must be negative"));
        }
        if self.lot_interval_pct <= Decimal::ZERO {
            return Err(invalid("dca.lot_interval_pct must be positive"));
        }
        // The deepest trigger price must stay above zero.
        if self.lot_interval_pct * Decimal::from(self.max_lots - 1) >= dec!(100) {
            return Err(invalid(format!(
                "dca.lot_interval_pct {} is too wide for {} lots",
                self.lot_interval_pct, self.max_lots
            )));
        }
        Ok(())
    }
}
