use crate::error::ConfigError;
use core_types::{Interval, StrategyId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Defines an optimization job. This is deserialized from the `optimizer.toml` file.
#[derive(Debug, Clone, Deserialize)]
pub struct OptimizerConfig {
    pub base_config: BaseConfig,
    #[serde(default)]
    pub parameter_space: ParameterSpace,
    #[serde(default)] // Use default values if the [analysis] section is missing
    pub analysis: AnalysisConfig,
}

/// Base settings for the optimization job.
#[derive(Debug, Clone, Deserialize)]
pub struct BaseConfig {
    pub strategies: Vec<StrategyId>,
    pub symbols: Vec<String>,
    pub interval: Interval,
    /// Candles for symbol `S` are read from `<data_dir>/<S>.csv`.
    pub data_dir: PathBuf,
}

/// The values to try, grouped by the config section they override.
///
/// `strategy` keys apply to the parameter table of whichever strategy a run
/// uses, so one grid can sweep e.g. `bb_period` across several strategies.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParameterSpace {
    pub dca: BTreeMap<String, ParameterRange>,
    pub simulation: BTreeMap<String, ParameterRange>,
    pub strategy: BTreeMap<String, ParameterRange>,
}

impl ParameterSpace {
    /// All parameters as `(section.name, range)` pairs in a stable order.
    pub fn entries(&self) -> Vec<(String, &ParameterRange)> {
        [("dca", &self.dca), ("simulation", &self.simulation), ("strategy", &self.strategy)]
            .into_iter()
            .flat_map(|(section, params)| {
                params.iter().map(move |(name, range)| (format!("{}.{}", section, name), range))
            })
            .collect()
    }
}

/// Configuration for the analysis and ranking of optimization results.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Hard filters to discard unacceptable runs before scoring.
    pub filters: Filters,
    /// Weights for the multi-objective scoring function. Must sum to 1.0.
    pub scoring_weights: Weights,
}

/// Hard filters to apply to the set of run summaries.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Filters {
    pub min_total_trades: usize,
    /// Largest tolerated drawdown, as a positive percentage.
    pub max_drawdown_pct: Decimal,
}

/// Weights for the scoring function.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub weight_total_return: Decimal,
    pub weight_win_rate: Decimal,
    pub weight_sharpe: Decimal,
}

// --- Default Implementations ---
// This allows a user to omit the `[analysis]` section from their toml
// and still have it work with sensible defaults.

impl Default for Filters {
    fn default() -> Self {
        Self {
            min_total_trades: 1,
            max_drawdown_pct: dec!(50),
        }
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            weight_total_return: dec!(0.5),
            weight_win_rate: dec!(0.2),
            weight_sharpe: dec!(0.3),
        }
    }
}

/// Represents a range of values for a single parameter to be tested.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParameterRange {
    DiscreteBool(Vec<bool>),
    DiscreteInt(Vec<i64>),
    DiscreteDecimal(Vec<Decimal>),
    LinearInt { start: i64, end: i64, step: i64 },
    LinearDecimal { start: Decimal, end: Decimal, step: Decimal },
}

impl OptimizerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_config.symbols.is_empty() {
            return Err(ConfigError::ValidationError("base_config.symbols is empty".to_string()));
        }
        if self.base_config.strategies.is_empty() {
            return Err(ConfigError::ValidationError("base_config.strategies is empty".to_string()));
        }
        for (name, range) in self.parameter_space.entries() {
            let bad_step = match range {
                ParameterRange::LinearInt { step, .. } => *step <= 0,
                ParameterRange::LinearDecimal { step, .. } => *step <= Decimal::ZERO,
                _ => false,
            };
            if bad_step {
                return Err(ConfigError::ValidationError(format!(
                    "parameter '{}' needs a positive step",
                    name
                )));
            }
        }
        Ok(())
    }
}
