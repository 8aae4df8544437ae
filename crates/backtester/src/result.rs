use analytics::PerformanceReport;
use chrono::{DateTime, Utc};
use core_types::{EquitySample, Interval, StrategyId, Trade};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Everything a finished run produced. Owned by the caller; the backtester
/// keeps no reference to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub symbol: String,
    pub interval: Interval,
    pub strategy: StrategyId,
    /// The strategy's configuration as reported by `Strategy::parameters`.
    pub parameters: serde_json::Value,
    pub initial_capital: Decimal,
    pub final_capital: Decimal,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Closed positions in exit order.
    pub trades: Vec<Trade>,
    /// One sample per candle.
    pub equity_curve: Vec<EquitySample>,
    pub report: PerformanceReport,
}

impl BacktestResult {
    pub fn total_return_pct(&self) -> Decimal {
        self.report.total_return_pct
    }

    pub fn win_rate_pct(&self) -> Decimal {
        self.report.win_rate_pct
    }

    pub fn max_drawdown_pct(&self) -> Decimal {
        self.report.max_drawdown_pct
    }

    pub fn sharpe_ratio(&self) -> Decimal {
        self.report.sharpe_ratio
    }
}
