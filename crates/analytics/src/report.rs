use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A comprehensive, standardized report of a strategy's performance.
///
/// This struct is the final output of the `AnalyticsEngine` and serves as the
/// data transfer object for performance results throughout the entire system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    // I. Core Profitability Metrics
    pub initial_capital: Decimal,
    pub final_capital: Decimal,
    pub total_net_profit: Decimal,
    /// `(final - initial) / initial * 100`.
    pub total_return_pct: Decimal,
    pub gross_profit: Decimal,
    pub gross_loss: Decimal,
    pub profit_factor: Option<Decimal>, // Option<> because it can be infinite if GrossLoss is 0

    // II. Risk and Drawdown
    /// Largest peak-to-trough decline in quote currency.
    pub max_drawdown: Decimal,
    /// Largest peak-to-trough decline in percent of the peak. Zero or negative.
    pub max_drawdown_pct: Decimal,
    /// Annualised; zero when the returns have no dispersion or are too few.
    pub sharpe_ratio: Decimal,
    pub calmar_ratio: Option<Decimal>, // Option<> for cases with no drawdown

    // III. Trade-Level Statistics
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Zero when there are no trades.
    pub win_rate_pct: Decimal,
    pub profit_exits: usize,
    pub loss_exits: usize,
    pub forced_exits: usize,
    pub average_win: Decimal,
    pub average_loss: Decimal,
    pub payoff_ratio: Option<Decimal>, // Option<> because avg_loss can be 0
    /// Mean of per-trade `pnl_pct`.
    pub average_trade_return_pct: Decimal,
    pub average_lots_per_trade: Decimal,

    // IV. Time-Based Metrics
    #[serde(with = "humantime_serde")]
    pub average_holding_period: Duration,
}

impl PerformanceReport {
    /// Creates a new, zeroed-out PerformanceReport.
    /// This is useful as a default or starting point before calculations.
    pub fn new() -> Self {
        Self {
            initial_capital: Decimal::ZERO,
            final_capital: Decimal::ZERO,
            total_net_profit: Decimal::ZERO,
            total_return_pct: Decimal::ZERO,
            gross_profit: Decimal::ZERO,
            gross_loss: Decimal::ZERO,
            profit_factor: None,
            max_drawdown: Decimal::ZERO,
            max_drawdown_pct: Decimal::ZERO,
            sharpe_ratio: Decimal::ZERO,
            calmar_ratio: None,
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            win_rate_pct: Decimal::ZERO,
            profit_exits: 0,
            loss_exits: 0,
            forced_exits: 0,
            average_win: Decimal::ZERO,
            average_loss: Decimal::ZERO,
            payoff_ratio: None,
            average_trade_return_pct: Decimal::ZERO,
            average_lots_per_trade: Decimal::ZERO,
            average_holding_period: Duration::ZERO,
        }
    }
}

impl Default for PerformanceReport {
    fn default() -> Self {
        Self::new()
    }
}
