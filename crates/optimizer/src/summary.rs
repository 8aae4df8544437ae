use crate::generator::ParameterSet;
use backtester::BacktestResult;
use core_types::StrategyId;
use rust_decimal::Decimal;
use serde::Serialize;

/// One finished grid run, reduced to the figures used for ranking and export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Position of the run in the job's grid.
    pub run: usize,
    pub strategy: StrategyId,
    pub symbol: String,
    /// The overrides this run applied to the base configuration.
    pub parameters: ParameterSet,
    pub total_return_pct: Decimal,
    pub total_trades: usize,
    pub win_rate_pct: Decimal,
    /// Mean of the trades' `pnl_pct`.
    pub avg_profit_pct: Decimal,
    pub final_capital: Decimal,
    pub max_drawdown_pct: Decimal,
    pub sharpe_ratio: Decimal,
    pub profit_exits: usize,
    pub loss_exits: usize,
    pub forced_exits: usize,
}

impl RunSummary {
    pub fn from_result(run: usize, parameters: ParameterSet, result: &BacktestResult) -> Self {
        let report = &result.report;
        Self {
            run,
            strategy: result.strategy,
            symbol: result.symbol.clone(),
            parameters,
            total_return_pct: report.total_return_pct,
            total_trades: report.total_trades,
            win_rate_pct: report.win_rate_pct,
            avg_profit_pct: report.average_trade_return_pct,
            final_capital: result.final_capital,
            max_drawdown_pct: report.max_drawdown_pct,
            sharpe_ratio: report.sharpe_ratio,
            profit_exits: report.profit_exits,
            loss_exits: report.loss_exits,
            forced_exits: report.forced_exits,
        }
    }

    /// The overrides as a compact JSON object, e.g. `{"dca.max_lots":4}`.
    pub fn parameters_json(&self) -> String {
        serde_json::to_string(&self.parameters).unwrap_or_default()
    }
}
