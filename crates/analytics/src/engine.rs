use crate::error::AnalyticsError;
use crate::report::PerformanceReport;
use core_types::{EquitySample, ExitReason, Interval, Trade};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use std::time::Duration;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// A stateless calculator for deriving performance metrics from trading activity.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// # Arguments
    ///
    /// * `trades` - All closed `Trade`s, in exit order.
    /// * `equity_curve` - One portfolio value per candle.
    /// * `initial_capital` / `final_capital` - Cash before and after the run.
    /// * `interval` - Candle granularity, used to annualise the Sharpe ratio.
    ///
    /// Drawdown and Sharpe come from the equity curve and are computed even
    /// when no trade was closed.
    pub fn calculate(
        &self,
        trades: &[Trade],
        equity_curve: &[EquitySample],
        initial_capital: Decimal,
        final_capital: Decimal,
        interval: Interval,
    ) -> Result<PerformanceReport, AnalyticsError> {
        if initial_capital <= Decimal::ZERO {
            return Err(AnalyticsError::InvalidInput(format!(
                "initial capital must be positive, got {}",
                initial_capital
            )));
        }

        let mut report = PerformanceReport::new();
        report.initial_capital = initial_capital;
        report.final_capital = final_capital;
        report.total_net_profit = final_capital - initial_capital;
        report.total_return_pct = report.total_net_profit / initial_capital * HUNDRED;

        self.calculate_profitability(trades, &mut report);
        self.calculate_drawdown(equity_curve, &mut report);
        self.calculate_ratios(equity_curve, interval, &mut report)?;
        self.calculate_time_metrics(trades, &mut report);

        tracing::debug!(
            trades = report.total_trades,
            total_return_pct = %report.total_return_pct,
            max_drawdown_pct = %report.max_drawdown_pct,
            sharpe = %report.sharpe_ratio,
            "Performance report calculated"
        );
        Ok(report)
    }

    /// Calculates all trade-ledger metrics.
    fn calculate_profitability(&self, trades: &[Trade], report: &mut PerformanceReport) {
        report.total_trades = trades.len();
        if trades.is_empty() {
            return;
        }

        let mut total_pnl_pct = Decimal::ZERO;
        let mut total_lots = 0usize;

        for trade in trades {
            if trade.is_win() {
                report.gross_profit += trade.pnl;
                report.winning_trades += 1;
            } else {
                report.gross_loss += trade.pnl.abs();
                report.losing_trades += 1;
            }

            match trade.exit_reason {
                ExitReason::Profit => report.profit_exits += 1,
                ExitReason::Loss => report.loss_exits += 1,
                ExitReason::Forced => report.forced_exits += 1,
            }

            total_pnl_pct += trade.pnl_pct;
            total_lots += trade.lot_count();
        }

        let count = Decimal::from(trades.len());

        // --- Ratios ---
        if report.gross_loss > Decimal::ZERO {
            report.profit_factor = Some(report.gross_profit / report.gross_loss);
        }

        report.win_rate_pct = Decimal::from(report.winning_trades) / count * HUNDRED;
        report.average_trade_return_pct = total_pnl_pct / count;
        report.average_lots_per_trade = Decimal::from(total_lots) / count;

        if report.winning_trades > 0 {
            report.average_win = report.gross_profit / Decimal::from(report.winning_trades);
        }

        if report.losing_trades > 0 {
            report.average_loss = report.gross_loss / Decimal::from(report.losing_trades);
            if report.average_loss > Decimal::ZERO {
                report.payoff_ratio = Some(report.average_win / report.average_loss);
            }
        }
    }

    /// Calculates maximum drawdown from the equity curve.
    ///
    /// `max_drawdown_pct` is the minimum over time of
    /// `(equity - running_peak) / running_peak * 100`, so it is never positive.
    fn calculate_drawdown(&self, equity_curve: &[EquitySample], report: &mut PerformanceReport) {
        let Some(first) = equity_curve.first() else {
            return;
        };

        let mut peak = first.portfolio_value;
        let mut max_drawdown = Decimal::ZERO;
        let mut max_drawdown_pct = Decimal::ZERO;

        for sample in equity_curve {
            let equity = sample.portfolio_value;
            if equity > peak {
                peak = equity;
            }
            max_drawdown = max_drawdown.max(peak - equity);
            if peak > Decimal::ZERO {
                max_drawdown_pct = max_drawdown_pct.min((equity - peak) / peak * HUNDRED);
            }
        }

        report.max_drawdown = max_drawdown;
        report.max_drawdown_pct = max_drawdown_pct;
    }

    /// Calculates the Sharpe and Calmar ratios.
    fn calculate_ratios(
        &self,
        equity_curve: &[EquitySample],
        interval: Interval,
        report: &mut PerformanceReport,
    ) -> Result<(), AnalyticsError> {
        // --- Calmar Ratio ---
        if report.max_drawdown_pct < Decimal::ZERO {
            report.calmar_ratio = Some(report.total_return_pct / report.max_drawdown_pct.abs());
        }

        // --- Sharpe Ratio ---
        // 1. Periodic (per-candle) returns
        let returns: Vec<Decimal> = equity_curve
            .windows(2)
            .filter(|w| !w[0].portfolio_value.is_zero())
            .map(|w| (w[1].portfolio_value - w[0].portfolio_value) / w[0].portfolio_value)
            .collect();

        if returns.len() < 2 {
            return Ok(());
        }

        // 2. Mean and population standard deviation
        let n = Decimal::from(returns.len());
        let mean_return = returns.iter().sum::<Decimal>() / n;
        let variance = returns
            .iter()
            .map(|r| (*r - mean_return) * (*r - mean_return))
            .sum::<Decimal>()
            / n;

        if variance <= Decimal::ZERO {
            return Ok(());
        }

        let std_dev = variance
            .sqrt()
            .ok_or_else(|| AnalyticsError::Calculation("square root of variance".to_string()))?;
        if std_dev.is_zero() {
            return Ok(());
        }

        // 3. Annualise by sqrt(periods per year), risk-free rate assumed zero
        let annualisation = Decimal::from(interval.periods_per_year())
            .sqrt()
            .ok_or_else(|| AnalyticsError::Calculation("annualisation factor".to_string()))?;
        report.sharpe_ratio = mean_return / std_dev * annualisation;

        Ok(())
    }

    /// Calculates time-based metrics.
    fn calculate_time_metrics(&self, trades: &[Trade], report: &mut PerformanceReport) {
        if trades.is_empty() {
            return;
        }

        let total_secs: i64 = trades.iter().map(|t| t.holding_period().num_seconds()).sum();
        let avg_secs = total_secs / trades.len() as i64;
        report.average_holding_period = Duration::from_secs(avg_secs.max(0) as u64);
    }
}
