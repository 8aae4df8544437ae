use crate::error::OptimizerError;
use crate::summary::RunSummary;
use chrono::{DateTime, Utc};
use core_types::{EquitySample, ExitReason, Trade};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct SummaryRow<'a> {
    run: usize,
    strategy: &'a str,
    symbol: &'a str,
    parameters: String,
    total_return_pct: Decimal,
    total_trades: usize,
    win_rate_pct: Decimal,
    avg_profit_pct: Decimal,
    final_capital: Decimal,
    max_drawdown_pct: Decimal,
    sharpe_ratio: Decimal,
    profit_exits: usize,
    loss_exits: usize,
    forced_exits: usize,
}

#[derive(Serialize)]
struct TradeRow {
    trade: usize,
    entry_timestamp: Option<DateTime<Utc>>,
    exit_timestamp: DateTime<Utc>,
    lots: usize,
    total_quantity: Decimal,
    average_price: Decimal,
    exit_price: Decimal,
    exit_reason: ExitReason,
    pnl: Decimal,
    pnl_pct: Decimal,
}

/// Writes one row per grid run.
pub fn write_summaries_csv(path: &Path, summaries: &[RunSummary]) -> Result<(), OptimizerError> {
    let mut writer = csv::Writer::from_path(path)?;
    for summary in summaries {
        writer.serialize(SummaryRow {
            run: summary.run,
            strategy: summary.strategy.as_str(),
            symbol: &summary.symbol,
            parameters: summary.parameters_json(),
            total_return_pct: summary.total_return_pct.round_dp(6),
            total_trades: summary.total_trades,
            win_rate_pct: summary.win_rate_pct.round_dp(6),
            avg_profit_pct: summary.avg_profit_pct.round_dp(6),
            final_capital: summary.final_capital.round_dp(8),
            max_drawdown_pct: summary.max_drawdown_pct.round_dp(6),
            sharpe_ratio: summary.sharpe_ratio.round_dp(6),
            profit_exits: summary.profit_exits,
            loss_exits: summary.loss_exits,
            forced_exits: summary.forced_exits,
        })?;
    }
    writer.flush()?;
    tracing::info!(path = %path.display(), rows = summaries.len(), "Wrote run summaries");
    Ok(())
}

/// Writes the trade ledger of one run, one row per closed position.
pub fn write_trades_csv(path: &Path, trades: &[Trade]) -> Result<(), OptimizerError> {
    let mut writer = csv::Writer::from_path(path)?;
    for (index, trade) in trades.iter().enumerate() {
        writer.serialize(TradeRow {
            trade: index + 1,
            entry_timestamp: trade.entry_timestamp(),
            exit_timestamp: trade.exit_timestamp,
            lots: trade.lot_count(),
            total_quantity: trade.total_quantity(),
            average_price: trade.average_price().round_dp(8),
            exit_price: trade.exit_price,
            exit_reason: trade.exit_reason,
            pnl: trade.pnl.round_dp(8),
            pnl_pct: trade.pnl_pct.round_dp(6),
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_equity_csv(path: &Path, equity_curve: &[EquitySample]) -> Result<(), OptimizerError> {
    let mut writer = csv::Writer::from_path(path)?;
    for sample in equity_curve {
        writer.serialize(sample)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_types::{Lot, StrategyId};
    use rust_decimal_macros::dec;

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn summary_rows_flatten_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.csv");
        let summary = RunSummary {
            run: 0,
            strategy: StrategyId::ProximityBollinger,
            symbol: "BTCUSDT".to_string(),
            parameters: [("dca.max_lots".to_string(), serde_json::json!(4))].into_iter().collect(),
            total_return_pct: dec!(12.5),
            total_trades: 3,
            win_rate_pct: dec!(66.666666666),
            avg_profit_pct: dec!(4.1),
            final_capital: dec!(1125000),
            max_drawdown_pct: dec!(-8),
            sharpe_ratio: dec!(1.2),
            profit_exits: 2,
            loss_exits: 1,
            forced_exits: 0,
        };

        write_summaries_csv(&path, &[summary]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "run,strategy,symbol,parameters,total_return_pct,total_trades,win_rate_pct,avg_profit_pct,\
             final_capital,max_drawdown_pct,sharpe_ratio,profit_exits,loss_exits,forced_exits"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("0,proximity_bollinger,BTCUSDT,\"{\"\"dca.max_lots\"\":4}\",12.5,3,66.666667"));
    }

    #[test]
    fn trade_and_equity_exports() {
        let dir = tempfile::tempdir().unwrap();
        let trade = Trade {
            lots: vec![
                Lot { price: dec!(100), quantity: dec!(1), timestamp: ts(0), sequence: 1 },
                Lot { price: dec!(90), quantity: dec!(1), timestamp: ts(1), sequence: 2 },
            ],
            exit_price: dec!(100),
            exit_timestamp: ts(2),
            exit_reason: ExitReason::Profit,
            pnl: dec!(10),
            pnl_pct: dec!(5.2631578947),
        };

        let trades_path = dir.path().join("trades.csv");
        write_trades_csv(&trades_path, &[trade]).unwrap();
        let text = std::fs::read_to_string(&trades_path).unwrap();
        assert!(text.lines().nth(1).unwrap().contains(",2,2,95,100,profit,10,5.263158"));

        let equity_path = dir.path().join("equity.csv");
        let curve = [EquitySample { timestamp: ts(0), portfolio_value: dec!(1000) }];
        write_equity_csv(&equity_path, &curve).unwrap();
        let text = std::fs::read_to_string(&equity_path).unwrap();
        assert_eq!(text, "timestamp,portfolio_value\n2024-01-01T00:00:00Z,1000\n");
    }
}
