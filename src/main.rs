use analyzer::{Analyzer, RankedRun};
use anyhow::Context;
use backtester::{Backtester, BacktestResult};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use configuration::{Strategies, init_tracing, load_config, load_optimizer_config};
use core_types::StrategyId;
use optimizer::Optimizer;
use optimizer::export::{write_equity_csv, write_summaries_csv, write_trades_csv};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::time::Duration;

/// The main entry point for the Tranche backtesting application.
fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the appropriate command
    match cli.command {
        Commands::Backtest(args) => handle_backtest(args),
        Commands::Optimize(args) => handle_optimize(args),
        Commands::Strategies => handle_strategies(),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Backtests DCA entry strategies against historical candles.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single backtest.
    Backtest(BacktestArgs),
    /// Run a parameter grid and rank the results.
    Optimize(OptimizeArgs),
    /// List the available strategies and their default parameters.
    Strategies,
}

#[derive(Parser)]
struct BacktestArgs {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Candle CSV file. Overrides `backtest.data_path`.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Overrides `backtest.symbol`.
    #[arg(long)]
    symbol: Option<String>,

    /// Overrides `backtest.strategy` (e.g. "rsi", "proximity_bollinger").
    #[arg(long)]
    strategy: Option<StrategyId>,

    /// Only use candles at or after this time (RFC 3339).
    #[arg(long)]
    from: Option<DateTime<Utc>>,

    /// Only use candles at or before this time (RFC 3339).
    #[arg(long)]
    to: Option<DateTime<Utc>>,

    /// Write the trade ledger to this CSV file.
    #[arg(long)]
    trades_out: Option<PathBuf>,

    /// Write the equity curve to this CSV file.
    #[arg(long)]
    equity_out: Option<PathBuf>,
}

#[derive(Parser)]
struct OptimizeArgs {
    /// Path to the TOML configuration file used as the base of every run.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Path to the grid definition.
    #[arg(long, default_value = "optimizer.toml")]
    grid: PathBuf,

    /// Write one row per run to this CSV file.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Number of ranked runs to print.
    #[arg(long, default_value_t = 10)]
    top: usize,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_backtest(args: BacktestArgs) -> anyhow::Result<()> {
    let mut config = load_config(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(symbol) = args.symbol {
        config.backtest.symbol = symbol;
    }
    if let Some(strategy) = args.strategy {
        config.backtest.strategy = strategy;
    }
    let _guard = init_tracing(&config.logging)?;

    let data_path = args
        .data
        .or_else(|| config.backtest.data_path.clone())
        .context("no candle file: pass --data or set backtest.data_path")?;
    let (candles, quality) = market_data::load_candles_csv(&data_path)
        .with_context(|| format!("loading candles from {}", data_path.display()))?;
    let candles = market_data::filter_range(&candles, args.from, args.to);
    tracing::info!(
        rows_read = quality.rows_read,
        candles = candles.len(),
        symbol = %config.backtest.symbol,
        strategy = %config.backtest.strategy,
        "Starting backtest"
    );

    let mut backtester = Backtester::from_config(&config)?.with_progress_bar()?;
    let result = backtester.run(&candles)?;

    print_result(&result);

    if let Some(path) = args.trades_out {
        write_trades_csv(&path, &result.trades)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(path) = args.equity_out {
        write_equity_csv(&path, &result.equity_curve)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

fn handle_optimize(args: OptimizeArgs) -> anyhow::Result<()> {
    let config = load_config(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let _guard = init_tracing(&config.logging)?;
    let grid = load_optimizer_config(&args.grid)
        .with_context(|| format!("loading {}", args.grid.display()))?;

    let analysis = grid.analysis.clone();
    let optimizer = Optimizer::new(grid, config).with_progress_bar();
    let outcome = optimizer.run()?;
    println!(
        "Job {}: {} runs completed, {} failed.",
        outcome.job_id,
        outcome.summaries.len(),
        outcome.failed_runs
    );

    if let Some(path) = &args.out {
        write_summaries_csv(path, &outcome.summaries)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    let ranked = Analyzer::new(analysis).run(&outcome.summaries)?;
    print_ranking(&ranked, args.top);
    Ok(())
}

fn handle_strategies() -> anyhow::Result<()> {
    let defaults = Strategies::default();
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Strategy", "Min history", "Default parameters"]);

    for id in StrategyId::ALL {
        let strategy = strategies::create_strategy(id, &defaults)?;
        table.add_row(vec![
            id.to_string(),
            strategy.min_history().to_string(),
            strategy.parameters().to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

// ==============================================================================
// Output
// ==============================================================================

fn fmt(value: Decimal, dp: u32) -> String {
    value.round_dp(dp).to_string()
}

fn fmt_opt(value: Option<Decimal>, dp: u32) -> String {
    value.map_or_else(|| "-".to_string(), |v| fmt(v, dp))
}

fn print_result(result: &BacktestResult) {
    let report = &result.report;
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Metric", "Value"]);

    let rows = [
        ("Symbol", result.symbol.clone()),
        ("Strategy", result.strategy.to_string()),
        ("Period", format!("{} .. {}", result.start, result.end)),
        ("Initial capital", fmt(result.initial_capital, 2)),
        ("Final capital", fmt(result.final_capital, 2)),
        ("Total return %", fmt(report.total_return_pct, 4)),
        ("Max drawdown %", fmt(report.max_drawdown_pct, 4)),
        ("Sharpe ratio", fmt(report.sharpe_ratio, 4)),
        ("Calmar ratio", fmt_opt(report.calmar_ratio, 4)),
        ("Trades", report.total_trades.to_string()),
        ("Win rate %", fmt(report.win_rate_pct, 2)),
        (
            "Exits (profit/loss/forced)",
            format!("{}/{}/{}", report.profit_exits, report.loss_exits, report.forced_exits),
        ),
        ("Profit factor", fmt_opt(report.profit_factor, 4)),
        ("Average trade %", fmt(report.average_trade_return_pct, 4)),
        ("Average lots per trade", fmt(report.average_lots_per_trade, 2)),
        (
            "Average holding period",
            format_holding_period(report.average_holding_period),
        ),
    ];
    for (name, value) in rows {
        table.add_row(vec![name.to_string(), value]);
    }
    println!("{table}");
}

/// Whole seconds are enough for a holding period.
fn format_holding_period(period: Duration) -> String {
    humantime::format_duration(Duration::from_secs(period.as_secs())).to_string()
}

fn print_ranking(ranked: &[RankedRun], top: usize) {
    if ranked.is_empty() {
        println!("No run passed the analysis filters.");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Rank", "Score", "Strategy", "Symbol", "Parameters", "Return %", "Trades", "Win rate %",
        "Max DD %", "Sharpe",
    ]);
    for ranked_run in ranked.iter().take(top) {
        let s = &ranked_run.summary;
        table.add_row(vec![
            ranked_run.rank.to_string(),
            fmt(ranked_run.score, 4),
            s.strategy.to_string(),
            s.symbol.clone(),
            s.parameters_json(),
            fmt(s.total_return_pct, 2),
            s.total_trades.to_string(),
            fmt(s.win_rate_pct, 2),
            fmt(s.max_drawdown_pct, 2),
            fmt(s.sharpe_ratio, 3),
        ]);
    }
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holding_periods_drop_sub_second_noise() {
        let period = Duration::from_secs(30 * 3_600 + 90) + Duration::from_millis(250);
        assert_eq!(format_holding_period(period), "1day 6h 1m 30s");
        assert_eq!(format_holding_period(Duration::ZERO), "0s");
    }
}
