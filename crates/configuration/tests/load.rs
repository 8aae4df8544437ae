use configuration::{ParameterRange, load_config, load_optimizer_config};
use core_types::{Interval, StrategyId};
use rust_decimal_macros::dec;
use std::io::Write;

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn loads_partial_file_with_defaults() {
    let file = write_temp(
        r#"
[backtest]
symbol = "ETHUSDT"
interval = "1d"
strategy = "hybrid_smart"

[dca]
max_lots = 4
lot_interval_pct = 5

[strategies.hybrid_smart]
cooldown_minutes = 240
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.backtest.symbol, "ETHUSDT");
    assert_eq!(config.backtest.interval, Interval::OneDay);
    assert_eq!(config.backtest.strategy, StrategyId::HybridSmart);
    assert_eq!(config.dca.max_lots, 4);
    assert_eq!(config.dca.lot_interval_pct, dec!(5));
    assert_eq!(config.dca.profit_target_pct, dec!(5));
    assert_eq!(config.strategies.hybrid_smart.cooldown_minutes, 240);
    assert_eq!(config.strategies.hybrid_smart.bb_period, 20);
}

#[test]
fn invalid_values_fail_validation() {
    let file = write_temp("[dca]\nstop_loss_pct = 2\n");
    assert!(load_config(file.path()).is_err());
}

#[test]
fn loads_optimizer_grid() {
    let file = write_temp(
        r#"
[base_config]
strategies = ["rsi", "macd"]
symbols = ["BTCUSDT"]
interval = "1h"
data_dir = "data"

[parameter_space.dca]
max_lots = [4, 6]
profit_target_pct = { start = 3, end = 5, step = 1 }
lot_interval_pct = [7.5, 10.0]

[parameter_space.strategy]
use_ma_filter = [true, false]
"#,
    );

    let grid = load_optimizer_config(file.path()).unwrap();
    assert_eq!(grid.base_config.strategies, vec![StrategyId::Rsi, StrategyId::Macd]);
    let dca = &grid.parameter_space.dca;
    assert_eq!(dca["max_lots"], ParameterRange::DiscreteInt(vec![4, 6]));
    assert!(matches!(
        dca["profit_target_pct"],
        ParameterRange::LinearInt { start: 3, end: 5, step: 1 }
    ));
    assert!(matches!(dca["lot_interval_pct"], ParameterRange::DiscreteDecimal(_)));
    assert_eq!(
        grid.parameter_space.strategy["use_ma_filter"],
        ParameterRange::DiscreteBool(vec![true, false])
    );

    let names: Vec<String> = grid.parameter_space.entries().into_iter().map(|(n, _)| n).collect();
    assert_eq!(
        names,
        vec![
            "dca.lot_interval_pct",
            "dca.max_lots",
            "dca.profit_target_pct",
            "strategy.use_ma_filter"
        ]
    );
    assert_eq!(grid.analysis.filters.min_total_trades, 1);
}

#[test]
fn rejects_non_positive_steps() {
    let file = write_temp(
        r#"
[base_config]
strategies = ["rsi"]
symbols = ["BTCUSDT"]
interval = "1h"
data_dir = "data"

[parameter_space.strategy]
rsi_period = { start = 10, end = 20, step = 0 }
"#,
    );
    assert!(load_optimizer_config(file.path()).is_err());
}
