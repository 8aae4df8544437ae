use analytics::AnalyticsEngine;
use backtester::error::BacktestError;
use backtester::{Backtester, EngineSettings};
use chrono::{DateTime, Duration, TimeZone, Utc};
use configuration::{Dca, Simulation};
use core_types::{Candle, ExitReason, Interval, Signal, StrategyId};
use executor::SimulatedExecutor;
use risk::EqualLotSizer;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::{Arc, Mutex};
use strategies::{Strategy, StrategyError};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn candles(closes: &[Decimal]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| Candle {
            timestamp: t0() + Duration::hours(i as i64),
            open: *close,
            high: *close,
            low: *close,
            close: *close,
            volume: dec!(1),
        })
        .collect()
}

/// (index of the current candle, window length) for every call.
type CallLog = Arc<Mutex<Vec<(usize, usize)>>>;

/// Emits `Buy` on the listed candle indices (or on every call when `None`).
struct Scripted {
    buy_on: Option<Vec<usize>>,
    calls: CallLog,
}

impl Scripted {
    fn new(buy_on: Option<Vec<usize>>) -> (Self, CallLog) {
        let calls = CallLog::default();
        (Self { buy_on, calls: calls.clone() }, calls)
    }
}

impl Strategy for Scripted {
    fn id(&self) -> StrategyId {
        StrategyId::Rsi
    }

    fn min_history(&self) -> usize {
        1
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({ "scripted": true })
    }

    fn generate_signal(
        &mut self,
        window: &[Candle],
        _now: Option<DateTime<Utc>>,
    ) -> Result<Signal, StrategyError> {
        let last = window.last().expect("window is never empty");
        let index = (last.timestamp - t0()).num_hours() as usize;
        self.calls.lock().unwrap().push((index, window.len()));

        let buy = self.buy_on.as_ref().is_none_or(|indices| indices.contains(&index));
        Ok(if buy { Signal::Buy } else { Signal::Hold })
    }
}

struct Setup {
    simulation: Simulation,
    dca: Dca,
    warmup_candles: usize,
    history_window: Option<usize>,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            simulation: Simulation {
                initial_capital: dec!(1000000),
                fee_rate: Decimal::ZERO,
                slippage_rate: Decimal::ZERO,
                capital_fraction: Decimal::ONE,
            },
            dca: Dca {
                profit_target_pct: dec!(5),
                stop_loss_pct: dec!(-7),
                max_lots: 6,
                lot_interval_pct: dec!(10),
            },
            warmup_candles: 1,
            history_window: None,
        }
    }
}

impl Setup {
    fn backtester(&self, strategy: Scripted) -> Backtester {
        let settings = EngineSettings {
            initial_capital: self.simulation.initial_capital,
            warmup_candles: self.warmup_candles,
            history_window: self.history_window,
            dca: self.dca.clone(),
        };
        Backtester::new(
            "TESTUSDT".to_string(),
            Interval::OneHour,
            settings,
            Box::new(strategy),
            Box::new(EqualLotSizer::new(&self.simulation, &self.dca).unwrap()),
            Box::new(SimulatedExecutor::new(&self.simulation)),
            AnalyticsEngine::new(),
        )
    }

    fn lot_budget(&self) -> Decimal {
        EqualLotSizer::new(&self.simulation, &self.dca).unwrap().lot_budget()
    }
}

#[test]
fn second_lot_then_recovery_closes_in_profit() {
    let setup = Setup::default();
    let (strategy, _) = Scripted::new(Some(vec![0]));
    let series = candles(&[dec!(100), dec!(90), dec!(100)]);

    let result = setup.backtester(strategy).run(&series).unwrap();

    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.exit_reason, ExitReason::Profit);
    assert_eq!(trade.lot_count(), 2);
    assert_eq!(trade.lots[1].price, dec!(90));
    assert_eq!(trade.exit_timestamp, series[2].timestamp);
    // Blended entry is 2 / (1/100 + 1/90) ~ 94.74, so 100 is ~5.56% above it.
    assert!((trade.average_price() - dec!(94.7368421)).abs() < dec!(0.0000001));

    // Each lot spends one budget B; selling B/100 + B/90 units at 100 returns 2B + B/9.
    let expected = dec!(1000000) + setup.lot_budget() / dec!(9);
    assert!((result.final_capital - expected).abs() < dec!(0.000001));
    assert!(trade.pnl > Decimal::ZERO);

    assert_eq!(result.equity_curve.len(), 3);
    assert_eq!(result.equity_curve[2].portfolio_value, result.final_capital);
    assert_eq!(result.report.win_rate_pct, dec!(100));
}

#[test]
fn stop_loss_fires_only_once_every_lot_is_filled() {
    let setup = Setup::default();
    let (strategy, _) = Scripted::new(Some(vec![0]));
    let series = candles(&[dec!(100), dec!(90), dec!(80), dec!(70), dec!(60), dec!(50), dec!(51)]);

    let result = setup.backtester(strategy).run(&series).unwrap();

    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    // Down ~15% or more on every candle from 80, but only the sixth lot arms the stop.
    assert_eq!(trade.exit_reason, ExitReason::Loss);
    assert_eq!(trade.lot_count(), 6);
    assert_eq!(trade.exit_timestamp, series[5].timestamp);
    let prices: Vec<Decimal> = trade.lots.iter().map(|l| l.price).collect();
    assert_eq!(prices, vec![dec!(100), dec!(90), dec!(80), dec!(70), dec!(60), dec!(50)]);
    assert_eq!(result.report.loss_exits, 1);
}

#[test]
fn open_position_is_liquidated_at_the_end() {
    let setup = Setup::default();
    let (strategy, _) = Scripted::new(Some(vec![0]));
    let series = candles(&[dec!(100), dec!(95), dec!(97)]);

    let result = setup.backtester(strategy).run(&series).unwrap();

    assert_eq!(result.trades.len(), 1);
    assert_eq!(result.trades[0].exit_reason, ExitReason::Forced);
    assert_eq!(result.trades[0].exit_price, dec!(97));
    assert_eq!(result.report.forced_exits, 1);

    let last = result.equity_curve.last().unwrap();
    assert_eq!(last.timestamp, series[2].timestamp);
    assert_eq!(last.portfolio_value, result.final_capital);
    assert!(result.final_capital < result.initial_capital);
}

#[test]
fn closing_tick_does_not_reopen() {
    let setup = Setup::default();
    let (strategy, calls) = Scripted::new(None);
    let series = candles(&[dec!(100), dec!(106), dec!(100)]);

    let result = setup.backtester(strategy).run(&series).unwrap();

    let reasons: Vec<ExitReason> = result.trades.iter().map(|t| t.exit_reason).collect();
    assert_eq!(reasons, vec![ExitReason::Profit, ExitReason::Forced]);
    let indices: Vec<usize> = calls.lock().unwrap().iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, vec![0, 2]);
}

#[test]
fn unaffordable_lots_are_skipped_without_error() {
    let setup = Setup {
        simulation: Simulation { initial_capital: dec!(1000), ..Setup::default().simulation },
        dca: Dca { max_lots: 2, ..Setup::default().dca },
        ..Setup::default()
    };
    let (strategy, _) = Scripted::new(Some(vec![0, 3]));
    let series = candles(&[dec!(100), dec!(90), dec!(80), dec!(80), dec!(72), dec!(60)]);

    let result = setup.backtester(strategy).run(&series).unwrap();

    assert_eq!(result.trades.len(), 2);
    assert_eq!(result.trades[0].exit_reason, ExitReason::Loss);
    assert_eq!(result.trades[0].lot_count(), 2);
    // Cash after the loss covers one 500 lot but not a second one.
    assert_eq!(result.trades[1].lot_count(), 1);
    assert_eq!(result.trades[1].exit_reason, ExitReason::Forced);
    assert!(result.final_capital > Decimal::ZERO);
}

#[test]
fn warmup_delays_decisions_but_not_equity() {
    let setup = Setup { warmup_candles: 3, ..Setup::default() };
    let (strategy, calls) = Scripted::new(Some(vec![]));
    let series = candles(&[dec!(100), dec!(101), dec!(102), dec!(103)]);

    let result = setup.backtester(strategy).run(&series).unwrap();

    let indices: Vec<usize> = calls.lock().unwrap().iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, vec![2, 3]);
    assert_eq!(result.equity_curve.len(), 4);
    assert!(result.equity_curve.iter().all(|s| s.portfolio_value == dec!(1000000)));
}

#[test]
fn history_window_bounds_what_the_strategy_sees() {
    let setup = Setup { history_window: Some(2), ..Setup::default() };
    let (strategy, calls) = Scripted::new(Some(vec![]));
    let series = candles(&[dec!(100), dec!(101), dec!(102), dec!(103)]);

    setup.backtester(strategy).run(&series).unwrap();

    let lengths: Vec<usize> = calls.lock().unwrap().iter().map(|(_, len)| *len).collect();
    assert_eq!(lengths, vec![1, 2, 2, 2]);
}

#[test]
fn identical_runs_serialize_identically() {
    let setup = Setup {
        simulation: Simulation {
            fee_rate: dec!(0.0005),
            slippage_rate: dec!(0.001),
            ..Setup::default().simulation
        },
        ..Setup::default()
    };
    let closes: Vec<Decimal> = (0..120i64)
        .map(|i| dec!(100) + Decimal::from((i * 37) % 23) - Decimal::from(i % 17))
        .collect();
    let series = candles(&closes);

    let run = || {
        let (strategy, _) = Scripted::new(None);
        serde_json::to_string(&setup.backtester(strategy).run(&series).unwrap()).unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn invalid_series_are_rejected_up_front() {
    let setup = Setup { warmup_candles: 5, ..Setup::default() };

    let (strategy, _) = Scripted::new(None);
    assert!(matches!(
        setup.backtester(strategy).run(&[]),
        Err(BacktestError::DataUnavailable)
    ));

    let (strategy, _) = Scripted::new(None);
    assert!(matches!(
        setup.backtester(strategy).run(&candles(&[dec!(1), dec!(2), dec!(3)])),
        Err(BacktestError::InsufficientHistory { required: 5, available: 3 })
    ));

    let mut series = candles(&[dec!(1), dec!(2), dec!(3), dec!(4), dec!(5)]);
    series[2].timestamp = series[1].timestamp;
    let (strategy, calls) = Scripted::new(None);
    assert!(matches!(
        setup.backtester(strategy).run(&series),
        Err(BacktestError::UnorderedCandles { index: 2 })
    ));
    assert!(calls.lock().unwrap().is_empty());
}
