//! # Backtester
//!
//! The event loop that walks a candle series and turns strategy signals into
//! DCA positions, fills and closed trades.
//!
//! Per candle, in this order:
//!
//! 1. Nothing happens until `warmup_candles` candles have been seen.
//! 2. With a position open: buy the next lot if its trigger price was reached,
//!    then check the exit rules. A position closed here cannot be replaced in
//!    the same candle.
//! 3. Without a position: ask the strategy; on `Buy`, open a position with the
//!    first lot if cash allows.
//! 4. Record cash plus the position's value at the close.
//!
//! A position still open after the last candle is sold at the last close
//! with `ExitReason::Forced`.

use crate::error::BacktestError;
use analytics::AnalyticsEngine;
use configuration::{Config, Dca};
use core_types::{Candle, EquitySample, ExitReason, Interval, OrderRequest, Signal, Trade};
use executor::{Executor, Portfolio, SimulatedExecutor};
use indicatif::{ProgressBar, ProgressStyle};
use risk::{EqualLotSizer, RiskManager};
use rust_decimal::Decimal;
use strategies::Strategy;

pub mod error;
pub mod result;

pub use result::BacktestResult;

/// The run-level settings the event loop needs.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub initial_capital: Decimal,
    pub warmup_candles: usize,
    pub history_window: Option<usize>,
    pub dca: Dca,
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            initial_capital: config.simulation.initial_capital,
            warmup_candles: config.backtest.warmup_candles,
            history_window: config.backtest.history_window,
            dca: config.dca.clone(),
        }
    }
}

/// The main backtesting engine.
///
/// One `Backtester` performs one run. Build a new one (and with it a fresh
/// strategy) for every run.
pub struct Backtester {
    // --- Context ---
    symbol: String,
    interval: Interval,
    settings: EngineSettings,
    // --- Components ---
    strategy: Box<dyn Strategy>,
    risk_manager: Box<dyn RiskManager>,
    executor: Box<dyn Executor>,
    analytics_engine: AnalyticsEngine,
    progress_bar: Option<ProgressBar>,
}

impl Backtester {
    pub fn new(
        symbol: String,
        interval: Interval,
        settings: EngineSettings,
        strategy: Box<dyn Strategy>,
        risk_manager: Box<dyn RiskManager>,
        executor: Box<dyn Executor>,
        analytics_engine: AnalyticsEngine,
    ) -> Self {
        Self {
            symbol,
            interval,
            settings,
            strategy,
            risk_manager,
            executor,
            analytics_engine,
            progress_bar: None,
        }
    }

    /// Wires the standard components (configured strategy, equal lot sizing,
    /// simulated fills) from a validated `Config`.
    pub fn from_config(config: &Config) -> Result<Self, BacktestError> {
        let strategy = strategies::create_strategy(config.backtest.strategy, &config.strategies)?;
        let risk_manager = EqualLotSizer::new(&config.simulation, &config.dca)?;
        let executor = SimulatedExecutor::new(&config.simulation);

        Ok(Self::new(
            config.backtest.symbol.clone(),
            config.backtest.interval,
            EngineSettings::from_config(config),
            strategy,
            Box::new(risk_manager),
            Box::new(executor),
            AnalyticsEngine::new(),
        ))
    }

    /// Shows a terminal progress bar while the run is in progress.
    pub fn with_progress_bar(mut self) -> Result<Self, BacktestError> {
        let progress_bar = ProgressBar::new(0);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(progress_bar);
        Ok(self)
    }

    /// Runs the simulation over `candles` and returns the complete result.
    ///
    /// The series is validated before the first candle is processed, so a run
    /// either fails up front or produces a full `BacktestResult`.
    pub fn run(&mut self, candles: &[Candle]) -> Result<BacktestResult, BacktestError> {
        self.validate(candles)?;

        let span = tracing::info_span!(
            "backtest",
            symbol = %self.symbol,
            strategy = %self.strategy.id()
        );
        let _entered = span.enter();

        let initial_capital = self.settings.initial_capital;
        let mut portfolio = Portfolio::new(initial_capital);
        let mut trades: Vec<Trade> = Vec::new();
        let mut equity_curve = Vec::with_capacity(candles.len());

        if let Some(progress_bar) = &self.progress_bar {
            progress_bar.set_length(candles.len() as u64);
        }

        let warmup = self.settings.warmup_candles.max(1);
        for (index, candle) in candles.iter().enumerate() {
            if index + 1 >= warmup {
                let start = self
                    .settings
                    .history_window
                    .map_or(0, |len| (index + 1).saturating_sub(len));
                self.on_candle(&candles[start..=index], &mut portfolio, &mut trades)?;
            }

            equity_curve.push(EquitySample {
                timestamp: candle.timestamp,
                portfolio_value: portfolio.total_equity(candle.close),
            });

            if let Some(progress_bar) = &self.progress_bar {
                progress_bar.inc(1);
            }
        }

        // `validate` guarantees at least one candle.
        let (Some(first), Some(last)) = (candles.first(), candles.last()) else {
            return Err(BacktestError::DataUnavailable);
        };

        if let Some(position) = portfolio.position() {
            let order = OrderRequest::Sell { quantity: position.total_quantity() };
            let execution = self.executor.execute(&order, last)?;
            let trade = portfolio.close_position(&execution, ExitReason::Forced)?;
            tracing::warn!(
                lots = trade.lot_count(),
                exit_price = %trade.exit_price,
                pnl = %trade.pnl,
                "Series ended with an open position; liquidated"
            );
            trades.push(trade);

            if let Some(sample) = equity_curve.last_mut() {
                sample.portfolio_value = portfolio.cash;
            }
        }

        if let Some(progress_bar) = &self.progress_bar {
            progress_bar.finish_with_message("Simulation complete.");
        }

        let final_capital = portfolio.cash;
        let report = self.analytics_engine.calculate(
            &trades,
            &equity_curve,
            initial_capital,
            final_capital,
            self.interval,
        )?;

        tracing::info!(
            trades = trades.len(),
            %final_capital,
            total_return_pct = %report.total_return_pct.round_dp(4),
            "Backtest finished"
        );

        Ok(BacktestResult {
            symbol: self.symbol.clone(),
            interval: self.interval,
            strategy: self.strategy.id(),
            parameters: self.strategy.parameters(),
            initial_capital,
            final_capital,
            start: first.timestamp,
            end: last.timestamp,
            trades,
            equity_curve,
            report,
        })
    }

    fn validate(&self, candles: &[Candle]) -> Result<(), BacktestError> {
        if candles.is_empty() {
            return Err(BacktestError::DataUnavailable);
        }
        let required = self.settings.warmup_candles.max(1);
        if candles.len() < required {
            return Err(BacktestError::InsufficientHistory { required, available: candles.len() });
        }
        if let Some(index) = candles
            .windows(2)
            .position(|pair| pair[1].timestamp <= pair[0].timestamp)
        {
            return Err(BacktestError::UnorderedCandles { index: index + 1 });
        }
        Ok(())
    }

    /// One decision step. `window` ends with the current candle.
    fn on_candle(
        &mut self,
        window: &[Candle],
        portfolio: &mut Portfolio,
        trades: &mut Vec<Trade>,
    ) -> Result<(), BacktestError> {
        let Some(candle) = window.last() else {
            return Ok(());
        };

        if portfolio.position().is_some() {
            self.manage_position(candle, portfolio, trades)
        } else {
            self.try_open(window, candle, portfolio)
        }
    }

    fn try_open(
        &mut self,
        window: &[Candle],
        candle: &Candle,
        portfolio: &mut Portfolio,
    ) -> Result<(), BacktestError> {
        let signal = self.strategy.generate_signal(window, None)?;
        if signal != Signal::Buy {
            return Ok(());
        }

        let Some(order) = self.risk_manager.size_entry(portfolio.cash) else {
            tracing::debug!(cash = %portfolio.cash, "Buy signal skipped: lot not affordable");
            return Ok(());
        };

        let execution = self.executor.execute(&order, candle)?;
        portfolio.open_position(
            &execution,
            self.risk_manager.max_lots(),
            self.settings.dca.lot_interval_pct,
        )?;
        tracing::info!(
            timestamp = %candle.timestamp,
            price = %execution.price,
            quantity = %execution.quantity,
            "Opened position"
        );
        Ok(())
    }

    fn manage_position(
        &mut self,
        candle: &Candle,
        portfolio: &mut Portfolio,
        trades: &mut Vec<Trade>,
    ) -> Result<(), BacktestError> {
        // --- 1. Next lot ---
        let add_lot = portfolio
            .position()
            .is_some_and(|position| position.should_add_lot(candle.close));
        if add_lot {
            match self.risk_manager.size_entry(portfolio.cash) {
                Some(order) => {
                    let execution = self.executor.execute(&order, candle)?;
                    let position = portfolio.add_lot(&execution)?;
                    tracing::info!(
                        timestamp = %candle.timestamp,
                        lot = position.lot_count(),
                        price = %execution.price,
                        average_price = %position.average_price().round_dp(8),
                        "Added lot"
                    );
                }
                None => {
                    tracing::debug!(cash = %portfolio.cash, "Lot trigger reached but lot not affordable");
                }
            }
        }

        // --- 2. Exit ---
        let Some(position) = portfolio.position() else {
            return Ok(());
        };
        let dca = &self.settings.dca;
        let Some(reason) = position.should_close(candle.close, dca.profit_target_pct, dca.stop_loss_pct)
        else {
            return Ok(());
        };

        let order = OrderRequest::Sell { quantity: position.total_quantity() };
        let execution = self.executor.execute(&order, candle)?;
        let trade = portfolio.close_position(&execution, reason)?;
        tracing::info!(
            timestamp = %candle.timestamp,
            reason = %reason,
            lots = trade.lot_count(),
            pnl = %trade.pnl,
            "Closed position"
        );
        trades.push(trade);
        Ok(())
    }
}
